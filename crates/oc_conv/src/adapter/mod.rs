//! The boundary between the engine and wire formats.
//!
//! A format implements [`Sink`] to be encoded into and [`Source`] to be decoded
//! from. Both traits are object safe; dispatchers only ever see `&mut dyn Sink`
//! and `&mut dyn Source`.

mod sink;
mod source;

pub use sink::Sink;
pub use source::Source;

pub(crate) use source::has_next;
