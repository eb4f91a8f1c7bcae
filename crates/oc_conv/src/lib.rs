#![doc = include_str!("../README.md")]
#![allow(clippy::std_instead_of_alloc, reason = "std-only crate")]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names this crate `oc_conv`, both inside the crate itself and in
// doc tests. `macro_utils::Manifest` can only choose one spelling.
extern crate self as oc_conv;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod kind;
mod options;
mod reflection;

pub mod adapter;
pub mod cache;
pub mod decode;
pub mod encode;
pub mod hooks;
pub mod impls;
pub mod info;
pub mod ops;
pub mod predicate;
pub mod text;

#[doc(hidden)]
pub mod testing;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use adapter::{Sink, Source};
pub use decode::{Decoder, decode};
pub use encode::{Encoder, encode};
pub use error::{BoxError, Error, ErrorKind, PathSegment};
pub use kind::{Type, classify};
pub use options::{DEFAULT_MAX_DEPTH, Options};
pub use info::Typed;
pub use reflection::Reflect;

#[cfg(feature = "derive")]
pub use oc_conv_derive as derive;
