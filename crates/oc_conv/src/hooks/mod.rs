//! Custom conversion capabilities.
//!
//! A type can take over its own conversion in four ways, checked in this order
//! when encoding:
//!
//! 1. [`ValueEncoder`]: emits arbitrary events through the [`Encoder`];
//! 2. [`TextMarshal`]: converts to text, emitted as a `String`;
//! 3. [`core::error::Error`]: emitted as an `Error` carrying the message;
//! 4. otherwise the value is walked structurally.
//!
//! Decoding checks [`ValueDecoder`] first, then [`TextUnmarshal`] (used only when
//! the next value is a `String`; `nil` resets the target), then falls back to
//! structural assignment.
//!
//! The derive macro opts a type in with `#[conv(encoder, decoder, text, error)]`.
//! The capabilities are stored as function pointers in the type's [`HookTable`]
//! and the resolved order is cached per type by [`hooks_of`].
//!
//! [`Encoder`]: crate::Encoder

mod flags;
mod table;
mod traits;

pub use flags::{DecodeRoute, EncodeRoute, HookFlags, Hooks, hooks_of};
pub use table::HookTable;
pub use traits::{TextMarshal, TextUnmarshal, ValueDecoder, ValueEncoder};
