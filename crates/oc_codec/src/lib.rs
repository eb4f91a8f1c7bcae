#![doc = include_str!("../README.md")]
#![allow(
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    reason = "std-only crate"
)]

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod cbor;
pub mod registry;
pub mod resp;

// -----------------------------------------------------------------------------
// Top-level exports

pub use error::CodecError;
pub use registry::{Codec, lookup, marshal, register, unmarshal};
