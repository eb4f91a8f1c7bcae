use core::time::Duration;
use std::time::SystemTime;

use crate::Reflect;
use crate::ops::{FloatMut, IntMut, List, Map, Optional, Struct, UintMut};

// -----------------------------------------------------------------------------
// ReflectRef

/// Immutable view of a value's shape.
///
/// Integers and floats are widened to 64 bits; the width only matters on the
/// write side, see [`ReflectMut`].
#[derive(Clone, Copy)]
pub enum ReflectRef<'a> {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(&'a str),
    Bytes(&'a [u8]),
    Time(SystemTime),
    Duration(Duration),
    Optional(Option<&'a dyn Reflect>),
    /// A box or other owning pointer; encodes as its target.
    Pointer(&'a dyn Reflect),
    List(&'a dyn List),
    Map(&'a dyn Map),
    Struct(&'a dyn Struct),
    /// No structure is exposed. Only hooks can convert the value.
    Opaque,
}

// -----------------------------------------------------------------------------
// ReflectMut

/// Mutable view of a value's shape.
pub enum ReflectMut<'a> {
    /// `()`, decodes from anything nil-like.
    Nil,
    Bool(&'a mut bool),
    Int(IntMut<'a>),
    Uint(UintMut<'a>),
    Float(FloatMut<'a>),
    String(&'a mut String),
    Bytes(&'a mut dyn BytesMut),
    Time(&'a mut SystemTime),
    Duration(&'a mut Duration),
    Optional(&'a mut dyn Optional),
    Pointer(&'a mut dyn Reflect),
    List(&'a mut dyn List),
    Map(&'a mut dyn Map),
    Struct(&'a mut dyn Struct),
    Opaque,
}

// -----------------------------------------------------------------------------
// BytesMut

/// Write access to a byte sequence, growable or fixed.
pub trait BytesMut {
    /// Replace the content with `bytes`.
    ///
    /// Fixed-size storage accepts at most its length and zero-fills the rest.
    fn set_bytes(&mut self, bytes: &[u8]) -> Result<(), crate::Error>;
}
