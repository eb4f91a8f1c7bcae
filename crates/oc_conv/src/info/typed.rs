use crate::Reflect;
use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// Typed

/// A static accessor to compile-time type information and the zero value.
///
/// Automatically implemented by [`#[derive(Reflect)]`](crate::derive::Reflect).
///
/// The zero value is what decoding starts from: it fills fresh element, key and
/// value slots, and targets are reset to it when the input says `nil`. Reads go
/// through [`zero_of`](crate::cache::zero_of), which builds it once per type.
///
/// ```
/// use oc_conv::{Typed, derive::Reflect};
///
/// #[derive(Reflect, Clone, Debug, PartialEq)]
/// struct A {
///     name: String,
///     tags: Vec<String>,
/// }
///
/// assert!(A::type_info().type_is::<A>());
/// assert_eq!(A::zero_value(), A { name: String::new(), tags: vec![] });
/// ```
pub trait Typed: Reflect + Clone {
    /// A static accessor to compile-time type information.
    fn type_info() -> &'static TypeInfo;

    /// A fresh instance of the type's zero value.
    fn zero_value() -> Self;
}
