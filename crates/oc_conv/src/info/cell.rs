//! Containers for static storage of type information.
//!
//! ## NonGenericTypeInfoCell
//!
//! For non-generic types, [`NonGenericTypeInfoCell`] wraps an [`OnceLock`]; there is
//! almost no additional cost.
//!
//! ## GenericTypeInfoCell
//!
//! A `static CELL` inside a generic function is shared by every instantiation, so
//! [`GenericTypeInfoCell`] keys its entries by [`TypeId`] inside a [`RwLock`].

use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use oc_utils::TypeIdMap;

use crate::info::TypeInfo;

/// Container for static storage of non-generic type information.
///
/// ```
/// use oc_conv::Typed;
/// use oc_conv::info::{NonGenericTypeInfoCell, Shape, TypeInfo};
///
/// #[derive(Clone, Default)]
/// struct Token(String);
///
/// # impl oc_conv::Reflect for Token {
/// #     fn reflect_type_info(&self) -> &'static TypeInfo { Self::type_info() }
/// #     fn reflect_ref(&self) -> oc_conv::ops::ReflectRef<'_> { oc_conv::ops::ReflectRef::Opaque }
/// #     fn reflect_mut(&mut self) -> oc_conv::ops::ReflectMut<'_> { oc_conv::ops::ReflectMut::Opaque }
/// #     fn reflect_reset(&mut self) { self.0.clear() }
/// # }
/// impl Typed for Token {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| TypeInfo::new::<Self>(Shape::Opaque))
///     }
///     fn zero_value() -> Self {
///         Self::default()
///     }
/// }
///
/// assert!(Token::type_info().type_is::<Token>());
/// ```
pub struct NonGenericTypeInfoCell(OnceLock<TypeInfo>);

impl NonGenericTypeInfoCell {
    /// Create a empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored info, building it with `f` on first access.
    #[inline]
    pub fn get_or_init<F>(&self, f: F) -> &TypeInfo
    where
        F: FnOnce() -> TypeInfo,
    {
        self.0.get_or_init(f)
    }
}

/// Container for static storage of type information with generics.
///
/// ```
/// use oc_conv::{Reflect, Typed};
/// use oc_conv::info::{GenericTypeInfoCell, Shape, TypeInfo};
///
/// #[derive(Clone)]
/// struct Wrapper<T>(T);
///
/// # impl<T: Typed> Reflect for Wrapper<T> {
/// #     fn reflect_type_info(&self) -> &'static TypeInfo { Self::type_info() }
/// #     fn reflect_ref(&self) -> oc_conv::ops::ReflectRef<'_> { oc_conv::ops::ReflectRef::Pointer(&self.0) }
/// #     fn reflect_mut(&mut self) -> oc_conv::ops::ReflectMut<'_> { oc_conv::ops::ReflectMut::Pointer(&mut self.0) }
/// #     fn reflect_reset(&mut self) { self.0.reflect_reset() }
/// # }
/// impl<T: Typed> Typed for Wrapper<T> {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
///         CELL.get_or_insert::<Self>(|| TypeInfo::new::<Self>(Shape::Pointer(T::type_info)))
///     }
///     fn zero_value() -> Self {
///         Wrapper(T::zero_value())
///     }
/// }
///
/// assert!(<Wrapper<u8>>::type_info().type_is::<Wrapper<u8>>());
/// assert!(<Wrapper<i8>>::type_info().type_is::<Wrapper<i8>>());
/// ```
pub struct GenericTypeInfoCell(RwLock<TypeIdMap<&'static TypeInfo>>);

impl GenericTypeInfoCell {
    /// Create a empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the info stored for `G`, building it with `f` on first access.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> TypeInfo) -> &TypeInfo {
        // Separate to reduce code compilation times
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> TypeInfo) -> &TypeInfo {
        match self.get_by_type_id(type_id) {
            Some(info) => info,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&TypeInfo> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: TypeInfo) -> &TypeInfo {
        let mut map = self.0.write().unwrap_or_else(PoisonError::into_inner);
        *map.get_or_insert(type_id, || Box::leak(Box::new(value)))
    }
}
