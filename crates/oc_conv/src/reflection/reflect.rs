use core::any::{Any, TypeId};

use crate::info::TypeInfo;
use crate::ops::{ReflectMut, ReflectRef};

// -----------------------------------------------------------------------------
// Reflect

/// The introspection trait every convertible value implements.
///
/// `Reflect` exposes a value's shape as a [`ReflectRef`] / [`ReflectMut`] view, and
/// its static [`TypeInfo`]. The dispatchers never need anything else.
///
/// # Recommendations
///
/// Use [the derive macro](crate::derive::Reflect) for records. The engine already
/// implements this trait for the integer, float, text, byte, time, sequence,
/// mapping, optional and boxed types of the standard library.
///
/// # Type identification
///
/// [`Any::type_id`] on a `Box<dyn Reflect>` returns the id of the box. Use
/// [`Reflect::ty_id`] instead:
///
/// ```rust
/// # use oc_conv::Reflect;
/// # use core::any::{Any, TypeId};
/// let x: Box<dyn Reflect> = Box::new(32_i32);
///
/// assert!(x.type_id() != TypeId::of::<i32>());
/// assert!(x.ty_id() == TypeId::of::<i32>());
/// ```
///
/// # Manual implementation
///
/// ```rust, ignore
/// fn reflect_type_info(&self) -> &'static TypeInfo {
///     <Self as Typed>::type_info()
/// }
///
/// fn reflect_ref(&self) -> ReflectRef<'_> {
///     ReflectRef::Struct(self)   // or the matching scalar view
/// }
///
/// fn reflect_mut(&mut self) -> ReflectMut<'_> {
///     ReflectMut::Struct(self)
/// }
///
/// fn reflect_reset(&mut self) {
///     self.clone_from(oc_conv::cache::zero_of::<Self>());
/// }
/// ```
///
/// Types whose layout should stay hidden return [`ReflectRef::Opaque`] and provide
/// hooks instead, see [`hooks`](crate::hooks).
pub trait Reflect: Send + Sync + Any {
    /// Static type information of the underlying type.
    fn reflect_type_info(&self) -> &'static TypeInfo;

    /// Read-only view of the value's shape.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Mutable view of the value's shape.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Overwrite `self` with the type's zero value, keeping allocations where the
    /// type allows it.
    fn reflect_reset(&mut self);

    /// Return the [`TypeId`] of underlying type.
    #[inline]
    fn ty_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Downcasts the value to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }
}

impl core::fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "dyn Reflect<{}>", self.reflect_type_info().type_path())
    }
}

#[cfg(test)]
mod tests {
    use crate::Reflect;

    #[test]
    fn downcast_through_dyn() {
        let mut value: Box<dyn Reflect> = Box::new(5_u16);
        assert!(value.is::<u16>());
        assert!(!value.is::<u32>());
        *value.downcast_mut::<u16>().unwrap() += 1;
        assert_eq!(value.downcast_ref::<u16>(), Some(&6));
    }
}
