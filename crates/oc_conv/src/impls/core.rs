use core::time::Duration;

use crate::cache::zero_of;
use crate::info::{GenericTypeInfoCell, NonGenericTypeInfoCell, Shape, TypeInfo};
use crate::ops::{Optional, ReflectMut, ReflectRef};
use crate::{Reflect, Type, Typed};

// -----------------------------------------------------------------------------
// Option

impl<T: Typed> Typed for Option<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::new::<Self>(Shape::Optional(T::type_info)))
    }

    #[inline]
    fn zero_value() -> Self {
        None
    }
}

impl<T: Typed> Reflect for Option<T> {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Optional(self.as_ref().map(|v| v as &dyn Reflect))
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Optional(self)
    }

    #[inline]
    fn reflect_reset(&mut self) {
        *self = None;
    }
}

impl<T: Typed> Optional for Option<T> {
    #[inline]
    fn get(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    #[inline]
    fn set_none(&mut self) {
        *self = None;
    }

    fn get_or_insert_zero(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(|| zero_of::<T>().clone())
    }
}

// -----------------------------------------------------------------------------
// Duration

impl Typed for Duration {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::new::<Self>(Shape::Scalar(Type::Duration)))
    }

    #[inline]
    fn zero_value() -> Self {
        Duration::ZERO
    }
}

impl Reflect for Duration {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Duration(*self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Duration(self)
    }

    #[inline]
    fn reflect_reset(&mut self) {
        *self = Duration::ZERO;
    }
}
