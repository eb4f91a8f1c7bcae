use std::time::SystemTime;

use crate::info::{NonGenericTypeInfoCell, Shape, TypeInfo};
use crate::ops::{ReflectMut, ReflectRef};
use crate::{Reflect, Type, Typed};

impl_hash_map!(::std::collections::HashMap);

// The zero time is the Unix epoch.
impl Typed for SystemTime {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::new::<Self>(Shape::Scalar(Type::Time)))
    }

    #[inline]
    fn zero_value() -> Self {
        SystemTime::UNIX_EPOCH
    }
}

impl Reflect for SystemTime {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Time(*self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Time(self)
    }

    #[inline]
    fn reflect_reset(&mut self) {
        *self = SystemTime::UNIX_EPOCH;
    }
}
