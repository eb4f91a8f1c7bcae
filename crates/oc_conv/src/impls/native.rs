use core::any::{Any, TypeId};

use crate::cache::zero_of;
use crate::info::{GenericTypeInfoCell, NonGenericTypeInfoCell, Shape, TypeInfo};
use crate::ops::{BytesMut, List, ReflectMut, ReflectRef};
use crate::{Error, Reflect, Type, Typed};

// -----------------------------------------------------------------------------
// Numbers

macro_rules! impl_number {
    ($kind:ident($wide:ty): $($ty:ty),+) => {$(
        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| TypeInfo::new::<Self>(Shape::Scalar(Type::$kind)))
            }

            #[inline]
            fn zero_value() -> Self {
                0 as $ty
            }
        }

        impl Reflect for $ty {
            #[inline]
            fn reflect_type_info(&self) -> &'static TypeInfo {
                <Self as Typed>::type_info()
            }

            #[inline]
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::$kind(*self as $wide)
            }

            #[inline]
            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::$kind(self.into())
            }

            #[inline]
            fn reflect_reset(&mut self) {
                *self = 0 as $ty;
            }
        }
    )+};
}

impl_number!(Int(i64): i8, i16, i32, i64, isize);
impl_number!(Uint(u64): u8, u16, u32, u64, usize);
impl_number!(Float(f64): f32, f64);

// -----------------------------------------------------------------------------
// bool, (), String

impl Typed for bool {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::new::<Self>(Shape::Scalar(Type::Bool)))
    }

    #[inline]
    fn zero_value() -> Self {
        false
    }
}

impl Reflect for bool {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Bool(*self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Bool(self)
    }

    #[inline]
    fn reflect_reset(&mut self) {
        *self = false;
    }
}

impl Typed for () {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::new::<Self>(Shape::Scalar(Type::Nil)))
    }

    #[inline]
    fn zero_value() -> Self {}
}

impl Reflect for () {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Nil
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Nil
    }

    #[inline]
    fn reflect_reset(&mut self) {}
}

impl Typed for String {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::new::<Self>(Shape::Scalar(Type::String)))
    }

    #[inline]
    fn zero_value() -> Self {
        String::new()
    }
}

impl Reflect for String {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::String(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::String(self)
    }

    #[inline]
    fn reflect_reset(&mut self) {
        self.clear();
    }
}

// -----------------------------------------------------------------------------
// [T; N]

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(Shape::List {
                item: T::type_info,
                fixed: Some(N),
            })
        })
    }

    fn zero_value() -> Self {
        let zero = zero_of::<T>();
        core::array::from_fn(|_| zero.clone())
    }
}

impl<T: Typed, const N: usize> Reflect for [T; N] {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        match (self as &dyn Any).downcast_ref::<[u8; N]>() {
            Some(bytes) => ReflectRef::Bytes(bytes),
            None => ReflectRef::List(self),
        }
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            ReflectMut::Bytes(self)
        } else {
            ReflectMut::List(self)
        }
    }

    fn reflect_reset(&mut self) {
        self.iter_mut().for_each(Reflect::reflect_reset);
    }
}

impl<T: Typed, const N: usize> List for [T; N] {
    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        <[T]>::get(self, index).map(|v| v as &dyn Reflect)
    }

    #[inline]
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        <[T]>::get_mut(self, index).map(|v| v as &mut dyn Reflect)
    }

    #[inline]
    fn fixed_len(&self) -> Option<usize> {
        Some(N)
    }

    #[inline]
    fn clear(&mut self) {}

    #[inline]
    fn reserve(&mut self, _additional: usize) {}

    #[inline]
    fn push_zero(&mut self) -> Option<&mut dyn Reflect> {
        None
    }
}

impl<T: Typed, const N: usize> BytesMut for [T; N] {
    fn set_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let Some(storage) = (self as &mut dyn Any).downcast_mut::<[u8; N]>() else {
            return Err(Error::unsupported(core::any::type_name::<Self>()));
        };
        if bytes.len() > N {
            return Err(Error::length(N));
        }
        let (head, tail) = storage.split_at_mut(bytes.len());
        head.copy_from_slice(bytes);
        tail.fill(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ops::{ReflectMut, ReflectRef};
    use crate::{ErrorKind, Reflect, Typed};

    #[test]
    fn byte_arrays_reflect_as_bytes() {
        let mut raw = [1_u8, 2, 3];
        assert!(matches!(raw.reflect_ref(), ReflectRef::Bytes(&[1, 2, 3])));
        let ReflectMut::Bytes(bytes) = raw.reflect_mut() else {
            panic!("not bytes");
        };
        bytes.set_bytes(&[9]).unwrap();
        let err = bytes.set_bytes(&[0; 4]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Length { expected: 3 }));
        assert_eq!(raw, [9, 0, 0]);

        assert!(matches!([1_u16; 2].reflect_ref(), ReflectRef::List(_)));
    }

    #[test]
    fn numbers_widen() {
        assert!(matches!((-3_i8).reflect_ref(), ReflectRef::Int(-3)));
        assert!(matches!(u64::MAX.reflect_ref(), ReflectRef::Uint(u64::MAX)));
        let mut n = 7_usize;
        n.reflect_reset();
        assert_eq!(n, usize::zero_value());
        assert!(<[String; 2]>::zero_value().iter().all(String::is_empty));
    }
}
