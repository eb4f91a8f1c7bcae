use alloc::collections::BTreeMap;
use core::any::{Any, TypeId};

use crate::cache::zero_of;
use crate::info::{GenericTypeInfoCell, Shape, TypeInfo};
use crate::ops::{BytesMut, List, Map, ReflectMut, ReflectRef};
use crate::{Error, Reflect, Typed};

// -----------------------------------------------------------------------------
// Vec

impl<T: Typed> Typed for Vec<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(Shape::List {
                item: T::type_info,
                fixed: None,
            })
        })
    }

    #[inline]
    fn zero_value() -> Self {
        Vec::new()
    }
}

impl<T: Typed> Reflect for Vec<T> {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        match (self as &dyn Any).downcast_ref::<Vec<u8>>() {
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

    #[inline]
    fn reflect_reset(&mut self) {
        Vec::clear(self);
    }
}

impl<T: Typed> List for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
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
        None
    }

    #[inline]
    fn clear(&mut self) {
        Vec::clear(self);
    }

    #[inline]
    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional);
    }

    fn push_zero(&mut self) -> Option<&mut dyn Reflect> {
        Vec::push(self, zero_of::<T>().clone());
        <[T]>::last_mut(self).map(|v| v as &mut dyn Reflect)
    }
}

impl<T: Typed> BytesMut for Vec<T> {
    fn set_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let Some(storage) = (self as &mut dyn Any).downcast_mut::<Vec<u8>>() else {
            return Err(Error::unsupported(core::any::type_name::<Self>()));
        };
        storage.clear();
        storage.extend_from_slice(bytes);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Box

impl<T: Typed> Typed for Box<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::new::<Self>(Shape::Pointer(T::type_info)))
    }

    #[inline]
    fn zero_value() -> Self {
        Box::new(zero_of::<T>().clone())
    }
}

impl<T: Typed> Reflect for Box<T> {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(&**self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(&mut **self)
    }

    #[inline]
    fn reflect_reset(&mut self) {
        (**self).reflect_reset();
    }
}

// -----------------------------------------------------------------------------
// BTreeMap

impl<K: Typed + Ord, V: Typed> Typed for BTreeMap<K, V> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeInfo::new::<Self>(Shape::Map {
                key: K::type_info,
                value: V::type_info,
            })
        })
    }

    #[inline]
    fn zero_value() -> Self {
        BTreeMap::new()
    }
}

impl<K: Typed + Ord, V: Typed> Reflect for BTreeMap<K, V> {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }

    #[inline]
    fn reflect_reset(&mut self) {
        Self::clear(self);
    }
}

impl<K: Typed + Ord, V: Typed> Map for BTreeMap<K, V> {
    #[inline]
    fn len(&self) -> usize {
        Self::len(self)
    }

    fn for_each_entry(
        &self,
        f: &mut dyn FnMut(&dyn Reflect, &dyn Reflect) -> Result<(), Error>,
    ) -> Result<(), Error> {
        for (key, value) in self {
            f(key, value)?;
        }
        Ok(())
    }

    fn insert_with(
        &mut self,
        fill: &mut dyn FnMut(&mut dyn Reflect, &mut dyn Reflect) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let mut key = zero_of::<K>().clone();
        let mut value = zero_of::<V>().clone();
        fill(&mut key, &mut value)?;
        Self::insert(self, key, value);
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        Self::clear(self);
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;

    use crate::Reflect;
    use crate::ops::{Map, ReflectMut, ReflectRef};

    #[test]
    fn vec_of_bytes_is_bytes() {
        let mut raw = vec![1_u8];
        assert!(matches!(raw.reflect_ref(), ReflectRef::Bytes(&[1])));
        let ReflectMut::Bytes(bytes) = raw.reflect_mut() else {
            panic!("not bytes");
        };
        bytes.set_bytes(b"xyz").unwrap();
        assert_eq!(raw, b"xyz");

        let mut nested = vec![vec![1_u8]];
        assert!(matches!(nested.reflect_mut(), ReflectMut::List(_)));
    }

    #[test]
    fn failed_fill_inserts_nothing() {
        let mut map = BTreeMap::<String, u8>::new();
        let err = Map::insert_with(&mut map, &mut |_, _| Err(crate::Error::length(0)));
        assert!(err.is_err());
        assert!(map.is_empty());
    }
}
