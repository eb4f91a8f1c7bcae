//! Built-in implementations of [`Reflect`](crate::Reflect) and
//! [`Typed`](crate::Typed).
//!
//! ## Implemented Menu
//!
//! - native:
//!     - `bool`, `i8`-`i64`, `isize`, `u8`-`u64`, `usize`, `f32`, `f64`
//!     - `()`, `String`
//!     - `[T; N]`; `[u8; N]` reflects as bytes
//! - core:
//!     - `Option<T>`, `core::time::Duration`
//! - alloc:
//!     - `Vec<T>`; `Vec<u8>` reflects as bytes
//!     - `Box<T>`, `BTreeMap<K, V>`
//! - std:
//!     - `HashMap<K, V, S>`, `std::time::SystemTime`
//! - oc_utils:
//!     - `hashbrown::HashMap<K, V, S>` (and so `oc_utils::hash::HashMap`)
//! - [`ErrorValue`], a plain error message.
//!
//! Hashed maps require `K: Ord` so entries can be emitted in key order.

// -----------------------------------------------------------------------------
// Shared

// `HashMap` and `hashbrown::HashMap` have the same surface.
macro_rules! impl_hash_map {
    ($($map:tt)+) => {
        impl<K, V, S> $crate::Typed for $($map)+<K, V, S>
        where
            K: $crate::Typed + Ord + ::core::hash::Hash,
            V: $crate::Typed,
            S: ::core::hash::BuildHasher + Default + Clone + Send + Sync + 'static,
        {
            fn type_info() -> &'static $crate::info::TypeInfo {
                static CELL: $crate::info::GenericTypeInfoCell = $crate::info::GenericTypeInfoCell::new();
                CELL.get_or_insert::<Self>(|| {
                    $crate::info::TypeInfo::new::<Self>($crate::info::Shape::Map {
                        key: K::type_info,
                        value: V::type_info,
                    })
                })
            }

            #[inline]
            fn zero_value() -> Self {
                Self::with_hasher(S::default())
            }
        }

        impl<K, V, S> $crate::Reflect for $($map)+<K, V, S>
        where
            K: $crate::Typed + Ord + ::core::hash::Hash,
            V: $crate::Typed,
            S: ::core::hash::BuildHasher + Default + Clone + Send + Sync + 'static,
        {
            #[inline]
            fn reflect_type_info(&self) -> &'static $crate::info::TypeInfo {
                <Self as $crate::Typed>::type_info()
            }

            #[inline]
            fn reflect_ref(&self) -> $crate::ops::ReflectRef<'_> {
                $crate::ops::ReflectRef::Map(self)
            }

            #[inline]
            fn reflect_mut(&mut self) -> $crate::ops::ReflectMut<'_> {
                $crate::ops::ReflectMut::Map(self)
            }

            #[inline]
            fn reflect_reset(&mut self) {
                Self::clear(self);
            }
        }

        impl<K, V, S> $crate::ops::Map for $($map)+<K, V, S>
        where
            K: $crate::Typed + Ord + ::core::hash::Hash,
            V: $crate::Typed,
            S: ::core::hash::BuildHasher + Default + Clone + Send + Sync + 'static,
        {
            #[inline]
            fn len(&self) -> usize {
                Self::len(self)
            }

            fn for_each_entry(
                &self,
                f: &mut dyn FnMut(&dyn $crate::Reflect, &dyn $crate::Reflect) -> Result<(), $crate::Error>,
            ) -> Result<(), $crate::Error> {
                let mut entries: Vec<(&K, &V)> = Self::iter(self).collect();
                entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
                for (key, value) in entries {
                    f(key, value)?;
                }
                Ok(())
            }

            fn insert_with(
                &mut self,
                fill: &mut dyn FnMut(&mut dyn $crate::Reflect, &mut dyn $crate::Reflect) -> Result<(), $crate::Error>,
            ) -> Result<(), $crate::Error> {
                let mut key = $crate::cache::zero_of::<K>().clone();
                let mut value = $crate::cache::zero_of::<V>().clone();
                fill(&mut key, &mut value)?;
                Self::insert(self, key, value);
                Ok(())
            }

            #[inline]
            fn clear(&mut self) {
                Self::clear(self);
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Modules

mod alloc;
mod core;
mod error_value;
mod native;
mod oc_utils;
mod std;

// -----------------------------------------------------------------------------
// Exports

pub use error_value::ErrorValue;
