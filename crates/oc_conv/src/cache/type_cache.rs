use core::any::TypeId;
use std::sync::{PoisonError, RwLock};

use oc_utils::TypeIdMap;

/// A lazily filled `TypeId -> &'static V` map.
///
/// Entries are leaked on insert and never removed.
///
/// ```
/// use core::any::TypeId;
/// use oc_conv::cache::TypeCache;
///
/// static NAMES: TypeCache<String> = TypeCache::new();
///
/// let a = NAMES.get_or_build(TypeId::of::<u8>(), || "u8".to_owned());
/// let b = NAMES.get_or_build(TypeId::of::<u8>(), || unreachable!());
/// assert!(core::ptr::eq(a, b));
/// ```
pub struct TypeCache<V: ?Sized + 'static>(RwLock<TypeIdMap<&'static V>>);

impl<V: ?Sized + Send + Sync + 'static> TypeCache<V> {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&'static V> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    /// Returns the entry of `type_id`, building a boxed one with `build` on miss.
    #[inline]
    pub fn get_or_build_boxed(&self, type_id: TypeId, build: impl FnOnce() -> Box<V>) -> &'static V {
        if let Some(entry) = self.get(type_id) {
            return entry;
        }
        let built = build();
        let mut map = self.0.write().unwrap_or_else(PoisonError::into_inner);
        *map.get_or_insert(type_id, move || Box::leak(built))
    }

    /// Number of entries, mostly for tests and diagnostics.
    pub fn len(&self) -> usize {
        self.0.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<V: Send + Sync + 'static> TypeCache<V> {
    /// Returns the entry of `type_id`, building it with `build` on miss.
    #[inline]
    pub fn get_or_build(&self, type_id: TypeId, build: impl FnOnce() -> V) -> &'static V {
        self.get_or_build_boxed(type_id, || Box::new(build()))
    }

    /// Like [`get_or_build`](Self::get_or_build), for builders that can fail.
    ///
    /// Failures are not cached.
    pub fn try_get_or_build<E>(
        &self,
        type_id: TypeId,
        build: impl FnOnce() -> Result<V, E>,
    ) -> Result<&'static V, E> {
        if let Some(entry) = self.get(type_id) {
            return Ok(entry);
        }
        let built = build()?;
        let mut map = self.0.write().unwrap_or_else(PoisonError::into_inner);
        Ok(*map.get_or_insert(type_id, move || Box::leak(Box::new(built))))
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;
    use std::sync::Barrier;

    use super::TypeCache;

    #[test]
    fn racing_builders_share_one_entry() {
        static CACHE: TypeCache<Vec<u32>> = TypeCache::new();
        let barrier = Barrier::new(8);

        let addrs: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8_u32)
                .map(|i| {
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        let entry = CACHE.get_or_build(TypeId::of::<String>(), || vec![i]);
                        core::ptr::from_ref(entry) as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(CACHE.len(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        static CACHE: TypeCache<u8> = TypeCache::new();
        let id = TypeId::of::<u8>();
        assert!(CACHE.try_get_or_build(id, || Err::<u8, _>("no")).is_err());
        assert_eq!(*CACHE.try_get_or_build(id, || Ok::<_, &str>(3)).unwrap(), 3);
    }
}
