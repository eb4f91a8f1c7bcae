use core::any::{Any, TypeId};

use crate::Typed;
use crate::cache::TypeCache;

static ZEROS: TypeCache<dyn Any + Send + Sync> = TypeCache::new();

/// The cached zero value of `T`.
///
/// Built from [`Typed::zero_value`] on first use and shared afterwards.
///
/// ```
/// use oc_conv::cache::zero_of;
///
/// assert_eq!(zero_of::<Vec<i32>>(), &Vec::<i32>::new());
/// assert!(core::ptr::eq(zero_of::<u8>(), zero_of::<u8>()));
/// ```
pub fn zero_of<T: Typed>() -> &'static T {
    let entry = ZEROS.get_or_build_boxed(TypeId::of::<T>(), || {
        log::trace!("building zero value of `{}`", core::any::type_name::<T>());
        Box::new(T::zero_value()) as Box<dyn Any + Send + Sync>
    });
    match entry.downcast_ref::<T>() {
        Some(zero) => zero,
        None => unreachable!("zero cache entry keyed by a foreign type"),
    }
}
