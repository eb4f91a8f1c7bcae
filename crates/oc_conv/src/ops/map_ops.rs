use crate::{Error, Reflect};

/// A keyed mapping of reflected values.
///
/// Entries are visited in key order, so encoding is deterministic for hashed maps
/// too.
///
/// ```
/// use std::collections::HashMap;
/// use oc_conv::ops::Map;
///
/// let map = HashMap::from([(2_u8, "b".to_owned()), (1, "a".to_owned())]);
/// let mut keys = Vec::new();
/// Map::for_each_entry(&map, &mut |k, _| {
///     keys.push(*k.downcast_ref::<u8>().unwrap());
///     Ok(())
/// })
/// .unwrap();
/// assert_eq!(keys, [1, 2]);
/// ```
pub trait Map: Reflect {
    fn len(&self) -> usize;

    /// Visit every entry in ascending key order, stopping at the first error.
    fn for_each_entry(
        &self,
        f: &mut dyn FnMut(&dyn Reflect, &dyn Reflect) -> Result<(), Error>,
    ) -> Result<(), Error>;

    /// Insert one entry built in place.
    ///
    /// `fill` receives a zero key and a zero value to decode into. The entry is
    /// inserted only if `fill` succeeds; an existing key is overwritten.
    fn insert_with(
        &mut self,
        fill: &mut dyn FnMut(&mut dyn Reflect, &mut dyn Reflect) -> Result<(), Error>,
    ) -> Result<(), Error>;

    fn clear(&mut self);

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
