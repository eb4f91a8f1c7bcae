use crate::Reflect;

/// A sequence of reflected elements, growable (`Vec<T>`) or fixed (`[T; N]`).
///
/// ```
/// use oc_conv::ops::List;
///
/// let mut vec = vec![1_u16, 2, 3];
/// let list: &mut dyn List = &mut vec;
///
/// assert_eq!(list.len(), 3);
/// let slot = list.push_zero().unwrap();
/// *slot.downcast_mut::<u16>().unwrap() = 9;
/// assert_eq!(vec, [1, 2, 3, 9]);
/// ```
pub trait List: Reflect {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// `Some(N)` for fixed-size storage.
    fn fixed_len(&self) -> Option<usize>;

    /// Remove all elements. A no-op for fixed storage.
    fn clear(&mut self);

    /// Reserve room for `additional` more elements. A no-op for fixed storage.
    fn reserve(&mut self, additional: usize);

    /// Append a zero element and return it for in-place decoding.
    ///
    /// Returns `None` for fixed storage.
    fn push_zero(&mut self) -> Option<&mut dyn Reflect>;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
