use crate::Reflect;

/// A value that may be absent.
pub trait Optional: Reflect {
    fn get(&self) -> Option<&dyn Reflect>;

    fn set_none(&mut self);

    /// Return the present value, inserting a zero value first if absent.
    fn get_or_insert_zero(&mut self) -> &mut dyn Reflect;
}
