use crate::Reflect;
use crate::ops::{ReflectMut, ReflectRef};

/// A record with positionally addressed fields.
///
/// Indices follow declaration order and skip fields marked `#[conv(skip)]`; they
/// match [`StructInfo::fields`](crate::info::StructInfo::fields).
pub trait Struct: Reflect {
    fn field_len(&self) -> usize;

    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Follow a field index path through nested records.
///
/// An empty path returns `value` itself.
pub fn walk<'a>(value: &'a dyn Reflect, path: &[usize]) -> Option<&'a dyn Reflect> {
    let mut current = value;
    for &index in path {
        match current.reflect_ref() {
            ReflectRef::Struct(s) => current = s.field_at(index)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Mutable counterpart of [`walk`].
pub fn walk_mut<'a>(value: &'a mut dyn Reflect, path: &[usize]) -> Option<&'a mut dyn Reflect> {
    let Some((&first, rest)) = path.split_first() else {
        return Some(value);
    };
    match value.reflect_mut() {
        ReflectMut::Struct(s) => walk_mut(s.field_at_mut(first)?, rest),
        _ => None,
    }
}
