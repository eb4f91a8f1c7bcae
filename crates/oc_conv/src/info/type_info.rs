use core::any::{Any, TypeId};
use core::fmt;

use crate::Type;
use crate::hooks::HookTable;
use crate::info::StructInfo;

// -----------------------------------------------------------------------------
// Shape

/// The structural category of a type, known without an instance.
#[derive(Clone, Debug)]
pub enum Shape {
    /// A value that always maps to one canonical [`Type`].
    Scalar(Type),
    /// A sequence; `fixed` is the length of array storage.
    List {
        item: fn() -> &'static TypeInfo,
        fixed: Option<usize>,
    },
    Map {
        key: fn() -> &'static TypeInfo,
        value: fn() -> &'static TypeInfo,
    },
    Optional(fn() -> &'static TypeInfo),
    Pointer(fn() -> &'static TypeInfo),
    Struct(StructInfo),
    /// No structure is exposed; conversion goes through hooks.
    Opaque,
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Compile-time information about one type.
///
/// A `TypeInfo` contains:
///
/// - **id**: [`TypeId`] of the type;
/// - **type path**: its [`core::any::type_name`], used in error messages;
/// - **shape**: the [`Shape`], including the field list of records;
/// - **hooks**: the [`HookTable`] of custom conversion routines.
///
/// Obtain it with [`Typed::type_info`](crate::Typed::type_info) or, from a value,
/// [`Reflect::reflect_type_info`](crate::Reflect::reflect_type_info).
#[derive(Clone)]
pub struct TypeInfo {
    type_id: TypeId,
    type_path: &'static str,
    shape: Shape,
    hooks: HookTable,
}

impl TypeInfo {
    /// Create the info of `T` with no hooks.
    pub fn new<T: Any>(shape: Shape) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: core::any::type_name::<T>(),
            shape,
            hooks: HookTable::EMPTY,
        }
    }

    /// Attach hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: HookTable) -> Self {
        self.hooks = hooks;
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn type_is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    /// The record layout, if this is a record.
    #[inline]
    pub fn as_struct(&self) -> Option<&StructInfo> {
        match &self.shape {
            Shape::Struct(info) => Some(info),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type_path", &self.type_path)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
