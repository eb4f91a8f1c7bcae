use bitflags::bitflags;

use crate::info::{TypeInfo, Typed};

bitflags! {
    /// Per-field options from `#[conv(...)]`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// Leave the field out when its value is empty.
        const OMIT_EMPTY = 1 << 0;
        /// Leave the field out when its value is zero.
        const OMIT_ZERO  = 1 << 1;
        /// Promote the fields of this record field into the parent.
        const EMBED      = 1 << 2;
    }
}

// -----------------------------------------------------------------------------
// FieldInfo

/// Information for one reflected field of a record.
///
/// ```
/// use oc_conv::info::{FieldFlags, FieldInfo};
///
/// const ID: FieldInfo = FieldInfo::new::<u64>("id", 0)
///     .with_rename("ID")
///     .with_flags(FieldFlags::OMIT_ZERO);
///
/// assert_eq!(ID.name(), "ID");
/// assert_eq!(ID.ident(), "id");
/// assert!(ID.type_info().type_is::<u64>());
/// ```
#[derive(Clone, Debug)]
pub struct FieldInfo {
    ident: &'static str,
    rename: Option<&'static str>,
    index: usize,
    flags: FieldFlags,
    // Resolved on first access; using a function pointer delays it.
    type_info: fn() -> &'static TypeInfo,
}

impl FieldInfo {
    /// Creates the info of field `ident` of type `T` at reflected position `index`.
    #[inline]
    pub const fn new<T: Typed>(ident: &'static str, index: usize) -> Self {
        Self {
            ident,
            rename: None,
            index,
            flags: FieldFlags::empty(),
            type_info: T::type_info,
        }
    }

    #[inline]
    pub const fn with_rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    #[inline]
    pub const fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Exposed name: the rename if any, else the identifier.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self.rename {
            Some(name) => name,
            None => self.ident,
        }
    }

    /// Declared identifier.
    #[inline]
    pub const fn ident(&self) -> &'static str {
        self.ident
    }

    /// Position for [`Struct::field_at`](crate::ops::Struct::field_at).
    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub const fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }
}

// -----------------------------------------------------------------------------
// StructInfo

/// The declared layout of a record: its reflected fields in declaration order.
///
/// This is the raw layout. Embedding and shadowing are resolved by
/// [`describe`](crate::cache::describe).
#[derive(Clone, Debug)]
pub struct StructInfo {
    fields: Box<[FieldInfo]>,
}

impl StructInfo {
    pub fn new(fields: &[FieldInfo]) -> Self {
        Self {
            fields: fields.into(),
        }
    }

    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }

    /// Returns the field with the given exposed name.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name() == name)
    }
}
