use core::any::TypeId;

use oc_utils::hash::HashMap;

use crate::Error;
use crate::cache::TypeCache;
use crate::hooks::{HookFlags, hooks_of};
use crate::info::{FieldFlags, StructInfo, TypeInfo};

static DESCRIPTORS: TypeCache<StructDescriptor> = TypeCache::new();

// -----------------------------------------------------------------------------
// FieldDescriptor

/// One field of a record as seen on the wire.
#[derive(Debug)]
pub struct FieldDescriptor {
    name: &'static str,
    ident: &'static str,
    path: Box<[usize]>,
    flags: FieldFlags,
    type_info: &'static TypeInfo,
    hooks: HookFlags,
}

impl FieldDescriptor {
    /// Exposed name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared identifier.
    #[inline]
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// Field indices from the record down to this field, through embedded records.
    #[inline]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Embedding depth; 0 for the record's own fields.
    #[inline]
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    #[inline]
    pub fn omit_empty(&self) -> bool {
        self.flags.contains(FieldFlags::OMIT_EMPTY)
    }

    #[inline]
    pub fn omit_zero(&self) -> bool {
        self.flags.contains(FieldFlags::OMIT_ZERO)
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.type_info
    }

    /// Hook capabilities of the field's type.
    #[inline]
    pub fn hooks(&self) -> HookFlags {
        self.hooks
    }
}

// -----------------------------------------------------------------------------
// StructDescriptor

/// The resolved wire layout of a record type.
///
/// Own and embedded fields are flattened depth-first in declaration order; a
/// promoted field takes the position of the field that embeds it. When names
/// collide, the shallowest field wins, and a tie at the same depth drops every
/// candidate.
#[derive(Debug)]
pub struct StructDescriptor {
    type_path: &'static str,
    fields: Box<[FieldDescriptor]>,
    exact: HashMap<&'static str, usize>,
    folded: HashMap<Box<str>, usize>,
}

impl StructDescriptor {
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Position of the field exposed as `key`.
    ///
    /// Exact match first, then ASCII case-insensitive if allowed.
    pub fn position(&self, key: &str, case_insensitive: bool) -> Option<usize> {
        if let Some(&index) = self.exact.get(key) {
            return Some(index);
        }
        if case_insensitive {
            return self.folded.get(key.to_ascii_lowercase().as_str()).copied();
        }
        None
    }

    /// The field exposed as `key`, see [`position`](Self::position).
    #[inline]
    pub fn field(&self, key: &str, case_insensitive: bool) -> Option<&FieldDescriptor> {
        self.position(key, case_insensitive).map(|i| &self.fields[i])
    }

    fn build(info: &'static TypeInfo) -> Result<Self, Error> {
        let Some(layout) = info.as_struct() else {
            return Err(Error::unsupported(info.type_path()));
        };

        let mut candidates = Vec::new();
        collect(layout, &mut Vec::new(), &mut candidates)?;

        // Shallowest depth of every name, and how many fields sit there.
        let mut best: HashMap<&'static str, (usize, usize)> = HashMap::default();
        for field in &candidates {
            let depth = field.depth();
            best.entry(field.name)
                .and_modify(|(min, count)| {
                    if depth < *min {
                        *min = depth;
                        *count = 1;
                    } else if depth == *min {
                        *count += 1;
                    }
                })
                .or_insert((depth, 1));
        }

        let mut fields = Vec::with_capacity(candidates.len());
        for field in candidates {
            let (min, count) = best[&field.name];
            if field.depth() != min {
                continue;
            }
            if count > 1 {
                log::warn!(
                    "`{}`: field `{}` is ambiguous at depth {min}, excluded",
                    info.type_path(),
                    field.name,
                );
                continue;
            }
            fields.push(field);
        }

        let mut exact = HashMap::default();
        let mut folded = HashMap::default();
        for (index, field) in fields.iter().enumerate() {
            exact.insert(field.name, index);
            folded
                .entry(field.name.to_ascii_lowercase().into_boxed_str())
                .or_insert(index);
        }

        log::trace!(
            "described `{}` with {} fields",
            info.type_path(),
            fields.len()
        );

        Ok(Self {
            type_path: info.type_path(),
            fields: fields.into_boxed_slice(),
            exact,
            folded,
        })
    }
}

fn collect(
    layout: &StructInfo,
    prefix: &mut Vec<usize>,
    out: &mut Vec<FieldDescriptor>,
) -> Result<(), Error> {
    for field in layout.fields() {
        prefix.push(field.index());
        let type_info = field.type_info();
        if field.flags().contains(FieldFlags::EMBED) {
            let Some(inner) = type_info.as_struct() else {
                return Err(Error::unsupported(type_info.type_path()));
            };
            collect(inner, prefix, out)?;
        } else {
            out.push(FieldDescriptor {
                name: field.name(),
                ident: field.ident(),
                path: prefix.as_slice().into(),
                flags: field.flags(),
                type_info,
                hooks: hooks_of(type_info).flags,
            });
        }
        prefix.pop();
    }
    Ok(())
}

/// The cached descriptor of the record type `info`.
///
/// Built on first use and shared by every thread afterwards. Fails with
/// [`UnsupportedType`](crate::ErrorKind::UnsupportedType) if `info` is not a
/// record or embeds a non-record.
///
/// ```
/// use oc_conv::{Typed, cache::describe, derive::Reflect};
///
/// #[derive(Reflect, Clone)]
/// struct Base {
///     id: u64,
///     name: String,
/// }
///
/// #[derive(Reflect, Clone)]
/// struct User {
///     #[conv(embed)]
///     base: Base,
///     #[conv(rename = "name")]
///     display: String,
/// }
///
/// let desc = describe(User::type_info()).unwrap();
/// let names: Vec<_> = desc.fields().iter().map(|f| f.name()).collect();
/// assert_eq!(names, ["id", "name"]);
/// assert_eq!(desc.field("name", false).unwrap().ident(), "display");
/// assert_eq!(desc.field("ID", true).unwrap().path(), [0, 0]);
/// ```
pub fn describe(info: &'static TypeInfo) -> Result<&'static StructDescriptor, Error> {
    describe_by_id(info.type_id(), info)
}

#[inline(never)]
fn describe_by_id(
    type_id: TypeId,
    info: &'static TypeInfo,
) -> Result<&'static StructDescriptor, Error> {
    DESCRIPTORS.try_get_or_build(type_id, || StructDescriptor::build(info))
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;

    use super::describe;
    use crate::Typed;
    use crate::derive::Reflect;

    #[derive(Reflect, Clone)]
    struct Inner {
        a: i32,
        b: i32,
    }

    #[derive(Reflect, Clone)]
    struct Other {
        b: i32,
        c: i32,
    }

    #[derive(Reflect, Clone)]
    struct Outer {
        #[conv(embed)]
        inner: Inner,
        #[conv(embed)]
        other: Other,
        a: String,
    }

    #[test]
    fn shadowing_rules() {
        let desc = describe(Outer::type_info()).unwrap();
        let names: Vec<_> = desc.fields().iter().map(|f| f.name()).collect();
        // `a` is shadowed by the shallower own field, `b` is ambiguous.
        assert_eq!(names, ["c", "a"]);
        assert_eq!(desc.field("a", false).unwrap().depth(), 0);
        assert_eq!(desc.field("c", false).unwrap().path(), [1, 1]);
        assert!(desc.field("b", true).is_none());
    }

    #[test]
    fn embedding_a_scalar_is_unsupported() {
        #[derive(Reflect, Clone)]
        struct Bad {
            #[conv(embed)]
            n: u8,
        }
        assert!(describe(Bad::type_info()).is_err());
        assert!(describe(u8::type_info()).is_err());
    }

    #[test]
    fn concurrent_first_use_yields_one_descriptor() {
        #[derive(Reflect, Clone)]
        struct Fresh {
            x: u8,
        }
        #[derive(Reflect, Clone)]
        struct Unrelated {
            y: u8,
        }

        let before = describe(Unrelated::type_info()).unwrap();
        let barrier = Barrier::new(16);
        let addrs: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        core::ptr::from_ref(describe(Fresh::type_info()).unwrap()) as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
        assert!(core::ptr::eq(before, describe(Unrelated::type_info()).unwrap()));
        assert_eq!(before.fields()[0].name(), "y");
    }
}
