//! Value triviality checks used by `omit_empty` and `omit_zero`.
//!
//! [`is_empty`] is shallow and cheap. [`is_zero`] is exact: it holds when the
//! value equals its type's zero value, recursing through arrays and records.

use std::time::SystemTime;

use crate::Reflect;
use crate::cache::describe;
use crate::info::Shape;
use crate::ops::{ReflectRef, walk};

/// Shallow emptiness.
///
/// Text, bytes, sequences and mappings are empty when they have no elements;
/// `false`, numeric zero, zero durations, `()` and `None` are empty. Records,
/// times, errors and opaque values never are.
///
/// ```
/// use oc_conv::predicate::is_empty;
///
/// assert!(is_empty(&0_u8));
/// assert!(is_empty(&Vec::<String>::new()));
/// assert!(!is_empty(&Some(0)));
/// assert!(!is_empty(&[0_i32; 2]));
/// ```
pub fn is_empty(value: &dyn Reflect) -> bool {
    match value.reflect_ref() {
        ReflectRef::Nil | ReflectRef::Optional(None) => true,
        ReflectRef::Bool(b) => !b,
        ReflectRef::Int(n) => n == 0,
        ReflectRef::Uint(n) => n == 0,
        ReflectRef::Float(f) => f == 0.0,
        ReflectRef::String(s) => s.is_empty(),
        ReflectRef::Bytes(b) => b.is_empty(),
        ReflectRef::Duration(d) => d.is_zero(),
        ReflectRef::List(list) => list.len() == 0,
        ReflectRef::Map(map) => map.len() == 0,
        ReflectRef::Pointer(inner) => is_empty(inner),
        ReflectRef::Optional(Some(_))
        | ReflectRef::Time(_)
        | ReflectRef::Struct(_)
        | ReflectRef::Opaque => false,
    }
}

/// Exact zero check.
///
/// Fixed arrays are zero when every element is; records when every wire field
/// is; times when equal to [`SystemTime::UNIX_EPOCH`]. Opaque values consult the
/// type's declared zero comparison and are otherwise never zero.
///
/// ```
/// use oc_conv::predicate::is_zero;
///
/// assert!(is_zero(&[0_i32; 2]));
/// assert!(!is_zero(&[0_i32, 1]));
/// assert!(is_zero(&std::time::SystemTime::UNIX_EPOCH));
/// ```
pub fn is_zero(value: &dyn Reflect) -> bool {
    match value.reflect_ref() {
        ReflectRef::Time(t) => t == SystemTime::UNIX_EPOCH,
        ReflectRef::Bytes(bytes) => match value.reflect_type_info().shape() {
            Shape::List { fixed: Some(_), .. } => bytes.iter().all(|&b| b == 0),
            _ => bytes.is_empty(),
        },
        ReflectRef::List(list) => match list.fixed_len() {
            Some(_) => (0..list.len()).all(|i| list.get(i).is_some_and(is_zero)),
            None => list.len() == 0,
        },
        ReflectRef::Struct(_) => match describe(value.reflect_type_info()) {
            Ok(desc) => desc
                .fields()
                .iter()
                .all(|field| walk(value, field.path()).is_some_and(is_zero)),
            Err(_) => false,
        },
        ReflectRef::Pointer(inner) => is_zero(inner),
        ReflectRef::Opaque => value
            .reflect_type_info()
            .hooks()
            .zero_eq(value)
            .unwrap_or(false),
        _ => is_empty(value),
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;
    use std::collections::BTreeMap;
    use std::time::SystemTime;

    use super::{is_empty, is_zero};
    use crate::derive::Reflect;
    use crate::impls::ErrorValue;

    #[derive(Reflect, Clone)]
    struct Pair {
        a: i32,
        b: String,
    }

    #[derive(Reflect, Clone, Default, PartialEq)]
    #[conv(opaque, zero_eq)]
    struct Handle(u32);

    #[derive(Reflect, Clone, Default)]
    #[conv(opaque)]
    struct Blind(u32);

    #[test]
    fn emptiness_is_shallow() {
        assert!(is_empty(&()));
        assert!(is_empty(&false));
        assert!(is_empty(&0.0_f64));
        assert!(is_empty(&-0.0_f64));
        assert!(is_empty(&String::new()));
        assert!(is_empty(&BTreeMap::<String, u8>::new()));
        assert!(is_empty(&Duration::ZERO));
        assert!(is_empty(&None::<u8>));
        assert!(!is_empty(&Some(String::new())));
        assert!(!is_empty(&SystemTime::UNIX_EPOCH));
        assert!(!is_empty(&Pair { a: 0, b: String::new() }));
        assert!(!is_empty(&ErrorValue::new("")));
    }

    #[test]
    fn zero_is_exact() {
        assert!(is_zero(&Pair { a: 0, b: String::new() }));
        assert!(!is_zero(&Pair { a: 0, b: "x".into() }));
        assert!(is_zero(&[[0_u8; 2]; 2]));
        assert!(!is_zero(&SystemTime::now()));
        assert!(is_zero(&Handle(0)));
        assert!(!is_zero(&Handle(1)));
        assert!(!is_zero(&Blind(0)));
    }
}
