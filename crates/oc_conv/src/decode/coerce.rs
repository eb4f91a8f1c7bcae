//! Scalar assignment with cross-kind coercion.

use core::time::Duration;

use crate::adapter::has_next;
use crate::ops::{BytesMut, ReflectMut};
use crate::text::{parse_duration, parse_time};
use crate::{Error, Source, Type};

/// Name of the kind a target accepts, for mismatch errors.
pub(super) fn expected(target: &ReflectMut<'_>) -> &'static str {
    match target {
        ReflectMut::Nil => Type::Nil.name(),
        ReflectMut::Bool(_) => Type::Bool.name(),
        ReflectMut::Int(_) => Type::Int.name(),
        ReflectMut::Uint(_) => Type::Uint.name(),
        ReflectMut::Float(_) => Type::Float.name(),
        ReflectMut::String(_) => Type::String.name(),
        ReflectMut::Bytes(_) => Type::Bytes.name(),
        ReflectMut::Time(_) => Type::Time.name(),
        ReflectMut::Duration(_) => Type::Duration.name(),
        ReflectMut::List(_) => Type::Array.name(),
        ReflectMut::Map(_) | ReflectMut::Struct(_) => Type::Map.name(),
        ReflectMut::Optional(_) | ReflectMut::Pointer(_) | ReflectMut::Opaque => "value",
    }
}

/// Read one scalar of kind `found` into `target`.
///
/// Returns `Ok(false)` when `target` is not a scalar, leaving the source untouched.
pub(super) fn scalar(source: &mut dyn Source, target: ReflectMut<'_>, found: Type) -> Result<bool, Error> {
    let name = expected(&target);
    let mismatch = || Err(Error::mismatch(name, found));
    match target {
        ReflectMut::Bool(b) => match found {
            Type::Bool => *b = source.read_bool()?,
            _ => return mismatch(),
        },
        ReflectMut::Int(mut n) => match found {
            Type::Int => n.set_i64(source.read_int()?)?,
            Type::Uint => n.set_u64(source.read_uint()?)?,
            Type::Float => n.set_f64(source.read_float()?)?,
            _ => return mismatch(),
        },
        ReflectMut::Uint(mut n) => match found {
            Type::Int => n.set_i64(source.read_int()?)?,
            Type::Uint => n.set_u64(source.read_uint()?)?,
            Type::Float => n.set_f64(source.read_float()?)?,
            _ => return mismatch(),
        },
        ReflectMut::Float(mut n) => match found {
            Type::Int => n.set_i64(source.read_int()?)?,
            Type::Uint => n.set_u64(source.read_uint()?)?,
            Type::Float => n.set_f64(source.read_float()?)?,
            _ => return mismatch(),
        },
        ReflectMut::String(s) => {
            let text = match found {
                Type::String => source.read_string()?,
                Type::Error => source.read_error()?,
                Type::Bytes => core::str::from_utf8(source.read_bytes()?).map_err(Error::malformed)?,
                _ => return mismatch(),
            };
            s.clear();
            s.push_str(text);
        }
        ReflectMut::Bytes(b) => match found {
            Type::Bytes => b.set_bytes(source.read_bytes()?)?,
            Type::String => b.set_bytes(source.read_string()?.as_bytes())?,
            Type::Array => byte_array(source, b)?,
            _ => return mismatch(),
        },
        ReflectMut::Time(t) => match found {
            Type::Time => *t = source.read_time()?,
            Type::String => {
                let text = source.read_string()?;
                *t = parse_time(text).map_err(Error::malformed)?;
            }
            _ => return mismatch(),
        },
        ReflectMut::Duration(d) => match found {
            Type::Duration => *d = source.read_duration()?,
            Type::String => {
                let text = source.read_string()?;
                *d = parse_duration(text).map_err(Error::malformed)?;
            }
            Type::Uint => *d = Duration::from_nanos(source.read_uint()?),
            Type::Int => {
                let nanos = source.read_int()?;
                let nanos = u64::try_from(nanos).map_err(|_| Error::overflow(nanos, "Duration"))?;
                *d = Duration::from_nanos(nanos);
            }
            _ => return mismatch(),
        },
        _ => return Ok(false),
    }
    Ok(true)
}

// A byte sequence spelled as an array of small integers.
fn byte_array(source: &mut dyn Source, target: &mut dyn BytesMut) -> Result<(), Error> {
    let len = source.begin_array()?;
    let mut bytes = Vec::with_capacity(len.unwrap_or(0).min(super::PREALLOC_LIMIT));
    let mut index = 0;
    while has_next(len, index, |i| source.next_element(i))? {
        let byte = match source.peek()? {
            Type::Uint => {
                let v = source.read_uint()?;
                u8::try_from(v).map_err(|_| Error::overflow(v, "u8"))
            }
            Type::Int => {
                let v = source.read_int()?;
                u8::try_from(v).map_err(|_| Error::overflow(v, "u8"))
            }
            found => Err(Error::mismatch(Type::Uint.name(), found)),
        };
        bytes.push(byte.map_err(|e| e.at(crate::PathSegment::Index(index)))?);
        index += 1;
    }
    source.end_array()?;
    target.set_bytes(&bytes)
}
