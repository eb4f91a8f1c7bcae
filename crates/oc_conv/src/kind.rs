use core::fmt;
use core::time::Duration;
use std::time::SystemTime;

use crate::hooks::{EncodeRoute, hooks_of};
use crate::ops::ReflectRef;
use crate::{Encoder, Error, Reflect, Sink};

// -----------------------------------------------------------------------------
// Type

/// The closed set of kinds every wire format must represent.
///
/// Variants are ordered by declaration.
///
/// ```
/// use oc_conv::Type;
///
/// assert!(Type::Nil < Type::Map);
/// assert_eq!(Type::Duration.to_string(), "duration");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Nil,
    Bool,
    Int,
    Uint,
    Float,
    String,
    Bytes,
    Time,
    Duration,
    Error,
    Array,
    Map,
}

impl Type {
    /// All kinds, in order.
    pub const ALL: [Type; 12] = [
        Type::Nil,
        Type::Bool,
        Type::Int,
        Type::Uint,
        Type::Float,
        Type::String,
        Type::Bytes,
        Type::Time,
        Type::Duration,
        Type::Error,
        Type::Array,
        Type::Map,
    ];

    /// Lowercase name, as used in messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Time => "time",
            Self::Duration => "duration",
            Self::Error => "error",
            Self::Array => "array",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// -----------------------------------------------------------------------------
// classify

/// Returns the canonical [`Type`] of `value`.
///
/// Hooks win over shape: a text marshaler is a `String`, an error-like type is an
/// `Error`, and a type with a custom encoder is whatever its encoder emits first.
///
/// ```
/// use oc_conv::{Type, classify};
///
/// assert_eq!(classify(&vec![1_u8, 2]).unwrap(), Type::Bytes);
/// assert_eq!(classify(&vec![1_u16, 2]).unwrap(), Type::Array);
/// assert_eq!(classify(&None::<i32>).unwrap(), Type::Nil);
/// ```
pub fn classify(value: &dyn Reflect) -> Result<Type, Error> {
    let info = value.reflect_type_info();
    match hooks_of(info).encode {
        EncodeRoute::Custom(encode) => {
            let mut probe = FirstEvent(None);
            encode(value, &mut Encoder::new(&mut probe))?;
            probe.0.ok_or_else(|| Error::unsupported(info.type_path()))
        }
        EncodeRoute::Text(_) => Ok(Type::String),
        EncodeRoute::Error(_) => Ok(Type::Error),
        EncodeRoute::Structural => match value.reflect_ref() {
            ReflectRef::Nil | ReflectRef::Optional(None) => Ok(Type::Nil),
            ReflectRef::Bool(_) => Ok(Type::Bool),
            ReflectRef::Int(_) => Ok(Type::Int),
            ReflectRef::Uint(_) => Ok(Type::Uint),
            ReflectRef::Float(_) => Ok(Type::Float),
            ReflectRef::String(_) => Ok(Type::String),
            ReflectRef::Bytes(_) => Ok(Type::Bytes),
            ReflectRef::Time(_) => Ok(Type::Time),
            ReflectRef::Duration(_) => Ok(Type::Duration),
            ReflectRef::Optional(Some(inner)) | ReflectRef::Pointer(inner) => classify(inner),
            ReflectRef::List(_) => Ok(Type::Array),
            ReflectRef::Map(_) | ReflectRef::Struct(_) => Ok(Type::Map),
            ReflectRef::Opaque => Err(Error::unsupported(info.type_path())),
        },
    }
}

// Discards everything, remembers the kind of the first event.
struct FirstEvent(Option<Type>);

impl FirstEvent {
    #[inline]
    fn saw(&mut self, ty: Type) -> Result<(), Error> {
        self.0.get_or_insert(ty);
        Ok(())
    }
}

impl Sink for FirstEvent {
    fn write_nil(&mut self) -> Result<(), Error> {
        self.saw(Type::Nil)
    }
    fn write_bool(&mut self, _: bool) -> Result<(), Error> {
        self.saw(Type::Bool)
    }
    fn write_int(&mut self, _: i64) -> Result<(), Error> {
        self.saw(Type::Int)
    }
    fn write_uint(&mut self, _: u64) -> Result<(), Error> {
        self.saw(Type::Uint)
    }
    fn write_float(&mut self, _: f64) -> Result<(), Error> {
        self.saw(Type::Float)
    }
    fn write_string(&mut self, _: &str) -> Result<(), Error> {
        self.saw(Type::String)
    }
    fn write_bytes(&mut self, _: &[u8]) -> Result<(), Error> {
        self.saw(Type::Bytes)
    }
    fn write_time(&mut self, _: SystemTime) -> Result<(), Error> {
        self.saw(Type::Time)
    }
    fn write_duration(&mut self, _: Duration) -> Result<(), Error> {
        self.saw(Type::Duration)
    }
    fn write_error(&mut self, _: &str) -> Result<(), Error> {
        self.saw(Type::Error)
    }
    fn begin_array(&mut self, _: Option<usize>) -> Result<(), Error> {
        self.saw(Type::Array)
    }
    fn end_array(&mut self) -> Result<(), Error> {
        Ok(())
    }
    fn begin_map(&mut self, _: Option<usize>) -> Result<(), Error> {
        self.saw(Type::Map)
    }
    fn end_map(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;
    use std::collections::BTreeMap;
    use std::time::SystemTime;

    use super::{Type, classify};
    use crate::impls::ErrorValue;

    #[test]
    fn order_and_names() {
        let mut sorted = Type::ALL;
        sorted.sort();
        assert_eq!(sorted, Type::ALL);
        let names: Vec<_> = Type::ALL.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            names,
            [
                "nil", "bool", "int", "uint", "float", "string", "bytes", "time", "duration",
                "error", "array", "map"
            ]
        );
    }

    #[test]
    fn builtin_shapes() {
        assert_eq!(classify(&()).unwrap(), Type::Nil);
        assert_eq!(classify(&true).unwrap(), Type::Bool);
        assert_eq!(classify(&-3_i16).unwrap(), Type::Int);
        assert_eq!(classify(&3_usize).unwrap(), Type::Uint);
        assert_eq!(classify(&1.5_f32).unwrap(), Type::Float);
        assert_eq!(classify(&String::from("x")).unwrap(), Type::String);
        assert_eq!(classify(&[0_u8; 4]).unwrap(), Type::Bytes);
        assert_eq!(classify(&[0_i8; 4]).unwrap(), Type::Array);
        assert_eq!(classify(&SystemTime::UNIX_EPOCH).unwrap(), Type::Time);
        assert_eq!(classify(&Duration::from_secs(1)).unwrap(), Type::Duration);
        assert_eq!(classify(&ErrorValue::new("boom")).unwrap(), Type::Error);
        assert_eq!(classify(&BTreeMap::<String, i32>::new()).unwrap(), Type::Map);
        assert_eq!(classify(&Some(Box::new(7_u8))).unwrap(), Type::Uint);
    }
}
