use core::fmt;

use crate::hooks::{HookTable, ValueDecoder};
use crate::info::{NonGenericTypeInfoCell, Shape, TypeInfo};
use crate::ops::{ReflectMut, ReflectRef};
use crate::{Decoder, Error, Reflect, Type, Typed};

/// An error reduced to its message.
///
/// Encodes as [`Type::Error`]. Decodes from an error, a string, or nil (the empty
/// message). Use it as a field type to carry failures across the wire.
///
/// ```
/// use oc_conv::impls::ErrorValue;
/// use oc_conv::testing::{Event, RecordingSink};
///
/// let mut sink = RecordingSink::default();
/// oc_conv::encode(&mut sink, &ErrorValue::new("timeout")).unwrap();
/// assert_eq!(sink.events, [Event::Error("timeout".into())]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ErrorValue {
    message: String,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for ErrorValue {}

impl ValueDecoder for ErrorValue {
    fn decode_value(&mut self, dec: &mut Decoder<'_>) -> Result<(), Error> {
        let source = dec.source();
        let message = match source.peek()? {
            Type::Error => source.read_error()?,
            Type::String => source.read_string()?,
            Type::Nil => {
                source.read_nil()?;
                ""
            }
            found => return Err(Error::mismatch(Type::Error.name(), found)),
        };
        self.message.clear();
        self.message.push_str(message);
        Ok(())
    }
}

impl Typed for ErrorValue {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| {
            TypeInfo::new::<Self>(Shape::Opaque).with_hooks(
                HookTable::EMPTY
                    .with_error::<Self>()
                    .with_decoder::<Self>()
                    .with_zero_eq::<Self>(),
            )
        })
    }

    #[inline]
    fn zero_value() -> Self {
        Self::default()
    }
}

impl Reflect for ErrorValue {
    #[inline]
    fn reflect_type_info(&self) -> &'static TypeInfo {
        <Self as Typed>::type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Opaque
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Opaque
    }

    #[inline]
    fn reflect_reset(&mut self) {
        self.message.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorValue;
    use crate::testing::{Event, ReplaySource};
    use crate::{Type, classify, decode, predicate};

    #[test]
    fn decodes_from_text_and_nil() {
        let mut value = ErrorValue::new("old");
        decode(&mut ReplaySource::new(vec![Event::String("new".into())]), &mut value).unwrap();
        assert_eq!(value.message(), "new");
        decode(&mut ReplaySource::new(vec![Event::Nil]), &mut value).unwrap();
        assert_eq!(value, ErrorValue::default());
        assert!(decode(&mut ReplaySource::new(vec![Event::Int(1)]), &mut value).is_err());
    }

    #[test]
    fn classifies_as_error() {
        assert_eq!(classify(&ErrorValue::new("x")).unwrap(), Type::Error);
        assert!(predicate::is_zero(&ErrorValue::default()));
        assert!(!predicate::is_zero(&ErrorValue::new("x")));
    }
}
