//! The recursive encode dispatcher.

use crate::cache::{FieldDescriptor, StructDescriptor, describe};
use crate::hooks::{EncodeRoute, hooks_of};
use crate::ops::{List, Map, ReflectRef, walk};
use crate::predicate::{is_empty, is_zero};
use crate::{Error, ErrorKind, Options, PathSegment, Reflect, Sink};

/// Walks values and emits their canonical events to a [`Sink`].
///
/// One encoder can encode any number of values in sequence. Custom encoders
/// receive it to emit primitives through [`sink`](Self::sink) or nested values
/// through [`encode`](Self::encode).
pub struct Encoder<'a> {
    sink: &'a mut dyn Sink,
    options: Options,
    depth: usize,
}

impl<'a> Encoder<'a> {
    #[inline]
    pub fn new(sink: &'a mut dyn Sink) -> Self {
        Self::with_options(sink, Options::DEFAULT)
    }

    #[inline]
    pub fn with_options(sink: &'a mut dyn Sink, options: Options) -> Self {
        Self {
            sink,
            options,
            depth: 0,
        }
    }

    /// The underlying sink, for emitting primitives directly.
    #[inline]
    pub fn sink(&mut self) -> &mut dyn Sink {
        &mut *self.sink
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Encode one complete value.
    pub fn encode(&mut self, value: &dyn Reflect) -> Result<(), Error> {
        let hooks = hooks_of(value.reflect_type_info());
        match hooks.encode {
            EncodeRoute::Custom(encode) => encode(value, self),
            EncodeRoute::Text(marshal) => match marshal(value) {
                Ok(text) => self.sink.write_string(&text),
                Err(e) => Err(Error::hook(value.reflect_type_info().type_path(), e)),
            },
            EncodeRoute::Error(message) => self.sink.write_error(&message(value)),
            EncodeRoute::Structural => self.encode_structural(value),
        }
    }

    fn encode_structural(&mut self, value: &dyn Reflect) -> Result<(), Error> {
        match value.reflect_ref() {
            ReflectRef::Nil | ReflectRef::Optional(None) => self.sink.write_nil(),
            ReflectRef::Bool(v) => self.sink.write_bool(v),
            ReflectRef::Int(v) => self.sink.write_int(v),
            ReflectRef::Uint(v) => self.sink.write_uint(v),
            ReflectRef::Float(v) => self.sink.write_float(v),
            ReflectRef::String(v) => self.sink.write_string(v),
            ReflectRef::Bytes(v) => self.sink.write_bytes(v),
            ReflectRef::Time(v) => self.sink.write_time(v),
            ReflectRef::Duration(v) => self.sink.write_duration(v),
            ReflectRef::Optional(Some(inner)) | ReflectRef::Pointer(inner) => self.encode(inner),
            ReflectRef::List(list) => self.nested(|enc| enc.encode_list(list)),
            ReflectRef::Map(map) => self.nested(|enc| enc.encode_map(map)),
            ReflectRef::Struct(_) => {
                let desc = describe(value.reflect_type_info())?;
                self.nested(|enc| enc.encode_struct(value, desc))
            }
            ReflectRef::Opaque => Err(Error::unsupported(value.reflect_type_info().type_path())),
        }
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self) -> Result<(), Error>) -> Result<(), Error> {
        if let Some(max) = self.options.max_depth
            && self.depth >= max
        {
            return Err(Error::new(ErrorKind::DepthLimit(max)));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn encode_list(&mut self, list: &dyn List) -> Result<(), Error> {
        let len = list.len();
        self.sink.begin_array(Some(len))?;
        for index in 0..len {
            let Some(item) = list.get(index) else {
                return Err(Error::malformed(format!("list shrank below {index}")));
            };
            self.sink.array_next(index)?;
            self.encode(item)
                .map_err(|e| e.at(PathSegment::Index(index)))?;
        }
        self.sink.end_array()
    }

    fn encode_map(&mut self, map: &dyn Map) -> Result<(), Error> {
        self.sink.begin_map(Some(map.len()))?;
        let mut index = 0;
        map.for_each_entry(&mut |key, value| {
            self.sink.map_next(index)?;
            self.encode(key)?;
            self.sink.map_value()?;
            self.encode(value)
                .map_err(|e| e.at(PathSegment::Index(index)))?;
            index += 1;
            Ok(())
        })?;
        self.sink.end_map()
    }

    fn encode_struct(&mut self, value: &dyn Reflect, desc: &StructDescriptor) -> Result<(), Error> {
        // One pass to count the entries that survive omission.
        let count = desc
            .fields()
            .iter()
            .filter(|f| present(value, f).is_some())
            .count();

        self.sink.begin_map(Some(count))?;
        let mut index = 0;
        for field in desc.fields() {
            let Some(v) = present(value, field) else { continue };
            self.sink.map_next(index)?;
            self.sink.write_string(field.name())?;
            self.sink.map_value()?;
            self.encode(v)
                .map_err(|e| e.at(PathSegment::Field(field.name())))?;
            index += 1;
        }
        self.sink.end_map()
    }
}

// The field's value, unless its omit flags drop it.
fn present<'v>(value: &'v dyn Reflect, field: &FieldDescriptor) -> Option<&'v dyn Reflect> {
    let v = walk(value, field.path())?;
    if (field.omit_empty() && is_empty(v)) || (field.omit_zero() && is_zero(v)) {
        None
    } else {
        Some(v)
    }
}

/// Encode `value` into `sink` with default [`Options`].
///
/// ```
/// use oc_conv::testing::{Event, RecordingSink};
///
/// let mut sink = RecordingSink::default();
/// oc_conv::encode(&mut sink, &vec![1_i32, -2]).unwrap();
/// assert_eq!(sink.events, [
///     Event::BeginArray(Some(2)),
///     Event::Int(1),
///     Event::Int(-2),
///     Event::EndArray,
/// ]);
/// ```
pub fn encode(sink: &mut dyn Sink, value: &dyn Reflect) -> Result<(), Error> {
    Encoder::new(sink).encode(value)
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use core::time::Duration;
    use std::collections::HashMap;
    use std::time::SystemTime;

    use crate::derive::Reflect;
    use crate::hooks::ValueEncoder;
    use crate::impls::ErrorValue;
    use crate::testing::{Event, RecordingSink};
    use crate::{Encoder, Error, ErrorKind, Options, encode};

    fn events(value: &dyn crate::Reflect) -> Vec<Event> {
        let mut sink = RecordingSink::default();
        encode(&mut sink, value).unwrap();
        sink.events
    }

    #[derive(Reflect, Clone)]
    struct Meta {
        #[conv(omit_empty)]
        note: String,
        #[conv(omit_zero)]
        at: SystemTime,
        #[conv(skip)]
        cache: u64,
    }

    #[derive(Reflect, Clone)]
    struct Doc {
        id: u32,
        #[conv(embed)]
        meta: Meta,
        tags: Vec<String>,
        raw: Vec<u8>,
    }

    #[test]
    fn bytes_versus_array() {
        assert_eq!(events(&vec![1_u8, 2, 3]), [Event::Bytes(vec![1, 2, 3])]);
        assert_eq!(
            events(&vec![1_i32, 2, 3]),
            [
                Event::BeginArray(Some(3)),
                Event::Int(1),
                Event::Int(2),
                Event::Int(3),
                Event::EndArray
            ]
        );
    }

    #[test]
    fn records_flatten_and_omit() {
        let doc = Doc {
            id: 7,
            meta: Meta {
                note: String::new(),
                at: SystemTime::UNIX_EPOCH,
                cache: 99,
            },
            tags: vec!["a".into()],
            raw: vec![],
        };
        assert_eq!(
            events(&doc),
            [
                Event::BeginMap(Some(3)),
                Event::String("id".into()),
                Event::Uint(7),
                Event::String("tags".into()),
                Event::BeginArray(Some(1)),
                Event::String("a".into()),
                Event::EndArray,
                Event::String("raw".into()),
                Event::Bytes(vec![]),
                Event::EndMap,
            ]
        );
    }

    #[test]
    fn maps_are_key_ordered() {
        let map = HashMap::from([("b".to_owned(), 2_u8), ("a".to_owned(), 1)]);
        assert_eq!(
            events(&map),
            [
                Event::BeginMap(Some(2)),
                Event::String("a".into()),
                Event::Uint(1),
                Event::String("b".into()),
                Event::Uint(2),
                Event::EndMap
            ]
        );
        assert_eq!(events(&BTreeMap::<u8, u8>::new()), [Event::BeginMap(Some(0)), Event::EndMap]);
    }

    #[test]
    fn scalars_emit_one_event() {
        assert_eq!(events(&()), [Event::Nil]);
        assert_eq!(events(&Some(3_i8)), [Event::Int(3)]);
        assert_eq!(events(&None::<i8>), [Event::Nil]);
        assert_eq!(events(&Box::new(1.5_f32)), [Event::Float(1.5)]);
        assert_eq!(events(&Duration::from_millis(5)), [Event::Duration(Duration::from_millis(5))]);
        assert_eq!(events(&ErrorValue::new("boom")), [Event::Error("boom".into())]);
    }

    #[derive(Reflect, Clone, Default)]
    #[conv(opaque, encoder)]
    struct Celsius(f64);

    impl ValueEncoder for Celsius {
        fn encode_value(&self, enc: &mut Encoder<'_>) -> Result<(), Error> {
            enc.sink().write_string(&format!("{}C", self.0))
        }
    }

    #[derive(Reflect, Clone, Default)]
    #[conv(encoder)]
    struct Shadowed {
        inner: Vec<i32>,
    }

    impl ValueEncoder for Shadowed {
        fn encode_value(&self, enc: &mut Encoder<'_>) -> Result<(), Error> {
            enc.sink().write_int(self.inner.len() as i64)
        }
    }

    #[test]
    fn custom_encoders_bypass_structure() {
        assert_eq!(events(&Celsius(21.5)), [Event::String("21.5C".into())]);
        assert_eq!(events(&Shadowed { inner: vec![1, 2] }), [Event::Int(2)]);
        assert_eq!(crate::classify(&Shadowed::default()).unwrap(), crate::Type::Int);
    }

    #[test]
    fn depth_guard() {
        let nested = vec![vec![vec![0_i32]]];
        let mut sink = RecordingSink::default();
        let options = Options {
            max_depth: Some(2),
            ..Options::DEFAULT
        };
        let err = Encoder::with_options(&mut sink, options)
            .encode(&nested)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DepthLimit(2)));
        assert_eq!(err.path_string(), "[0][0]");
    }
}
