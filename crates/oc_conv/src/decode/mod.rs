//! The pull-based decode dispatcher.

mod coerce;

use crate::adapter::has_next;
use crate::cache::{StructDescriptor, describe};
use crate::hooks::{DecodeRoute, hooks_of};
use crate::info::Shape;
use crate::ops::{List, Map, ReflectMut, Struct, walk_mut};
use crate::{Error, ErrorKind, Options, PathSegment, Reflect, Source, Type};

/// Upper bound on the elements reserved ahead of decoding.
///
/// Counts come from the input, so anything beyond this grows as elements arrive.
pub(crate) const PREALLOC_LIMIT: usize = 4096;

/// Pulls canonical events from a [`Source`] and assigns them into values.
///
/// Targets are updated in place: a record keeps the fields the input does not
/// mention, a growable sequence is cleared and refilled, a mapping gains or
/// overwrites the decoded entries.
pub struct Decoder<'a> {
    source: &'a mut dyn Source,
    options: Options,
    depth: usize,
}

impl<'a> Decoder<'a> {
    #[inline]
    pub fn new(source: &'a mut dyn Source) -> Self {
        Self::with_options(source, Options::DEFAULT)
    }

    #[inline]
    pub fn with_options(source: &'a mut dyn Source, options: Options) -> Self {
        Self {
            source,
            options,
            depth: 0,
        }
    }

    /// The underlying source, for reading primitives directly.
    #[inline]
    pub fn source(&mut self) -> &mut dyn Source {
        &mut *self.source
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Decode one complete value into `target`.
    pub fn decode(&mut self, target: &mut dyn Reflect) -> Result<(), Error> {
        let info = target.reflect_type_info();
        match hooks_of(info).decode {
            DecodeRoute::Custom(decode) => decode(target, self),
            DecodeRoute::Text(unmarshal) => match self.source.peek()? {
                Type::String => {
                    let text = self.source.read_string()?;
                    unmarshal(target, text).map_err(|e| Error::hook(info.type_path(), e))
                }
                Type::Nil => {
                    self.source.read_nil()?;
                    target.reflect_reset();
                    Ok(())
                }
                _ => self.decode_structural(target),
            },
            DecodeRoute::Structural => self.decode_structural(target),
        }
    }

    fn decode_structural(&mut self, target: &mut dyn Reflect) -> Result<(), Error> {
        let info = target.reflect_type_info();
        let found = self.source.peek()?;

        if found == Type::Nil && !matches!(info.shape(), Shape::Optional(_) | Shape::Pointer(_)) {
            self.source.read_nil()?;
            target.reflect_reset();
            return Ok(());
        }

        match target.reflect_mut() {
            ReflectMut::Optional(opt) => {
                if found == Type::Nil {
                    self.source.read_nil()?;
                    opt.set_none();
                    Ok(())
                } else {
                    self.decode(opt.get_or_insert_zero())
                }
            }
            ReflectMut::Pointer(inner) => self.decode(inner),
            ReflectMut::List(list) if found == Type::Array => {
                self.nested(|dec| dec.decode_list(list))
            }
            ReflectMut::Map(map) if found == Type::Map => self.nested(|dec| dec.decode_map(map)),
            ReflectMut::Struct(record) if found == Type::Map => {
                let desc = describe(info)?;
                self.nested(|dec| dec.decode_struct(record, desc))
            }
            ReflectMut::Opaque => Err(Error::unsupported(info.type_path())),
            other => {
                let name = coerce::expected(&other);
                if coerce::scalar(&mut *self.source, other, found)? {
                    Ok(())
                } else {
                    Err(Error::mismatch(name, found))
                }
            }
        }
    }

    /// Consume one value of any kind, counting its containers against
    /// [`Options::max_depth`].
    pub fn skip(&mut self) -> Result<(), Error> {
        if self.options.max_depth.is_none() {
            return self.source.skip();
        }
        match self.source.peek()? {
            Type::Array => self.nested(|dec| {
                let len = dec.source.begin_array()?;
                let mut index = 0;
                while has_next(len, index, |i| dec.source.next_element(i))? {
                    dec.skip()?;
                    index += 1;
                }
                dec.source.end_array()
            }),
            Type::Map => self.nested(|dec| {
                let len = dec.source.begin_map()?;
                let mut index = 0;
                while has_next(len, index, |i| dec.source.next_entry(i))? {
                    dec.skip()?;
                    dec.source.map_value()?;
                    dec.skip()?;
                    index += 1;
                }
                dec.source.end_map()
            }),
            _ => self.source.skip(),
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

    fn decode_list(&mut self, list: &mut dyn List) -> Result<(), Error> {
        let type_path = list.reflect_type_info().type_path();
        let len = self.source.begin_array()?;
        let mut index = 0;
        match list.fixed_len() {
            None => {
                list.clear();
                if let Some(len) = len {
                    list.reserve(len.min(PREALLOC_LIMIT));
                }
                while has_next(len, index, |i| self.source.next_element(i))? {
                    let Some(slot) = list.push_zero() else {
                        return Err(Error::unsupported(type_path));
                    };
                    self.decode(slot)
                        .map_err(|e| e.at(PathSegment::Index(index)))?;
                    index += 1;
                }
            }
            Some(fixed) => {
                while has_next(len, index, |i| self.source.next_element(i))? {
                    let Some(slot) = list.get_mut(index) else {
                        return Err(Error::length(fixed).at(PathSegment::Index(index)));
                    };
                    self.decode(slot)
                        .map_err(|e| e.at(PathSegment::Index(index)))?;
                    index += 1;
                }
                for rest in index..fixed {
                    if let Some(slot) = list.get_mut(rest) {
                        slot.reflect_reset();
                    }
                }
            }
        }
        self.source.end_array()
    }

    fn decode_map(&mut self, map: &mut dyn Map) -> Result<(), Error> {
        let len = self.source.begin_map()?;
        let mut index = 0;
        while has_next(len, index, |i| self.source.next_entry(i))? {
            map.insert_with(&mut |key, value| {
                self.decode(key)?;
                self.source.map_value()?;
                self.decode(value)
            })
            .map_err(|e| e.at(PathSegment::Index(index)))?;
            index += 1;
        }
        self.source.end_map()
    }

    fn decode_struct(&mut self, record: &mut dyn Struct, desc: &StructDescriptor) -> Result<(), Error> {
        let len = self.source.begin_map()?;
        let case_insensitive = self.options.case_insensitive_fields;
        let mut index = 0;
        while has_next(len, index, |i| self.source.next_entry(i))? {
            let position = self
                .read_key(desc, case_insensitive)
                .map_err(|e| e.at(PathSegment::Index(index)))?;
            self.source.map_value()?;

            let field = position.map(|p| &desc.fields()[p]);
            let slot = match field {
                Some(field) => walk_mut(&mut *record, field.path()),
                None => None,
            };
            match (field, slot) {
                (Some(field), Some(slot)) => self
                    .decode(slot)
                    .map_err(|e| e.at(PathSegment::Field(field.name())))?,
                _ => self.skip()?,
            }
            index += 1;
        }
        self.source.end_map()
    }

    // Record keys are text; byte keys must be UTF-8.
    fn read_key(&mut self, desc: &StructDescriptor, case_insensitive: bool) -> Result<Option<usize>, Error> {
        let key = match self.source.peek()? {
            Type::String => self.source.read_string()?,
            Type::Bytes => core::str::from_utf8(self.source.read_bytes()?).map_err(Error::malformed)?,
            found => return Err(Error::mismatch(Type::String.name(), found)),
        };
        let position = desc.position(key, case_insensitive);
        if position.is_none() {
            log::trace!("`{}` has no field `{key}`, skipping", desc.type_path());
        }
        Ok(position)
    }
}

/// Decode one value from `source` into `target` with default [`Options`].
///
/// ```
/// use oc_conv::testing::{Event, ReplaySource};
///
/// let mut source = ReplaySource::new(vec![Event::String("1.5s".into())]);
/// let mut timeout = std::time::Duration::ZERO;
/// oc_conv::decode(&mut source, &mut timeout).unwrap();
/// assert_eq!(timeout.as_millis(), 1_500);
/// ```
pub fn decode(source: &mut dyn Source, target: &mut dyn Reflect) -> Result<(), Error> {
    Decoder::new(source).decode(target)
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use core::time::Duration;
    use std::collections::HashMap;
    use std::time::SystemTime;

    use crate::derive::Reflect;
    use crate::hooks::{TextMarshal, TextUnmarshal, ValueDecoder};
    use crate::impls::ErrorValue;
    use crate::testing::{Event, RecordingSink, ReplaySource};
    use crate::{BoxError, Decoder, Error, ErrorKind, Options, Type, decode, encode};

    fn from_events<T: crate::Typed>(events: Vec<Event>) -> Result<T, Error> {
        let mut value = T::zero_value();
        let mut source = ReplaySource::new(events);
        decode(&mut source, &mut value)?;
        assert!(source.is_finished(), "trailing events");
        Ok(value)
    }

    fn round_trip<T: crate::Typed>(value: &T) -> T {
        let mut sink = RecordingSink::default();
        encode(&mut sink, value).unwrap();
        from_events(sink.events).unwrap()
    }

    fn string(s: &str) -> Event {
        Event::String(s.into())
    }

    #[derive(Reflect, Clone, Debug, PartialEq)]
    struct Inner {
        a: i32,
        b: String,
    }

    #[derive(Reflect, Clone, Debug, PartialEq)]
    struct Outer {
        #[conv(rename = "ID")]
        id: u64,
        #[conv(embed)]
        inner: Inner,
        #[conv(omit_empty)]
        labels: BTreeMap<String, String>,
        parent: Option<Box<Outer>>,
        grid: [[u8; 2]; 2],
        lease: Duration,
        seen: SystemTime,
    }

    #[test]
    fn records_round_trip() {
        let value = Outer {
            id: u64::MAX,
            inner: Inner {
                a: -3,
                b: "bee".into(),
            },
            labels: BTreeMap::from([("k".into(), "v".into())]),
            parent: Some(Box::new(Outer {
                id: 1,
                inner: Inner {
                    a: 0,
                    b: String::new(),
                },
                labels: BTreeMap::new(),
                parent: None,
                grid: [[0; 2]; 2],
                lease: Duration::ZERO,
                seen: SystemTime::UNIX_EPOCH,
            })),
            grid: [[1, 2], [3, 4]],
            lease: Duration::from_secs(30),
            seen: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        };
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn unknown_keys_are_skipped_and_fields_kept() {
        let mut value = Inner {
            a: 5,
            b: "keep".into(),
        };
        let mut source = ReplaySource::new(vec![
            Event::BeginMap(None),
            string("extra"),
            Event::BeginArray(Some(1)),
            Event::Nil,
            Event::EndArray,
            string("A"),
            Event::Int(9),
            Event::EndMap,
        ]);
        decode(&mut source, &mut value).unwrap();
        assert_eq!(value, Inner { a: 9, b: "keep".into() });

        let strict = Options {
            case_insensitive_fields: false,
            ..Options::DEFAULT
        };
        let mut source = ReplaySource::new(vec![Event::BeginMap(Some(1)), string("A"), Event::Int(1), Event::EndMap]);
        Decoder::with_options(&mut source, strict)
            .decode(&mut value)
            .unwrap();
        assert_eq!(value.a, 9);
    }

    #[test]
    fn nil_resets_and_clears() {
        let mut source = ReplaySource::new(vec![
            Event::BeginMap(Some(2)),
            string("a"),
            Event::Nil,
            string("b"),
            Event::Nil,
            Event::EndMap,
        ]);
        let mut value = Inner {
            a: 4,
            b: "x".into(),
        };
        decode(&mut source, &mut value).unwrap();
        assert_eq!(value, Inner { a: 0, b: String::new() });

        let mut opt = Some(3_u8);
        decode(&mut ReplaySource::new(vec![Event::Nil]), &mut opt).unwrap();
        assert_eq!(opt, None);
    }

    #[test]
    fn overflow_and_mismatch_carry_paths() {
        let err = from_events::<i8>(vec![Event::Int(300)]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Overflow { target: "i8", .. }));

        let err = from_events::<Vec<u8>>(vec![Event::Bool(true)]).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::ShapeMismatch {
                found: Type::Bool,
                ..
            }
        ));

        let err = from_events::<Outer>(vec![
            Event::BeginMap(Some(1)),
            string("grid"),
            Event::BeginArray(Some(1)),
            Event::BeginArray(Some(3)),
            Event::Uint(1),
            Event::Uint(2),
            Event::Uint(3),
            Event::EndArray,
            Event::EndArray,
            Event::EndMap,
        ])
        .unwrap_err();
        assert_eq!(err.path_string(), ".grid[0]");
        assert!(matches!(err.kind(), ErrorKind::Length { expected: 2 }));
    }

    #[test]
    fn fixed_arrays_zero_missing_tail() {
        let mut value = [7_i32; 3];
        let mut source = ReplaySource::new(vec![Event::BeginArray(Some(1)), Event::Int(1), Event::EndArray]);
        decode(&mut source, &mut value).unwrap();
        assert_eq!(value, [1, 0, 0]);

        let err = from_events::<[i32; 1]>(vec![Event::BeginArray(None), Event::Int(1), Event::Int(2), Event::EndArray])
            .unwrap_err();
        assert_eq!(err.path_string(), "[1]");
    }

    #[test]
    fn coercions() {
        assert_eq!(from_events::<f32>(vec![Event::Int(-2)]).unwrap(), -2.0);
        assert_eq!(from_events::<u16>(vec![Event::Float(7.0)]).unwrap(), 7);
        assert!(from_events::<u16>(vec![Event::Float(7.5)]).is_err());
        assert!(from_events::<u8>(vec![Event::Int(-1)]).is_err());
        assert_eq!(from_events::<String>(vec![Event::Bytes(b"hi".to_vec())]).unwrap(), "hi");
        assert!(from_events::<String>(vec![Event::Bytes(vec![0xff])]).is_err());
        assert_eq!(from_events::<Vec<u8>>(vec![string("hi")]).unwrap(), b"hi");
        assert_eq!(from_events::<String>(vec![Event::Error("bad".into())]).unwrap(), "bad");
        assert_eq!(
            from_events::<SystemTime>(vec![string("1970-01-01T00:00:10Z")]).unwrap(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(10)
        );
        assert_eq!(from_events::<Duration>(vec![Event::Int(5)]).unwrap(), Duration::from_nanos(5));
        assert_eq!(
            from_events::<[u8; 4]>(vec![
                Event::BeginArray(Some(2)),
                Event::Uint(1),
                Event::Int(2),
                Event::EndArray
            ])
            .unwrap(),
            [1, 2, 0, 0]
        );
    }

    #[test]
    fn maps_merge_and_overwrite() {
        let mut map = HashMap::from([("a".to_owned(), 1_i64), ("z".to_owned(), 26)]);
        let mut source = ReplaySource::new(vec![
            Event::BeginMap(None),
            string("a"),
            Event::Int(2),
            string("b"),
            Event::Int(3),
            string("a"),
            Event::Int(4),
            Event::EndMap,
        ]);
        decode(&mut source, &mut map).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["a"], 4);
        assert_eq!(map["b"], 3);
        assert_eq!(map["z"], 26);
    }

    #[derive(Reflect, Clone, Default, Debug, PartialEq)]
    #[conv(opaque, text)]
    struct Version(u16, u16);

    impl TextMarshal for Version {
        fn marshal_text(&self) -> Result<String, BoxError> {
            Ok(format!("{}.{}", self.0, self.1))
        }
    }

    impl TextUnmarshal for Version {
        fn unmarshal_text(&mut self, text: &str) -> Result<(), BoxError> {
            let (major, minor) = text.split_once('.').ok_or("missing `.`")?;
            *self = Version(major.parse()?, minor.parse()?);
            Ok(())
        }
    }

    #[derive(Reflect, Clone, Default, Debug, PartialEq)]
    #[conv(decoder)]
    struct Counter {
        hits: u32,
    }

    impl ValueDecoder for Counter {
        fn decode_value(&mut self, dec: &mut Decoder<'_>) -> Result<(), Error> {
            self.hits = u32::try_from(dec.source().read_uint()?).map_err(|_| Error::overflow("hits", "u32"))?;
            Ok(())
        }
    }

    #[test]
    fn hooks_take_precedence() {
        assert_eq!(round_trip(&Version(1, 20)), Version(1, 20));
        assert_eq!(from_events::<Version>(vec![Event::Nil]).unwrap(), Version(0, 0));

        let err = from_events::<Version>(vec![string("one")]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Hook { .. }));
        // No structure to fall back on.
        assert!(from_events::<Version>(vec![Event::Uint(1)]).is_err());

        assert_eq!(from_events::<Counter>(vec![Event::Uint(3)]).unwrap(), Counter { hits: 3 });
        assert_eq!(round_trip(&ErrorValue::new("disk full")), ErrorValue::new("disk full"));
    }

    #[test]
    fn depth_guard() {
        let options = Options {
            max_depth: Some(1),
            ..Options::DEFAULT
        };
        let mut value = Vec::<Vec<u8>>::new();
        let mut source = ReplaySource::new(vec![
            Event::BeginArray(Some(1)),
            Event::BeginArray(Some(0)),
            Event::EndArray,
            Event::EndArray,
        ]);
        // The inner array decodes as bytes, which is not a nesting level.
        Decoder::with_options(&mut source, options)
            .decode(&mut value)
            .unwrap();
        assert_eq!(value, [Vec::<u8>::new()]);

        let mut value = Vec::<Vec<u16>>::new();
        let mut source = ReplaySource::new(vec![
            Event::BeginArray(Some(1)),
            Event::BeginArray(Some(0)),
            Event::EndArray,
            Event::EndArray,
        ]);
        let err = Decoder::with_options(&mut source, options)
            .decode(&mut value)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DepthLimit(1)));
    }

    #[test]
    fn skipped_values_count_toward_depth() {
        let options = Options {
            max_depth: Some(4),
            ..Options::DEFAULT
        };
        let mut events = vec![Event::BeginMap(Some(1)), string("extra")];
        events.extend(vec![Event::BeginArray(Some(1)); 8]);
        events.push(Event::Nil);
        events.extend(vec![Event::EndArray; 8]);
        events.push(Event::EndMap);

        let mut value = Inner { a: 5, b: String::new() };
        let err = Decoder::with_options(&mut ReplaySource::new(events.clone()), options)
            .decode(&mut value)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DepthLimit(4)));
        assert_eq!(value.a, 5);

        let unbounded = Options {
            max_depth: None,
            ..Options::DEFAULT
        };
        let mut source = ReplaySource::new(events);
        Decoder::with_options(&mut source, unbounded)
            .decode(&mut value)
            .unwrap();
        assert!(source.is_finished());
    }

    #[test]
    fn declared_counts_are_not_trusted() {
        let err = from_events::<Vec<u64>>(vec![Event::BeginArray(Some(usize::MAX)), Event::Uint(1), Event::EndArray])
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));

        let err = from_events::<Vec<u8>>(vec![Event::BeginArray(Some(usize::MAX)), Event::Uint(1), Event::EndArray])
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));
    }

    #[test]
    fn bad_record_keys_carry_their_position() {
        let err = from_events::<Inner>(vec![
            Event::BeginMap(Some(2)),
            string("a"),
            Event::Int(1),
            Event::Bool(true),
            Event::Int(2),
            Event::EndMap,
        ])
        .unwrap_err();
        assert_eq!(err.path_string(), "[1]");
        assert!(matches!(err.kind(), ErrorKind::ShapeMismatch { found: Type::Bool, .. }));
    }
}
