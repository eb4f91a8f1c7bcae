//! In-memory [`Sink`] and [`Source`] over a flat event list, for tests.

use core::time::Duration;
use std::time::SystemTime;

use crate::{Error, Sink, Source, Type};

/// One canonical event, as seen by a sink.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Time(SystemTime),
    Duration(Duration),
    Error(String),
    BeginArray(Option<usize>),
    EndArray,
    BeginMap(Option<usize>),
    EndMap,
}

impl Event {
    fn kind(&self) -> Option<Type> {
        Some(match self {
            Event::Nil => Type::Nil,
            Event::Bool(_) => Type::Bool,
            Event::Int(_) => Type::Int,
            Event::Uint(_) => Type::Uint,
            Event::Float(_) => Type::Float,
            Event::String(_) => Type::String,
            Event::Bytes(_) => Type::Bytes,
            Event::Time(_) => Type::Time,
            Event::Duration(_) => Type::Duration,
            Event::Error(_) => Type::Error,
            Event::BeginArray(_) => Type::Array,
            Event::BeginMap(_) => Type::Map,
            Event::EndArray | Event::EndMap => return None,
        })
    }
}

/// Records every value event; separators are not recorded.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl RecordingSink {
    fn push(&mut self, event: Event) -> Result<(), Error> {
        self.events.push(event);
        Ok(())
    }
}

impl Sink for RecordingSink {
    fn write_nil(&mut self) -> Result<(), Error> {
        self.push(Event::Nil)
    }
    fn write_bool(&mut self, v: bool) -> Result<(), Error> {
        self.push(Event::Bool(v))
    }
    fn write_int(&mut self, v: i64) -> Result<(), Error> {
        self.push(Event::Int(v))
    }
    fn write_uint(&mut self, v: u64) -> Result<(), Error> {
        self.push(Event::Uint(v))
    }
    fn write_float(&mut self, v: f64) -> Result<(), Error> {
        self.push(Event::Float(v))
    }
    fn write_string(&mut self, v: &str) -> Result<(), Error> {
        self.push(Event::String(v.to_owned()))
    }
    fn write_bytes(&mut self, v: &[u8]) -> Result<(), Error> {
        self.push(Event::Bytes(v.to_vec()))
    }
    fn write_time(&mut self, v: SystemTime) -> Result<(), Error> {
        self.push(Event::Time(v))
    }
    fn write_duration(&mut self, v: Duration) -> Result<(), Error> {
        self.push(Event::Duration(v))
    }
    fn write_error(&mut self, message: &str) -> Result<(), Error> {
        self.push(Event::Error(message.to_owned()))
    }
    fn begin_array(&mut self, len: Option<usize>) -> Result<(), Error> {
        self.push(Event::BeginArray(len))
    }
    fn end_array(&mut self) -> Result<(), Error> {
        self.push(Event::EndArray)
    }
    fn begin_map(&mut self, len: Option<usize>) -> Result<(), Error> {
        self.push(Event::BeginMap(len))
    }
    fn end_map(&mut self) -> Result<(), Error> {
        self.push(Event::EndMap)
    }
}

/// Feed `events` to `sink` in order, with array and map separators.
///
/// Lets format tests write exact event sequences, including unsized containers.
pub fn play(events: &[Event], sink: &mut dyn Sink) -> Result<(), Error> {
    struct Frame {
        index: usize,
        map: bool,
        value_next: bool,
    }

    let mut open: Vec<Frame> = Vec::new();
    for event in events {
        if !matches!(event, Event::EndArray | Event::EndMap)
            && let Some(f) = open.last_mut()
        {
            if !f.map {
                sink.array_next(f.index)?;
                f.index += 1;
            } else if f.value_next {
                sink.map_value()?;
                f.index += 1;
                f.value_next = false;
            } else {
                sink.map_next(f.index)?;
                f.value_next = true;
            }
        }
        match event {
            Event::Nil => sink.write_nil()?,
            Event::Bool(v) => sink.write_bool(*v)?,
            Event::Int(v) => sink.write_int(*v)?,
            Event::Uint(v) => sink.write_uint(*v)?,
            Event::Float(v) => sink.write_float(*v)?,
            Event::String(v) => sink.write_string(v)?,
            Event::Bytes(v) => sink.write_bytes(v)?,
            Event::Time(v) => sink.write_time(*v)?,
            Event::Duration(v) => sink.write_duration(*v)?,
            Event::Error(v) => sink.write_error(v)?,
            Event::BeginArray(len) | Event::BeginMap(len) => {
                let map = matches!(event, Event::BeginMap(_));
                if map {
                    sink.begin_map(*len)?;
                } else {
                    sink.begin_array(*len)?;
                }
                open.push(Frame {
                    index: 0,
                    map,
                    value_next: false,
                });
            }
            Event::EndArray => {
                sink.end_array()?;
                open.pop();
            }
            Event::EndMap => {
                sink.end_map()?;
                open.pop();
            }
        }
    }
    Ok(())
}

/// Replays a recorded event list.
///
/// ```
/// use oc_conv::testing::{Event, ReplaySource};
///
/// let mut source = ReplaySource::new(vec![
///     Event::BeginArray(None),
///     Event::Int(-1),
///     Event::Uint(2),
///     Event::EndArray,
/// ]);
/// let mut out = Vec::<i16>::new();
/// oc_conv::decode(&mut source, &mut out).unwrap();
/// assert_eq!(out, [-1, 2]);
/// assert!(source.is_finished());
/// ```
#[derive(Debug)]
pub struct ReplaySource {
    events: Vec<Event>,
    pos: usize,
}

impl ReplaySource {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events, pos: 0 }
    }

    /// Every event has been consumed.
    pub fn is_finished(&self) -> bool {
        self.pos == self.events.len()
    }

    fn current(&self) -> Result<&Event, Error> {
        self.events
            .get(self.pos)
            .ok_or_else(|| Error::malformed("unexpected end of events"))
    }

    fn take(&mut self) -> Result<&Event, Error> {
        let pos = self.pos;
        self.pos += 1;
        self.events
            .get(pos)
            .ok_or_else(|| Error::malformed("unexpected end of events"))
    }

    fn unexpected(event: &Event, wanted: &str) -> Error {
        Error::malformed(format!("expected {wanted}, found {event:?}"))
    }

    // An unsized container continues until its end marker.
    fn more(&self, end: &Event) -> Result<bool, Error> {
        Ok(self.current()? != end)
    }
}

impl Source for ReplaySource {
    fn peek(&mut self) -> Result<Type, Error> {
        let event = self.current()?;
        event
            .kind()
            .ok_or_else(|| Self::unexpected(event, "a value"))
    }

    fn read_nil(&mut self) -> Result<(), Error> {
        match self.take()? {
            Event::Nil => Ok(()),
            e => Err(Self::unexpected(e, "nil")),
        }
    }

    fn read_bool(&mut self) -> Result<bool, Error> {
        match self.take()? {
            Event::Bool(v) => Ok(*v),
            e => Err(Self::unexpected(e, "bool")),
        }
    }

    fn read_int(&mut self) -> Result<i64, Error> {
        match self.take()? {
            Event::Int(v) => Ok(*v),
            e => Err(Self::unexpected(e, "int")),
        }
    }

    fn read_uint(&mut self) -> Result<u64, Error> {
        match self.take()? {
            Event::Uint(v) => Ok(*v),
            e => Err(Self::unexpected(e, "uint")),
        }
    }

    fn read_float(&mut self) -> Result<f64, Error> {
        match self.take()? {
            Event::Float(v) => Ok(*v),
            e => Err(Self::unexpected(e, "float")),
        }
    }

    fn read_string(&mut self) -> Result<&str, Error> {
        match self.take()? {
            Event::String(v) => Ok(v.as_str()),
            e => Err(Self::unexpected(e, "string")),
        }
    }

    fn read_bytes(&mut self) -> Result<&[u8], Error> {
        match self.take()? {
            Event::Bytes(v) => Ok(v.as_slice()),
            e => Err(Self::unexpected(e, "bytes")),
        }
    }

    fn read_time(&mut self) -> Result<SystemTime, Error> {
        match self.take()? {
            Event::Time(v) => Ok(*v),
            e => Err(Self::unexpected(e, "time")),
        }
    }

    fn read_duration(&mut self) -> Result<Duration, Error> {
        match self.take()? {
            Event::Duration(v) => Ok(*v),
            e => Err(Self::unexpected(e, "duration")),
        }
    }

    fn read_error(&mut self) -> Result<&str, Error> {
        match self.take()? {
            Event::Error(v) => Ok(v.as_str()),
            e => Err(Self::unexpected(e, "error")),
        }
    }

    fn begin_array(&mut self) -> Result<Option<usize>, Error> {
        match self.take()? {
            Event::BeginArray(len) => Ok(*len),
            e => Err(Self::unexpected(e, "array")),
        }
    }

    fn next_element(&mut self, _index: usize) -> Result<bool, Error> {
        self.more(&Event::EndArray)
    }

    fn end_array(&mut self) -> Result<(), Error> {
        match self.take()? {
            Event::EndArray => Ok(()),
            e => Err(Self::unexpected(e, "end of array")),
        }
    }

    fn begin_map(&mut self) -> Result<Option<usize>, Error> {
        match self.take()? {
            Event::BeginMap(len) => Ok(*len),
            e => Err(Self::unexpected(e, "map")),
        }
    }

    fn next_entry(&mut self, _index: usize) -> Result<bool, Error> {
        self.more(&Event::EndMap)
    }

    fn end_map(&mut self) -> Result<(), Error> {
        match self.take()? {
            Event::EndMap => Ok(()),
            e => Err(Self::unexpected(e, "end of map")),
        }
    }
}
