use core::time::Duration;
use std::time::SystemTime;

use crate::{Error, Type};

/// Produces the canonical events of one value, on demand.
///
/// The decoder always calls [`peek`](Source::peek) first and then exactly one
/// matching `read_*` or `begin_*`. Borrowed reads return views into the source's
/// own buffer and stay valid until the next call.
///
/// Containers:
///
/// - `begin_array()` returns the element count when the encoding carries one.
///   The decoder then calls `next_element(i)` before each element; with a known
///   count it stops after `len` elements, otherwise it continues until
///   `next_element` returns `false`. `end_array()` closes the array.
/// - maps work the same way with `next_entry(i)`, and `map_value()` is called
///   between each key and its value.
pub trait Source {
    /// Kind of the next value, without consuming it.
    fn peek(&mut self) -> Result<Type, Error>;

    fn read_nil(&mut self) -> Result<(), Error>;
    fn read_bool(&mut self) -> Result<bool, Error>;
    fn read_int(&mut self) -> Result<i64, Error>;
    fn read_uint(&mut self) -> Result<u64, Error>;
    fn read_float(&mut self) -> Result<f64, Error>;
    fn read_string(&mut self) -> Result<&str, Error>;
    fn read_bytes(&mut self) -> Result<&[u8], Error>;
    fn read_time(&mut self) -> Result<SystemTime, Error>;
    fn read_duration(&mut self) -> Result<Duration, Error>;
    fn read_error(&mut self) -> Result<&str, Error>;

    fn begin_array(&mut self) -> Result<Option<usize>, Error>;
    fn next_element(&mut self, index: usize) -> Result<bool, Error>;
    fn end_array(&mut self) -> Result<(), Error>;

    fn begin_map(&mut self) -> Result<Option<usize>, Error>;
    fn next_entry(&mut self, index: usize) -> Result<bool, Error>;
    fn end_map(&mut self) -> Result<(), Error>;

    /// Called between a key and its value.
    #[inline]
    fn map_value(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Consume one complete value of any kind.
    ///
    /// Open containers are tracked on the heap, so nesting depth does not grow
    /// the call stack. [`Decoder::skip`](crate::Decoder::skip) additionally
    /// enforces the depth limit.
    fn skip(&mut self) -> Result<(), Error> {
        struct Frame {
            len: Option<usize>,
            index: usize,
            map: bool,
            value_next: bool,
        }

        let mut open: Vec<Frame> = Vec::new();
        loop {
            match self.peek()? {
                Type::Array => {
                    let len = self.begin_array()?;
                    open.push(Frame {
                        len,
                        index: 0,
                        map: false,
                        value_next: false,
                    });
                }
                Type::Map => {
                    let len = self.begin_map()?;
                    open.push(Frame {
                        len,
                        index: 0,
                        map: true,
                        value_next: false,
                    });
                }
                kind => skip_scalar(self, kind)?,
            }

            // Move to the next value, closing every container that is done.
            loop {
                let Some(frame) = open.last_mut() else {
                    return Ok(());
                };
                if frame.value_next {
                    self.map_value()?;
                    frame.value_next = false;
                    frame.index += 1;
                    break;
                }
                let more = if frame.map {
                    has_next(frame.len, frame.index, |i| self.next_entry(i))?
                } else {
                    has_next(frame.len, frame.index, |i| self.next_element(i))?
                };
                if more {
                    if frame.map {
                        frame.value_next = true;
                    } else {
                        frame.index += 1;
                    }
                    break;
                }
                let map = frame.map;
                open.pop();
                if map {
                    self.end_map()?;
                } else {
                    self.end_array()?;
                }
            }
        }
    }
}

fn skip_scalar<S: Source + ?Sized>(source: &mut S, kind: Type) -> Result<(), Error> {
    match kind {
        Type::Nil => source.read_nil(),
        Type::Bool => source.read_bool().map(drop),
        Type::Int => source.read_int().map(drop),
        Type::Uint => source.read_uint().map(drop),
        Type::Float => source.read_float().map(drop),
        Type::String => source.read_string().map(drop),
        Type::Bytes => source.read_bytes().map(drop),
        Type::Time => source.read_time().map(drop),
        Type::Duration => source.read_duration().map(drop),
        Type::Error => source.read_error().map(drop),
        Type::Array | Type::Map => source.skip(),
    }
}

/// Shared loop condition of array and map decoding.
///
/// With a known `len` the loop stops at `len`, and an early `false` from the
/// source is a framing error.
#[inline]
pub(crate) fn has_next(
    len: Option<usize>,
    index: usize,
    next: impl FnOnce(usize) -> Result<bool, Error>,
) -> Result<bool, Error> {
    match len {
        Some(len) if index >= len => Ok(false),
        Some(len) => {
            if next(index)? {
                Ok(true)
            } else {
                Err(Error::malformed(format!(
                    "container ended after {index} of {len} items"
                )))
            }
        }
        None => next(index),
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn peek(&mut self) -> Result<Type, Error> {
        (**self).peek()
    }
    fn read_nil(&mut self) -> Result<(), Error> {
        (**self).read_nil()
    }
    fn read_bool(&mut self) -> Result<bool, Error> {
        (**self).read_bool()
    }
    fn read_int(&mut self) -> Result<i64, Error> {
        (**self).read_int()
    }
    fn read_uint(&mut self) -> Result<u64, Error> {
        (**self).read_uint()
    }
    fn read_float(&mut self) -> Result<f64, Error> {
        (**self).read_float()
    }
    fn read_string(&mut self) -> Result<&str, Error> {
        (**self).read_string()
    }
    fn read_bytes(&mut self) -> Result<&[u8], Error> {
        (**self).read_bytes()
    }
    fn read_time(&mut self) -> Result<SystemTime, Error> {
        (**self).read_time()
    }
    fn read_duration(&mut self) -> Result<Duration, Error> {
        (**self).read_duration()
    }
    fn read_error(&mut self) -> Result<&str, Error> {
        (**self).read_error()
    }
    fn begin_array(&mut self) -> Result<Option<usize>, Error> {
        (**self).begin_array()
    }
    fn next_element(&mut self, index: usize) -> Result<bool, Error> {
        (**self).next_element(index)
    }
    fn end_array(&mut self) -> Result<(), Error> {
        (**self).end_array()
    }
    fn begin_map(&mut self) -> Result<Option<usize>, Error> {
        (**self).begin_map()
    }
    fn next_entry(&mut self, index: usize) -> Result<bool, Error> {
        (**self).next_entry(index)
    }
    fn end_map(&mut self) -> Result<(), Error> {
        (**self).end_map()
    }
    fn map_value(&mut self) -> Result<(), Error> {
        (**self).map_value()
    }
    fn skip(&mut self) -> Result<(), Error> {
        (**self).skip()
    }
}

#[cfg(test)]
mod tests {
    use crate::Source;
    use crate::testing::{Event, ReplaySource};

    #[test]
    fn skip_consumes_exactly_one_value() {
        let mut source = ReplaySource::new(vec![
            Event::BeginMap(None),
            Event::String("k".into()),
            Event::BeginArray(Some(2)),
            Event::Nil,
            Event::BeginMap(Some(0)),
            Event::EndMap,
            Event::EndArray,
            Event::String("empty".into()),
            Event::BeginArray(Some(0)),
            Event::EndArray,
            Event::EndMap,
            Event::Bool(true),
        ]);
        source.skip().unwrap();
        assert!(source.read_bool().unwrap());
        assert!(source.is_finished());
    }

    #[test]
    fn skip_does_not_recurse_per_level() {
        const LEVELS: usize = 200_000;
        let mut events = vec![Event::BeginArray(Some(1)); LEVELS];
        events.push(Event::Uint(0));
        events.extend(core::iter::repeat_n(Event::EndArray, LEVELS));
        let mut source = ReplaySource::new(events);
        source.skip().unwrap();
        assert!(source.is_finished());
    }
}
