use core::time::Duration;
use std::time::SystemTime;

use crate::Error;

/// Receives the canonical events of one value.
///
/// Scalars arrive as exactly one `write_*` call. Containers are bracketed:
///
/// - array: `begin_array(len)`, then `array_next(i)` and one value per element,
///   then `end_array()`;
/// - map: `begin_map(len)`, then per entry `map_next(i)`, the key, `map_value()`,
///   the value, then `end_map()`.
///
/// `len` is `Some` whenever the encoder knows the count up front, which is always
/// the case for the built-in dispatchers. Custom encoders may pass `None`.
///
/// The separator hooks default to no-ops; text formats use them for punctuation.
pub trait Sink {
    fn write_nil(&mut self) -> Result<(), Error>;
    fn write_bool(&mut self, v: bool) -> Result<(), Error>;
    fn write_int(&mut self, v: i64) -> Result<(), Error>;
    fn write_uint(&mut self, v: u64) -> Result<(), Error>;
    fn write_float(&mut self, v: f64) -> Result<(), Error>;
    fn write_string(&mut self, v: &str) -> Result<(), Error>;
    fn write_bytes(&mut self, v: &[u8]) -> Result<(), Error>;
    fn write_time(&mut self, v: SystemTime) -> Result<(), Error>;
    fn write_duration(&mut self, v: Duration) -> Result<(), Error>;
    fn write_error(&mut self, message: &str) -> Result<(), Error>;

    fn begin_array(&mut self, len: Option<usize>) -> Result<(), Error>;
    fn end_array(&mut self) -> Result<(), Error>;
    fn begin_map(&mut self, len: Option<usize>) -> Result<(), Error>;
    fn end_map(&mut self) -> Result<(), Error>;

    /// Called before element `index` of an array.
    #[inline]
    fn array_next(&mut self, index: usize) -> Result<(), Error> {
        let _ = index;
        Ok(())
    }

    /// Called before the key of entry `index` of a map.
    #[inline]
    fn map_next(&mut self, index: usize) -> Result<(), Error> {
        let _ = index;
        Ok(())
    }

    /// Called between a key and its value.
    #[inline]
    fn map_value(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Flush buffered output, if any.
    #[inline]
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write_nil(&mut self) -> Result<(), Error> {
        (**self).write_nil()
    }
    fn write_bool(&mut self, v: bool) -> Result<(), Error> {
        (**self).write_bool(v)
    }
    fn write_int(&mut self, v: i64) -> Result<(), Error> {
        (**self).write_int(v)
    }
    fn write_uint(&mut self, v: u64) -> Result<(), Error> {
        (**self).write_uint(v)
    }
    fn write_float(&mut self, v: f64) -> Result<(), Error> {
        (**self).write_float(v)
    }
    fn write_string(&mut self, v: &str) -> Result<(), Error> {
        (**self).write_string(v)
    }
    fn write_bytes(&mut self, v: &[u8]) -> Result<(), Error> {
        (**self).write_bytes(v)
    }
    fn write_time(&mut self, v: SystemTime) -> Result<(), Error> {
        (**self).write_time(v)
    }
    fn write_duration(&mut self, v: Duration) -> Result<(), Error> {
        (**self).write_duration(v)
    }
    fn write_error(&mut self, message: &str) -> Result<(), Error> {
        (**self).write_error(message)
    }
    fn begin_array(&mut self, len: Option<usize>) -> Result<(), Error> {
        (**self).begin_array(len)
    }
    fn end_array(&mut self) -> Result<(), Error> {
        (**self).end_array()
    }
    fn begin_map(&mut self, len: Option<usize>) -> Result<(), Error> {
        (**self).begin_map(len)
    }
    fn end_map(&mut self) -> Result<(), Error> {
        (**self).end_map()
    }
    fn array_next(&mut self, index: usize) -> Result<(), Error> {
        (**self).array_next(index)
    }
    fn map_next(&mut self, index: usize) -> Result<(), Error> {
        (**self).map_next(index)
    }
    fn map_value(&mut self) -> Result<(), Error> {
        (**self).map_value()
    }
    fn flush(&mut self) -> Result<(), Error> {
        (**self).flush()
    }
}
