//! The RESP3 text protocol.
//!
//! Every value starts with a one-byte marker and ends its header line with CRLF.
//! Blob types carry a length and a CRLF-terminated payload.
//!
//! | kind     | encoding                                              |
//! |----------|-------------------------------------------------------|
//! | nil      | `_`                                                   |
//! | bool     | `#t` / `#f`                                           |
//! | int      | `:`                                                   |
//! | uint     | `:`, or `(` big number above `i64::MAX`               |
//! | float    | `,` with `inf`, `-inf` and `nan`                      |
//! | string   | `+`, or verbatim `=` `txt:` when it holds CR or LF    |
//! | bytes    | `$`                                                   |
//! | error    | `-`, or blob error `!` when it holds CR or LF         |
//! | array    | `*`, streamed `*?` ... `.` when the length is unknown |
//! | map      | `%`, streamed `%?` ... `.`                            |
//!
//! RESP3 has no time or duration type: times are written as RFC 3339 strings
//! and durations as `1h2m3s` strings, both of which decode back into their
//! typed targets.

use core::time::Duration;
use std::io::{BufRead, Read, Write};
use std::time::SystemTime;

use oc_conv::text::{format_duration, format_time};
use oc_conv::{Error, Sink, Source, Type};

use crate::registry::{Codec, CodecRegistration};

pub(crate) const REGISTRATION: CodecRegistration = CodecRegistration {
    names: &["application/resp", "text/resp", "resp"],
    codec: Codec {
        new_sink,
        new_source,
    },
};

#[cfg(feature = "auto_register")]
inventory::submit! { REGISTRATION }

fn new_sink<'w>(writer: &'w mut dyn Write) -> Box<dyn Sink + 'w> {
    Box::new(RespSink::new(writer))
}

fn new_source<'r>(reader: &'r mut dyn BufRead) -> Box<dyn Source + 'r> {
    Box::new(RespSource::new(reader))
}

#[inline]
fn has_newline(bytes: &[u8]) -> bool {
    bytes.iter().any(|&b| b == b'\r' || b == b'\n')
}

// -----------------------------------------------------------------------------
// RespSink

/// Writes canonical events as RESP3.
///
/// ```
/// use oc_codec::resp::RespSink;
///
/// let mut sink = RespSink::new(Vec::new());
/// oc_conv::encode(&mut sink, &vec![String::from("a"), String::from("b\r\n")]).unwrap();
/// assert_eq!(sink.into_inner(), b"*2\r\n+a\r\n=7\r\ntxt:b\r\n\r\n");
/// ```
#[derive(Debug)]
pub struct RespSink<W> {
    writer: W,
    // One entry per open aggregate, `true` when streamed.
    frames: Vec<bool>,
}

impl<W: Write> RespSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frames: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, marker: u8, body: impl core::fmt::Display) -> Result<(), Error> {
        Ok(write!(self.writer, "{}{body}\r\n", marker as char)?)
    }

    fn blob(&mut self, marker: u8, prefix: &[u8], body: &[u8]) -> Result<(), Error> {
        self.line(marker, prefix.len() + body.len())?;
        self.writer.write_all(prefix)?;
        self.writer.write_all(body)?;
        Ok(self.writer.write_all(b"\r\n")?)
    }

    fn open(&mut self, marker: u8, len: Option<usize>) -> Result<(), Error> {
        match len {
            Some(len) => self.line(marker, len)?,
            None => self.line(marker, '?')?,
        }
        self.frames.push(len.is_none());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.frames.pop() {
            Some(true) => Ok(self.writer.write_all(b".\r\n")?),
            Some(false) => Ok(()),
            None => Err(Error::malformed("aggregate closed twice")),
        }
    }
}

impl<W: Write> Sink for RespSink<W> {
    fn write_nil(&mut self) -> Result<(), Error> {
        Ok(self.writer.write_all(b"_\r\n")?)
    }

    fn write_bool(&mut self, v: bool) -> Result<(), Error> {
        self.line(b'#', if v { 't' } else { 'f' })
    }

    fn write_int(&mut self, v: i64) -> Result<(), Error> {
        self.line(b':', v)
    }

    fn write_uint(&mut self, v: u64) -> Result<(), Error> {
        if i64::try_from(v).is_ok() {
            self.line(b':', v)
        } else {
            self.line(b'(', v)
        }
    }

    fn write_float(&mut self, v: f64) -> Result<(), Error> {
        if v.is_nan() {
            self.line(b',', "nan")
        } else if v.is_infinite() {
            self.line(b',', if v > 0.0 { "inf" } else { "-inf" })
        } else {
            // Debug keeps `-0.0` and switches to exponents for large magnitudes.
            self.line(b',', format_args!("{v:?}"))
        }
    }

    fn write_string(&mut self, v: &str) -> Result<(), Error> {
        if has_newline(v.as_bytes()) {
            self.blob(b'=', b"txt:", v.as_bytes())
        } else {
            self.line(b'+', v)
        }
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<(), Error> {
        self.blob(b'$', b"", v)
    }

    fn write_time(&mut self, v: SystemTime) -> Result<(), Error> {
        self.line(b'+', format_time(v))
    }

    fn write_duration(&mut self, v: Duration) -> Result<(), Error> {
        self.line(b'+', format_duration(v))
    }

    fn write_error(&mut self, message: &str) -> Result<(), Error> {
        if has_newline(message.as_bytes()) {
            self.blob(b'!', b"", message.as_bytes())
        } else {
            self.line(b'-', message)
        }
    }

    fn begin_array(&mut self, len: Option<usize>) -> Result<(), Error> {
        self.open(b'*', len)
    }

    fn end_array(&mut self) -> Result<(), Error> {
        self.close()
    }

    fn begin_map(&mut self, len: Option<usize>) -> Result<(), Error> {
        self.open(b'%', len)
    }

    fn end_map(&mut self) -> Result<(), Error> {
        self.close()
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(self.writer.flush()?)
    }
}

// -----------------------------------------------------------------------------
// RespSource

/// Reads canonical events from RESP3.
///
/// The current header line and blob payloads live in reusable buffers; simple
/// strings are returned straight out of the header line.
///
/// Sets (`~`) and pushes (`>`) read as arrays; the RESP2 nulls `$-1` and `*-1`
/// read as nil.
///
/// ```
/// use std::collections::BTreeMap;
/// use oc_codec::resp::RespSource;
///
/// let input = b"%?\r\n+a\r\n:1\r\n+b\r\n:2\r\n.\r\n";
/// let mut source = RespSource::new(&input[..]);
/// let mut out = BTreeMap::<String, u8>::new();
/// oc_conv::decode(&mut source, &mut out).unwrap();
/// assert_eq!(out, BTreeMap::from([("a".into(), 1), ("b".into(), 2)]));
/// ```
#[derive(Debug)]
pub struct RespSource<R> {
    reader: R,
    // Header line without its CRLF, marker byte first.
    line: Vec<u8>,
    // `line` holds a header that has been peeked but not consumed.
    peeked: bool,
    buf: Vec<u8>,
    // One entry per open aggregate, `true` when streamed.
    frames: Vec<bool>,
}

impl<R: BufRead> RespSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            peeked: false,
            buf: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    // Marker of the next header, reading it if needed.
    fn marker(&mut self) -> Result<u8, Error> {
        if !self.peeked {
            self.line.clear();
            self.reader.read_until(b'\n', &mut self.line)?;
            if !self.line.ends_with(b"\r\n") {
                return Err(Error::malformed("header line is not terminated by CRLF"));
            }
            self.line.truncate(self.line.len() - 2);
            if self.line.is_empty() {
                return Err(Error::malformed("empty header line"));
            }
            self.peeked = true;
        }
        Ok(self.line[0])
    }

    fn take(&mut self) -> Result<u8, Error> {
        let marker = self.marker()?;
        self.peeked = false;
        Ok(marker)
    }

    // Header text after the marker.
    fn header(&self) -> Result<&str, Error> {
        core::str::from_utf8(&self.line[1..]).map_err(Error::malformed)
    }

    fn is_null(&self) -> bool {
        &self.line[1..] == b"-1"
    }

    fn unexpected(&self, wanted: &str) -> Error {
        Error::malformed(format!(
            "expected {wanted}, found `{}`",
            String::from_utf8_lossy(&self.line)
        ))
    }

    fn number<T: core::str::FromStr>(&self, target: &'static str) -> Result<T, Error> {
        let text = self.header()?;
        text.parse().map_err(|_| {
            if !text.is_empty() && text.trim_start_matches('-').bytes().all(|b| b.is_ascii_digit()) {
                Error::overflow(text, target)
            } else {
                Error::malformed(format!("invalid number `{text}`"))
            }
        })
    }

    // Payload of the blob whose header was just taken, into `buf`.
    fn blob(&mut self) -> Result<(), Error> {
        let len: u64 = self.number("u64")?;
        self.buf.clear();
        let want = len
            .checked_add(2)
            .ok_or_else(|| Error::malformed(format!("blob length {len} is out of range")))?;
        let read = self.reader.by_ref().take(want).read_to_end(&mut self.buf)?;
        if read as u64 != want || !self.buf.ends_with(b"\r\n") {
            return Err(Error::malformed(format!("blob of {len} bytes is truncated")));
        }
        self.buf.truncate(self.buf.len() - 2);
        Ok(())
    }

    fn blob_str(&mut self) -> Result<&str, Error> {
        self.blob()?;
        core::str::from_utf8(&self.buf).map_err(Error::malformed)
    }

    fn open(&mut self, markers: &[u8], wanted: &str) -> Result<Option<usize>, Error> {
        let marker = self.take()?;
        if !markers.contains(&marker) {
            return Err(self.unexpected(wanted));
        }
        let len = if &self.line[1..] == b"?" {
            None
        } else {
            Some(self.number("usize")?)
        };
        self.frames.push(len.is_none());
        Ok(len)
    }

    fn more(&mut self) -> Result<bool, Error> {
        if self.frames.last() != Some(&true) {
            return Ok(true);
        }
        Ok(self.marker()? != b'.')
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.frames.pop() {
            Some(true) => match self.take()? {
                b'.' => Ok(()),
                _ => Err(self.unexpected("end of stream `.`")),
            },
            Some(false) => Ok(()),
            None => Err(Error::malformed("aggregate closed twice")),
        }
    }
}

impl<R: BufRead> Source for RespSource<R> {
    fn peek(&mut self) -> Result<Type, Error> {
        Ok(match self.marker()? {
            b'_' => Type::Nil,
            b'$' | b'*' if self.is_null() => Type::Nil,
            b'#' => Type::Bool,
            b':' => Type::Int,
            b'(' if self.line.get(1) == Some(&b'-') => Type::Int,
            b'(' => Type::Uint,
            b',' => Type::Float,
            b'+' | b'=' => Type::String,
            b'$' => Type::Bytes,
            b'-' | b'!' => Type::Error,
            b'*' | b'~' | b'>' => Type::Array,
            b'%' => Type::Map,
            _ => return Err(self.unexpected("a value")),
        })
    }

    fn read_nil(&mut self) -> Result<(), Error> {
        match self.take()? {
            b'_' => Ok(()),
            b'$' | b'*' if self.is_null() => Ok(()),
            _ => Err(self.unexpected("null")),
        }
    }

    fn read_bool(&mut self) -> Result<bool, Error> {
        self.take()?;
        match &self.line[..] {
            b"#t" => Ok(true),
            b"#f" => Ok(false),
            _ => Err(self.unexpected("boolean")),
        }
    }

    fn read_int(&mut self) -> Result<i64, Error> {
        match self.take()? {
            b':' | b'(' => self.number("i64"),
            _ => Err(self.unexpected("integer")),
        }
    }

    fn read_uint(&mut self) -> Result<u64, Error> {
        match self.take()? {
            b':' | b'(' => self.number("u64"),
            _ => Err(self.unexpected("integer")),
        }
    }

    fn read_float(&mut self) -> Result<f64, Error> {
        if self.take()? != b',' {
            return Err(self.unexpected("double"));
        }
        match self.header()? {
            "inf" | "+inf" => Ok(f64::INFINITY),
            "-inf" => Ok(f64::NEG_INFINITY),
            "nan" | "-nan" => Ok(f64::NAN),
            text => text
                .parse()
                .map_err(|_| Error::malformed(format!("invalid double `{text}`"))),
        }
    }

    fn read_string(&mut self) -> Result<&str, Error> {
        match self.take()? {
            b'+' => self.header(),
            b'=' => {
                let text = self.blob_str()?;
                // Three-letter format, then a colon.
                match text.get(3..4) {
                    Some(":") => Ok(&text[4..]),
                    _ => Err(Error::malformed("verbatim string without a format prefix")),
                }
            }
            _ => Err(self.unexpected("string")),
        }
    }

    fn read_bytes(&mut self) -> Result<&[u8], Error> {
        if self.take()? != b'$' {
            return Err(self.unexpected("bulk string"));
        }
        self.blob()?;
        Ok(self.buf.as_slice())
    }

    fn read_time(&mut self) -> Result<SystemTime, Error> {
        Err(Error::malformed("resp has no time type"))
    }

    fn read_duration(&mut self) -> Result<Duration, Error> {
        Err(Error::malformed("resp has no duration type"))
    }

    fn read_error(&mut self) -> Result<&str, Error> {
        match self.take()? {
            b'-' => self.header(),
            b'!' => self.blob_str(),
            _ => Err(self.unexpected("error")),
        }
    }

    fn begin_array(&mut self) -> Result<Option<usize>, Error> {
        self.open(b"*~>", "array")
    }

    fn next_element(&mut self, _index: usize) -> Result<bool, Error> {
        self.more()
    }

    fn end_array(&mut self) -> Result<(), Error> {
        self.close()
    }

    fn begin_map(&mut self) -> Result<Option<usize>, Error> {
        self.open(b"%", "map")
    }

    fn next_entry(&mut self, _index: usize) -> Result<bool, Error> {
        self.more()
    }

    fn end_map(&mut self) -> Result<(), Error> {
        self.close()
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;
    use std::time::SystemTime;

    use oc_conv::testing::{Event, play};
    use oc_conv::{ErrorKind, Source, Type};

    use super::{RespSink, RespSource};

    fn text(events: &[Event]) -> String {
        let mut sink = RespSink::new(Vec::new());
        play(events, &mut sink).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn scalar_markers() {
        assert_eq!(text(&[Event::Nil]), "_\r\n");
        assert_eq!(text(&[Event::Bool(true)]), "#t\r\n");
        assert_eq!(text(&[Event::Int(-7)]), ":-7\r\n");
        assert_eq!(text(&[Event::Uint(7)]), ":7\r\n");
        assert_eq!(text(&[Event::Uint(u64::MAX)]), "(18446744073709551615\r\n");
        assert_eq!(text(&[Event::Float(1.5)]), ",1.5\r\n");
        assert_eq!(text(&[Event::Float(-0.0)]), ",-0.0\r\n");
        assert_eq!(text(&[Event::Float(f64::NEG_INFINITY)]), ",-inf\r\n");
        assert_eq!(text(&[Event::Float(f64::NAN)]), ",nan\r\n");
        assert_eq!(text(&[Event::Bytes(b"a\r\nb".to_vec())]), "$4\r\na\r\nb\r\n");
        assert_eq!(text(&[Event::Error("ERR x".into())]), "-ERR x\r\n");
        assert_eq!(text(&[Event::Error("a\nb".into())]), "!3\r\na\nb\r\n");
    }

    #[test]
    fn time_and_duration_travel_as_strings() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_millis(1_500);
        assert_eq!(text(&[Event::Time(t)]), "+1970-01-01T00:00:01.500Z\r\n");
        assert_eq!(text(&[Event::Duration(Duration::from_secs(90))]), "+1m30s\r\n");
    }

    #[test]
    fn streamed_aggregates() {
        let out = text(&[
            Event::BeginArray(None),
            Event::BeginMap(Some(1)),
            Event::String("k".into()),
            Event::Nil,
            Event::EndMap,
            Event::EndArray,
        ]);
        assert_eq!(out, "*?\r\n%1\r\n+k\r\n_\r\n.\r\n");

        let mut source = RespSource::new(out.as_bytes());
        assert_eq!(source.begin_array().unwrap(), None);
        assert!(source.next_element(0).unwrap());
        source.skip().unwrap();
        assert!(!source.next_element(1).unwrap());
        source.end_array().unwrap();
    }

    #[test]
    fn foreign_encodings_are_read() {
        let input = b"~2\r\n$-1\r\n=7\r\nmkd:a\nb\r\n";
        let mut source = RespSource::new(&input[..]);
        assert_eq!(source.peek().unwrap(), Type::Array);
        assert_eq!(source.begin_array().unwrap(), Some(2));
        assert_eq!(source.peek().unwrap(), Type::Nil);
        source.read_nil().unwrap();
        assert_eq!(source.read_string().unwrap(), "a\nb");
        source.end_array().unwrap();

        let mut source = RespSource::new(&b"(-5\r\n"[..]);
        assert_eq!(source.peek().unwrap(), Type::Int);
        assert_eq!(source.read_int().unwrap(), -5);
    }

    #[test]
    fn framing_errors() {
        let err = RespSource::new(&b"+ok\n"[..]).peek().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));

        let err = RespSource::new(&b"$5\r\nab\r\n"[..]).read_bytes().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));

        let err = RespSource::new(&b":12x\r\n"[..]).read_int().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));

        let err = RespSource::new(&b":99999999999999999999\r\n"[..]).read_int().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Overflow { target: "i64", .. }));

        let err = RespSource::new(&b":-1\r\n"[..]).read_uint().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Overflow { target: "u64", .. }));
    }

    #[derive(oc_conv::derive::Reflect, Clone, Debug, PartialEq)]
    struct Small {
        a: u8,
    }

    #[test]
    fn hostile_headers() {
        let huge = b"*1152921504606846976\r\n";
        let err = oc_conv::decode(&mut RespSource::new(&huge[..]), &mut Vec::<u64>::new()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));
        assert_eq!(err.path_string(), "[0]");

        let err = RespSource::new(&b"$18446744073709551615\r\nab\r\n"[..])
            .read_bytes()
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));

        let mut input = b"%1\r\n+x\r\n".to_vec();
        input.extend(b"*1\r\n".repeat(100_000));
        input.extend(b":0\r\n");
        let mut small = Small { a: 1 };
        let err = oc_conv::decode(&mut RespSource::new(input.as_slice()), &mut small).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DepthLimit(oc_conv::DEFAULT_MAX_DEPTH)));
        assert_eq!(small.a, 1);
    }
}
