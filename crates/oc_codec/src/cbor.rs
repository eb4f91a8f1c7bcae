//! A binary format following RFC 8949.
//!
//! | kind     | encoding                                        |
//! |----------|-------------------------------------------------|
//! | nil      | simple `null` (`undefined` is read as nil too)  |
//! | bool     | simple `false` / `true`                         |
//! | int      | major 0 or 1                                    |
//! | uint     | major 0                                         |
//! | float    | float64 (half and single are read as well)      |
//! | string   | major 3                                         |
//! | bytes    | major 2                                         |
//! | time     | tag 0 + RFC 3339 text (tag 1 epoch is read too) |
//! | duration | tag 1002 + uint nanoseconds                     |
//! | error    | tag 27001 + text                                |
//! | array    | major 4, definite or indefinite                 |
//! | map      | major 5, definite or indefinite                 |
//!
//! Unknown tags are skipped on read.

use core::time::Duration;
use std::io::{BufRead, Read, Write};
use std::time::SystemTime;

use oc_conv::text::{format_time, parse_time};
use oc_conv::{Error, Sink, Source, Type};

use crate::registry::{Codec, CodecRegistration};

// -----------------------------------------------------------------------------
// Constants

const MAJOR_UINT: u8 = 0;
const MAJOR_NEG: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;

const INDEFINITE: u8 = 31;
const BREAK: u8 = 0xff;

const SIMPLE_FALSE: u8 = 20;
const SIMPLE_TRUE: u8 = 21;
const SIMPLE_NULL: u8 = 22;
const SIMPLE_UNDEFINED: u8 = 23;
const FLOAT16: u8 = 25;
const FLOAT32: u8 = 26;
const FLOAT64: u8 = 27;

const TAG_TIME_TEXT: u64 = 0;
const TAG_TIME_EPOCH: u64 = 1;
const TAG_DURATION: u64 = 1002;
const TAG_ERROR: u64 = 27001;

pub(crate) const REGISTRATION: CodecRegistration = CodecRegistration {
    names: &["application/cbor", "cbor"],
    codec: Codec {
        new_sink,
        new_source,
    },
};

#[cfg(feature = "auto_register")]
inventory::submit! { REGISTRATION }

fn new_sink<'w>(writer: &'w mut dyn Write) -> Box<dyn Sink + 'w> {
    Box::new(CborSink::new(writer))
}

fn new_source<'r>(reader: &'r mut dyn BufRead) -> Box<dyn Source + 'r> {
    Box::new(CborSource::new(reader))
}

// -----------------------------------------------------------------------------
// CborSink

/// Writes canonical events as CBOR.
///
/// ```
/// use oc_codec::cbor::CborSink;
///
/// let mut sink = CborSink::new(Vec::new());
/// oc_conv::encode(&mut sink, &vec![true, false]).unwrap();
/// assert_eq!(sink.into_inner(), [0x82, 0xf5, 0xf4]);
/// ```
#[derive(Debug)]
pub struct CborSink<W> {
    writer: W,
    // One entry per open container, `true` when it needs a break byte.
    frames: Vec<bool>,
}

impl<W: Write> CborSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            frames: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<(), Error> {
        Ok(self.writer.write_all(bytes)?)
    }

    // Initial byte plus the shortest argument encoding.
    fn head(&mut self, major: u8, arg: u64) -> Result<(), Error> {
        let m = major << 5;
        let mut buf = [0_u8; 9];
        let n = match arg {
            0..24 => {
                buf[0] = m | arg as u8;
                1
            }
            24..=0xff => {
                buf[0] = m | 24;
                buf[1] = arg as u8;
                2
            }
            0x100..=0xffff => {
                buf[0] = m | 25;
                buf[1..3].copy_from_slice(&(arg as u16).to_be_bytes());
                3
            }
            0x1_0000..=0xffff_ffff => {
                buf[0] = m | 26;
                buf[1..5].copy_from_slice(&(arg as u32).to_be_bytes());
                5
            }
            _ => {
                buf[0] = m | 27;
                buf[1..9].copy_from_slice(&arg.to_be_bytes());
                9
            }
        };
        self.put(&buf[..n])
    }

    fn text(&mut self, v: &str) -> Result<(), Error> {
        self.head(MAJOR_TEXT, v.len() as u64)?;
        self.put(v.as_bytes())
    }

    fn open(&mut self, major: u8, len: Option<usize>) -> Result<(), Error> {
        match len {
            Some(len) => self.head(major, len as u64)?,
            None => self.put(&[major << 5 | INDEFINITE])?,
        }
        self.frames.push(len.is_none());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.frames.pop() {
            Some(true) => self.put(&[BREAK]),
            Some(false) => Ok(()),
            None => Err(Error::malformed("container closed twice")),
        }
    }
}

impl<W: Write> Sink for CborSink<W> {
    fn write_nil(&mut self) -> Result<(), Error> {
        self.put(&[MAJOR_SIMPLE << 5 | SIMPLE_NULL])
    }

    fn write_bool(&mut self, v: bool) -> Result<(), Error> {
        let simple = if v { SIMPLE_TRUE } else { SIMPLE_FALSE };
        self.put(&[MAJOR_SIMPLE << 5 | simple])
    }

    fn write_int(&mut self, v: i64) -> Result<(), Error> {
        if v >= 0 {
            self.head(MAJOR_UINT, v as u64)
        } else {
            // -1 - v, without overflow at i64::MIN
            self.head(MAJOR_NEG, !v as u64)
        }
    }

    fn write_uint(&mut self, v: u64) -> Result<(), Error> {
        self.head(MAJOR_UINT, v)
    }

    fn write_float(&mut self, v: f64) -> Result<(), Error> {
        let mut buf = [MAJOR_SIMPLE << 5 | FLOAT64; 9];
        buf[1..].copy_from_slice(&v.to_bits().to_be_bytes());
        self.put(&buf)
    }

    fn write_string(&mut self, v: &str) -> Result<(), Error> {
        self.text(v)
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<(), Error> {
        self.head(MAJOR_BYTES, v.len() as u64)?;
        self.put(v)
    }

    fn write_time(&mut self, v: SystemTime) -> Result<(), Error> {
        self.head(MAJOR_TAG, TAG_TIME_TEXT)?;
        self.text(&format_time(v))
    }

    fn write_duration(&mut self, v: Duration) -> Result<(), Error> {
        let nanos = v.as_nanos();
        let nanos = u64::try_from(nanos).map_err(|_| Error::overflow(nanos, "u64"))?;
        self.head(MAJOR_TAG, TAG_DURATION)?;
        self.head(MAJOR_UINT, nanos)
    }

    fn write_error(&mut self, message: &str) -> Result<(), Error> {
        self.head(MAJOR_TAG, TAG_ERROR)?;
        self.text(message)
    }

    fn begin_array(&mut self, len: Option<usize>) -> Result<(), Error> {
        self.open(MAJOR_ARRAY, len)
    }

    fn end_array(&mut self) -> Result<(), Error> {
        self.close()
    }

    fn begin_map(&mut self, len: Option<usize>) -> Result<(), Error> {
        self.open(MAJOR_MAP, len)
    }

    fn end_map(&mut self) -> Result<(), Error> {
        self.close()
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(self.writer.flush()?)
    }
}

// -----------------------------------------------------------------------------
// CborSource

#[derive(Debug, Clone, Copy)]
struct Head {
    major: u8,
    info: u8,
    arg: u64,
}

impl Head {
    #[inline]
    fn is_indefinite(self) -> bool {
        self.info == INDEFINITE
    }
}

// A decoded item head and the recognized tag in front of it.
#[derive(Debug, Clone, Copy)]
struct Item {
    tag: Option<u64>,
    head: Head,
}

impl Item {
    fn kind(self) -> Result<Type, Error> {
        match self.tag {
            Some(TAG_TIME_TEXT | TAG_TIME_EPOCH) => return Ok(Type::Time),
            Some(TAG_DURATION) => return Ok(Type::Duration),
            Some(TAG_ERROR) => return Ok(Type::Error),
            _ => {}
        }
        Ok(match self.head.major {
            MAJOR_UINT => Type::Uint,
            MAJOR_NEG => Type::Int,
            MAJOR_BYTES => Type::Bytes,
            MAJOR_TEXT => Type::String,
            MAJOR_ARRAY => Type::Array,
            MAJOR_MAP => Type::Map,
            _ => match self.head.info {
                SIMPLE_FALSE | SIMPLE_TRUE => Type::Bool,
                SIMPLE_NULL | SIMPLE_UNDEFINED => Type::Nil,
                FLOAT16 | FLOAT32 | FLOAT64 => Type::Float,
                INDEFINITE => return Err(Error::malformed("unexpected break")),
                info => return Err(Error::malformed(format!("unsupported simple value {info}"))),
            },
        })
    }

    fn unexpected(self, wanted: &str) -> Error {
        Error::malformed(format!(
            "expected {wanted}, found major type {} (tag {:?})",
            self.head.major, self.tag
        ))
    }
}

/// Reads canonical events from CBOR.
///
/// Text and byte payloads are read into one reusable buffer, which the borrowed
/// reads return.
///
/// ```
/// use oc_codec::cbor::CborSource;
///
/// // [_ 1, -2] as an indefinite array
/// let mut source = CborSource::new(&[0x9f, 0x01, 0x21, 0xff][..]);
/// let mut out = Vec::<i32>::new();
/// oc_conv::decode(&mut source, &mut out).unwrap();
/// assert_eq!(out, [1, -2]);
/// ```
#[derive(Debug)]
pub struct CborSource<R> {
    reader: R,
    peeked: Option<Item>,
    buf: Vec<u8>,
    // One entry per open container, `true` when it ends with a break byte.
    frames: Vec<bool>,
}

impl<R: BufRead> CborSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            peeked: None,
            buf: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn byte(&mut self) -> Result<u8, Error> {
        let mut b = [0_u8; 1];
        self.reader.read_exact(&mut b)?;
        Ok(b[0])
    }

    fn head(&mut self) -> Result<Head, Error> {
        let initial = self.byte()?;
        let (major, info) = (initial >> 5, initial & 0x1f);
        let arg = match info {
            0..24 => u64::from(info),
            24..=27 => {
                let width = 1_usize << (info - 24);
                let mut be = [0_u8; 8];
                self.reader.read_exact(&mut be[8 - width..])?;
                u64::from_be_bytes(be)
            }
            INDEFINITE if matches!(major, MAJOR_BYTES..=MAJOR_MAP | MAJOR_SIMPLE) => 0,
            _ => return Err(Error::malformed(format!("reserved additional info {info}"))),
        };
        Ok(Head { major, info, arg })
    }

    fn item(&mut self) -> Result<Item, Error> {
        if let Some(item) = self.peeked {
            return Ok(item);
        }
        let mut tag = None;
        let mut head = self.head()?;
        while head.major == MAJOR_TAG {
            match head.arg {
                TAG_TIME_TEXT | TAG_TIME_EPOCH | TAG_DURATION | TAG_ERROR => tag = Some(head.arg),
                other => log::trace!("skipping cbor tag {other}"),
            }
            head = self.head()?;
        }
        let item = Item { tag, head };
        self.peeked = Some(item);
        Ok(item)
    }

    fn take(&mut self) -> Result<Item, Error> {
        let item = self.item()?;
        self.peeked = None;
        Ok(item)
    }

    // Payload of a byte or text string into `buf`, joining indefinite chunks.
    fn payload(&mut self, head: Head) -> Result<(), Error> {
        self.buf.clear();
        if !head.is_indefinite() {
            return self.chunk(head.arg);
        }
        loop {
            let chunk = self.head()?;
            if chunk.major == MAJOR_SIMPLE && chunk.is_indefinite() {
                return Ok(());
            }
            if chunk.major != head.major || chunk.is_indefinite() {
                return Err(Error::malformed("invalid chunk in indefinite string"));
            }
            self.chunk(chunk.arg)?;
        }
    }

    fn chunk(&mut self, len: u64) -> Result<(), Error> {
        let read = self.reader.by_ref().take(len).read_to_end(&mut self.buf)?;
        if read as u64 == len {
            Ok(())
        } else {
            Err(Error::malformed(format!("string truncated after {read} of {len} bytes")))
        }
    }

    fn text(&mut self, head: Head) -> Result<&str, Error> {
        self.payload(head)?;
        core::str::from_utf8(&self.buf).map_err(Error::malformed)
    }

    fn open(&mut self, major: u8, wanted: &str) -> Result<Option<usize>, Error> {
        let item = self.take()?;
        if item.head.major != major || item.tag.is_some() {
            return Err(item.unexpected(wanted));
        }
        let len = if item.head.is_indefinite() {
            None
        } else {
            let n = item.head.arg;
            Some(usize::try_from(n).map_err(|_| Error::overflow(n, "usize"))?)
        };
        self.frames.push(len.is_none());
        Ok(len)
    }

    fn more(&mut self) -> Result<bool, Error> {
        if self.frames.last() != Some(&true) {
            return Ok(true);
        }
        match self.reader.fill_buf()?.first() {
            Some(&b) => Ok(b != BREAK),
            None => Err(Error::malformed("unterminated indefinite container")),
        }
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.frames.pop() {
            Some(true) => match self.byte()? {
                BREAK => Ok(()),
                b => Err(Error::malformed(format!("expected break, found {b:#04x}"))),
            },
            Some(false) => Ok(()),
            None => Err(Error::malformed("container closed twice")),
        }
    }
}

// RFC 8949 Appendix D.
fn half_to_f64(bits: u16) -> f64 {
    let exp = i32::from((bits >> 10) & 0x1f);
    let mant = f64::from(bits & 0x3ff);
    let value = match exp {
        0 => mant * 2_f64.powi(-24),
        31 if mant == 0.0 => f64::INFINITY,
        31 => f64::NAN,
        _ => (mant + 1024.0) * 2_f64.powi(exp - 25),
    };
    if bits & 0x8000 == 0 { value } else { -value }
}

fn epoch_time(secs: f64) -> Result<SystemTime, Error> {
    let offset = Duration::try_from_secs_f64(secs.abs()).map_err(Error::malformed)?;
    let time = if secs < 0.0 {
        SystemTime::UNIX_EPOCH.checked_sub(offset)
    } else {
        SystemTime::UNIX_EPOCH.checked_add(offset)
    };
    time.ok_or_else(|| Error::overflow(secs, "SystemTime"))
}

impl<R: BufRead> Source for CborSource<R> {
    fn peek(&mut self) -> Result<Type, Error> {
        self.item()?.kind()
    }

    fn read_nil(&mut self) -> Result<(), Error> {
        let item = self.take()?;
        match (item.head.major, item.head.info) {
            (MAJOR_SIMPLE, SIMPLE_NULL | SIMPLE_UNDEFINED) => Ok(()),
            _ => Err(item.unexpected("null")),
        }
    }

    fn read_bool(&mut self) -> Result<bool, Error> {
        let item = self.take()?;
        match (item.head.major, item.head.info) {
            (MAJOR_SIMPLE, SIMPLE_FALSE) => Ok(false),
            (MAJOR_SIMPLE, SIMPLE_TRUE) => Ok(true),
            _ => Err(item.unexpected("bool")),
        }
    }

    fn read_int(&mut self) -> Result<i64, Error> {
        let item = self.take()?;
        let n = item.head.arg;
        match item.head.major {
            MAJOR_UINT => i64::try_from(n).map_err(|_| Error::overflow(n, "i64")),
            MAJOR_NEG => match i64::try_from(n) {
                Ok(n) => Ok(-1 - n),
                Err(_) => Err(Error::overflow(-1 - i128::from(n), "i64")),
            },
            _ => Err(item.unexpected("integer")),
        }
    }

    fn read_uint(&mut self) -> Result<u64, Error> {
        let item = self.take()?;
        match item.head.major {
            MAJOR_UINT => Ok(item.head.arg),
            _ => Err(item.unexpected("unsigned integer")),
        }
    }

    fn read_float(&mut self) -> Result<f64, Error> {
        let item = self.take()?;
        let bits = item.head.arg;
        match (item.head.major, item.head.info) {
            (MAJOR_SIMPLE, FLOAT16) => Ok(half_to_f64(bits as u16)),
            (MAJOR_SIMPLE, FLOAT32) => Ok(f64::from(f32::from_bits(bits as u32))),
            (MAJOR_SIMPLE, FLOAT64) => Ok(f64::from_bits(bits)),
            _ => Err(item.unexpected("float")),
        }
    }

    fn read_string(&mut self) -> Result<&str, Error> {
        let item = self.take()?;
        if item.head.major != MAJOR_TEXT {
            return Err(item.unexpected("text"));
        }
        self.text(item.head)
    }

    fn read_bytes(&mut self) -> Result<&[u8], Error> {
        let item = self.take()?;
        if item.head.major != MAJOR_BYTES {
            return Err(item.unexpected("bytes"));
        }
        self.payload(item.head)?;
        Ok(self.buf.as_slice())
    }

    fn read_time(&mut self) -> Result<SystemTime, Error> {
        let item = self.take()?;
        let head = item.head;
        match (item.tag, head.major) {
            (Some(TAG_TIME_TEXT), MAJOR_TEXT) => {
                let text = self.text(head)?;
                parse_time(text).map_err(Error::malformed)
            }
            (Some(TAG_TIME_EPOCH), MAJOR_UINT) => SystemTime::UNIX_EPOCH
                .checked_add(Duration::from_secs(head.arg))
                .ok_or_else(|| Error::overflow(head.arg, "SystemTime")),
            (Some(TAG_TIME_EPOCH), MAJOR_NEG) => Duration::from_secs(head.arg)
                .checked_add(Duration::from_secs(1))
                .and_then(|d| SystemTime::UNIX_EPOCH.checked_sub(d))
                .ok_or_else(|| Error::overflow(-1 - i128::from(head.arg), "SystemTime")),
            (Some(TAG_TIME_EPOCH), MAJOR_SIMPLE) => {
                self.peeked = Some(Item { tag: None, head });
                let secs = self.read_float()?;
                epoch_time(secs)
            }
            _ => Err(item.unexpected("time")),
        }
    }

    fn read_duration(&mut self) -> Result<Duration, Error> {
        let item = self.take()?;
        match (item.tag, item.head.major) {
            (Some(TAG_DURATION), MAJOR_UINT) => Ok(Duration::from_nanos(item.head.arg)),
            _ => Err(item.unexpected("duration")),
        }
    }

    fn read_error(&mut self) -> Result<&str, Error> {
        let item = self.take()?;
        match (item.tag, item.head.major) {
            (Some(TAG_ERROR), MAJOR_TEXT) => self.text(item.head),
            _ => Err(item.unexpected("error")),
        }
    }

    fn begin_array(&mut self) -> Result<Option<usize>, Error> {
        self.open(MAJOR_ARRAY, "array")
    }

    fn next_element(&mut self, _index: usize) -> Result<bool, Error> {
        self.more()
    }

    fn end_array(&mut self) -> Result<(), Error> {
        self.close()
    }

    fn begin_map(&mut self) -> Result<Option<usize>, Error> {
        self.open(MAJOR_MAP, "map")
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
    use oc_conv::{Error, ErrorKind, Source, Type};

    use super::{CborSink, CborSource, half_to_f64};

    fn bytes(events: Vec<Event>) -> Vec<u8> {
        let mut sink = CborSink::new(Vec::new());
        play(&events, &mut sink).unwrap();
        sink.into_inner()
    }

    #[test]
    fn heads_use_the_shortest_argument() {
        let enc = |v: u64| {
            let mut sink = CborSink::new(Vec::new());
            oc_conv::encode(&mut sink, &v).unwrap();
            sink.into_inner()
        };
        assert_eq!(enc(23), [0x17]);
        assert_eq!(enc(24), [0x18, 24]);
        assert_eq!(enc(256), [0x19, 1, 0]);
        assert_eq!(enc(65_536), [0x1a, 0, 1, 0, 0]);
        assert_eq!(enc(u64::MAX), [0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);

        let mut sink = CborSink::new(Vec::new());
        oc_conv::encode(&mut sink, &i64::MIN).unwrap();
        assert_eq!(sink.into_inner(), [0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn unsized_containers_are_indefinite() {
        let out = bytes(vec![
            Event::BeginMap(None),
            Event::String("a".into()),
            Event::BeginArray(None),
            Event::EndArray,
            Event::EndMap,
        ]);
        assert_eq!(out, [0xbf, 0x61, b'a', 0x9f, 0xff, 0xff]);

        let mut source = CborSource::new(out.as_slice());
        let mut back = std::collections::BTreeMap::<String, Vec<u8>>::new();
        oc_conv::decode(&mut source, &mut back).unwrap();
        assert_eq!(back["a"], Vec::<u8>::new());
    }

    #[test]
    fn tagged_kinds() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
        let out = bytes(vec![Event::Time(t)]);
        assert_eq!(&out[..2], [0xc0, 0x74]);
        assert_eq!(&out[2..], b"1970-01-02T00:00:00Z");

        let out = bytes(vec![Event::Duration(Duration::from_nanos(5))]);
        assert_eq!(out, [0xd9, 0x03, 0xea, 0x05]);

        let out = bytes(vec![Event::Error("no".into())]);
        assert_eq!(out, [0xd9, 0x69, 0x79, 0x62, b'n', b'o']);
        let mut source = CborSource::new(out.as_slice());
        assert_eq!(source.peek().unwrap(), Type::Error);
        assert_eq!(source.read_error().unwrap(), "no");
    }

    #[test]
    fn foreign_encodings_are_read() {
        // epoch tag, half and single floats, undefined, unknown tag, chunked text
        let input = [
            0x86, // array(6)
            0xc1, 0x1a, 0x00, 0x01, 0x51, 0x80, // 1(86400)
            0xf9, 0x3e, 0x00, // 1.5 as half
            0xfa, 0xbf, 0x80, 0x00, 0x00, // -1.0 as single
            0xf7, // undefined
            0xd8, 0x20, 0x63, b'u', b'r', b'i', // 32("uri")
            0x7f, 0x62, b'a', b'b', 0x61, b'c', 0xff, // (_ "ab", "c")
        ];
        let mut source = CborSource::new(&input[..]);
        assert_eq!(source.begin_array().unwrap(), Some(6));
        assert_eq!(source.peek().unwrap(), Type::Time);
        assert_eq!(
            source.read_time().unwrap(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(86_400)
        );
        assert_eq!(source.read_float().unwrap(), 1.5);
        assert_eq!(source.read_float().unwrap(), -1.0);
        assert_eq!(source.peek().unwrap(), Type::Nil);
        source.read_nil().unwrap();
        assert_eq!(source.peek().unwrap(), Type::String);
        assert_eq!(source.read_string().unwrap(), "uri");
        assert_eq!(source.read_string().unwrap(), "abc");
        source.end_array().unwrap();
    }

    #[test]
    fn half_floats() {
        assert_eq!(half_to_f64(0x0000), 0.0);
        assert!(half_to_f64(0x8000).is_sign_negative());
        assert_eq!(half_to_f64(0x3c00), 1.0);
        assert_eq!(half_to_f64(0x7bff), 65_504.0);
        assert_eq!(half_to_f64(0x0001), 5.960_464_477_539_063e-8);
        assert_eq!(half_to_f64(0x7c00), f64::INFINITY);
        assert_eq!(half_to_f64(0xfc00), f64::NEG_INFINITY);
        assert!(half_to_f64(0x7e00).is_nan());
    }

    #[test]
    fn framing_errors() {
        let truncated = [0x63, b'a'];
        let err = CborSource::new(&truncated[..]).read_string().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));

        let mut source = CborSource::new(&[0xff][..]);
        assert!(matches!(source.peek().unwrap_err().kind(), ErrorKind::Malformed(_)));

        let eof: Error = CborSource::new(&[][..]).peek().unwrap_err();
        assert!(matches!(eof.kind(), ErrorKind::Io(_)));

        // -2^64 does not fit in i64
        let big = [0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let err = CborSource::new(&big[..]).read_int().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Overflow { target: "i64", .. }));
    }

    #[derive(oc_conv::derive::Reflect, Clone, Debug, PartialEq)]
    struct Small {
        a: u8,
    }

    #[test]
    fn hostile_headers() {
        // array(2^60) with nothing behind it
        let huge = [0x9b, 0x10, 0, 0, 0, 0, 0, 0, 0];
        let err = oc_conv::decode(&mut CborSource::new(&huge[..]), &mut Vec::<u64>::new()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
        assert_eq!(err.path_string(), "[0]");
        let err = oc_conv::decode(&mut CborSource::new(&huge[..]), &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));

        // bytes(2^64 - 1)
        let blob = [0x5b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, b'a'];
        let err = CborSource::new(&blob[..]).read_bytes().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed(_)));

        // {"x": [[[...0...]]]} into a record without `x`
        let mut input = vec![0xa1, 0x61, b'x'];
        input.extend(std::iter::repeat_n(0x81, 100_000));
        input.push(0x00);
        let mut small = Small { a: 1 };
        let err = oc_conv::decode(&mut CborSource::new(input.as_slice()), &mut small).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::DepthLimit(oc_conv::DEFAULT_MAX_DEPTH)));
        assert_eq!(small.a, 1);
    }
}
