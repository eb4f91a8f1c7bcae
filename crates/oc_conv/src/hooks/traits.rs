use crate::{BoxError, Decoder, Encoder, Error};

/// Full control over how a value is encoded.
///
/// ```
/// use oc_conv::{Encoder, Error, derive::Reflect, hooks::ValueEncoder};
/// use oc_conv::testing::{Event, RecordingSink};
///
/// #[derive(Reflect, Clone, Default)]
/// #[conv(opaque, encoder)]
/// struct Rgb(u8, u8, u8);
///
/// impl ValueEncoder for Rgb {
///     fn encode_value(&self, enc: &mut Encoder<'_>) -> Result<(), Error> {
///         let packed = u32::from_be_bytes([0, self.0, self.1, self.2]);
///         enc.sink().write_uint(u64::from(packed))
///     }
/// }
///
/// let mut sink = RecordingSink::default();
/// oc_conv::encode(&mut sink, &Rgb(1, 2, 3)).unwrap();
/// assert_eq!(sink.events, [Event::Uint(0x01_02_03)]);
/// ```
pub trait ValueEncoder {
    fn encode_value(&self, enc: &mut Encoder<'_>) -> Result<(), Error>;
}

/// Full control over how a value is decoded.
///
/// Implementations read exactly one complete value from the decoder's source.
pub trait ValueDecoder {
    fn decode_value(&mut self, dec: &mut Decoder<'_>) -> Result<(), Error>;
}

/// Conversion to text; the value is emitted as a `String`.
pub trait TextMarshal {
    fn marshal_text(&self) -> Result<String, BoxError>;
}

/// Conversion from text.
pub trait TextUnmarshal {
    fn unmarshal_text(&mut self, text: &str) -> Result<(), BoxError>;
}
