use core::fmt;

use crate::cache::zero_of;
use crate::hooks::{TextMarshal, TextUnmarshal, ValueDecoder, ValueEncoder};
use crate::{BoxError, Decoder, Encoder, Error, Reflect, Typed};

pub(crate) type EncodeFn = fn(&dyn Reflect, &mut Encoder<'_>) -> Result<(), Error>;
pub(crate) type DecodeFn = fn(&mut dyn Reflect, &mut Decoder<'_>) -> Result<(), Error>;
pub(crate) type MarshalFn = fn(&dyn Reflect) -> Result<String, BoxError>;
pub(crate) type UnmarshalFn = fn(&mut dyn Reflect, &str) -> Result<(), BoxError>;
pub(crate) type MessageFn = fn(&dyn Reflect) -> String;
pub(crate) type ZeroEqFn = fn(&dyn Reflect) -> bool;

/// Type-erased hook entry points of one type.
///
/// Each entry is a monomorphized thunk that downcasts the value and forwards to
/// the trait implementation, similar to a vtable built on demand.
///
/// ```
/// use oc_conv::hooks::{HookTable, TextMarshal, TextUnmarshal};
/// use oc_conv::BoxError;
/// # use oc_conv::derive::Reflect;
///
/// # #[derive(Reflect, Clone, Default)]
/// # #[conv(opaque)]
/// struct Level(u8);
///
/// impl TextMarshal for Level {
///     fn marshal_text(&self) -> Result<String, BoxError> {
///         Ok(format!("L{}", self.0))
///     }
/// }
/// impl TextUnmarshal for Level {
///     fn unmarshal_text(&mut self, text: &str) -> Result<(), BoxError> {
///         self.0 = text.trim_start_matches('L').parse()?;
///         Ok(())
///     }
/// }
///
/// const HOOKS: HookTable = HookTable::EMPTY.with_text::<Level>();
/// assert!(HOOKS.has_text_marshal() && HOOKS.has_text_unmarshal());
/// ```
#[derive(Clone, Copy)]
pub struct HookTable {
    pub(crate) encode: Option<EncodeFn>,
    pub(crate) decode: Option<DecodeFn>,
    pub(crate) marshal_text: Option<MarshalFn>,
    pub(crate) unmarshal_text: Option<UnmarshalFn>,
    pub(crate) error_message: Option<MessageFn>,
    pub(crate) zero_eq: Option<ZeroEqFn>,
}

impl HookTable {
    pub const EMPTY: Self = Self {
        encode: None,
        decode: None,
        marshal_text: None,
        unmarshal_text: None,
        error_message: None,
        zero_eq: None,
    };

    pub const fn with_encoder<T: ValueEncoder + Reflect>(mut self) -> Self {
        self.encode = Some(encode_thunk::<T>);
        self
    }

    pub const fn with_decoder<T: ValueDecoder + Reflect>(mut self) -> Self {
        self.decode = Some(decode_thunk::<T>);
        self
    }

    /// Both text directions.
    pub const fn with_text<T: TextMarshal + TextUnmarshal + Reflect>(self) -> Self {
        self.with_text_marshal::<T>().with_text_unmarshal::<T>()
    }

    pub const fn with_text_marshal<T: TextMarshal + Reflect>(mut self) -> Self {
        self.marshal_text = Some(marshal_thunk::<T>);
        self
    }

    pub const fn with_text_unmarshal<T: TextUnmarshal + Reflect>(mut self) -> Self {
        self.unmarshal_text = Some(unmarshal_thunk::<T>);
        self
    }

    /// Encode as an `Error` carrying the `Display` message.
    pub const fn with_error<T: core::error::Error + Reflect>(mut self) -> Self {
        self.error_message = Some(message_thunk::<T>);
        self
    }

    /// Compare against the zero value with `PartialEq`, for opaque types.
    pub const fn with_zero_eq<T: Typed + PartialEq>(mut self) -> Self {
        self.zero_eq = Some(zero_eq_thunk::<T>);
        self
    }

    #[inline]
    pub const fn has_encoder(&self) -> bool {
        self.encode.is_some()
    }

    #[inline]
    pub const fn has_decoder(&self) -> bool {
        self.decode.is_some()
    }

    #[inline]
    pub const fn has_text_marshal(&self) -> bool {
        self.marshal_text.is_some()
    }

    #[inline]
    pub const fn has_text_unmarshal(&self) -> bool {
        self.unmarshal_text.is_some()
    }

    #[inline]
    pub const fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// Zero comparison of an opaque value, `None` if the type declares none.
    #[inline]
    pub fn zero_eq(&self, value: &dyn Reflect) -> Option<bool> {
        self.zero_eq.map(|f| f(value))
    }
}

impl Default for HookTable {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookTable")
            .field("encoder", &self.has_encoder())
            .field("decoder", &self.has_decoder())
            .field("text_marshal", &self.has_text_marshal())
            .field("text_unmarshal", &self.has_text_unmarshal())
            .field("error", &self.has_error())
            .field("zero_eq", &self.zero_eq.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Thunks

#[cold]
fn foreign(value: &dyn Reflect) -> Error {
    Error::unsupported(value.reflect_type_info().type_path())
}

fn encode_thunk<T: ValueEncoder + Reflect>(
    value: &dyn Reflect,
    enc: &mut Encoder<'_>,
) -> Result<(), Error> {
    match value.downcast_ref::<T>() {
        Some(v) => v.encode_value(enc),
        None => Err(foreign(value)),
    }
}

fn decode_thunk<T: ValueDecoder + Reflect>(
    value: &mut dyn Reflect,
    dec: &mut Decoder<'_>,
) -> Result<(), Error> {
    match value.downcast_mut::<T>() {
        Some(v) => v.decode_value(dec),
        None => Err(foreign(value)),
    }
}

fn marshal_thunk<T: TextMarshal + Reflect>(value: &dyn Reflect) -> Result<String, BoxError> {
    match value.downcast_ref::<T>() {
        Some(v) => v.marshal_text(),
        None => Err(foreign(value).into()),
    }
}

fn unmarshal_thunk<T: TextUnmarshal + Reflect>(
    value: &mut dyn Reflect,
    text: &str,
) -> Result<(), BoxError> {
    match value.downcast_mut::<T>() {
        Some(v) => v.unmarshal_text(text),
        None => Err(foreign(value).into()),
    }
}

fn message_thunk<T: core::error::Error + Reflect>(value: &dyn Reflect) -> String {
    match value.downcast_ref::<T>() {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

fn zero_eq_thunk<T: Typed + PartialEq>(value: &dyn Reflect) -> bool {
    value.downcast_ref::<T>().is_some_and(|v| v == zero_of::<T>())
}
