use bitflags::bitflags;

use crate::cache::TypeCache;
use crate::hooks::table::{DecodeFn, EncodeFn, MarshalFn, MessageFn, UnmarshalFn};
use crate::info::TypeInfo;

bitflags! {
    /// Hook capabilities of a type.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HookFlags: u8 {
        const ENCODER        = 1 << 0;
        const DECODER        = 1 << 1;
        const TEXT_MARSHAL   = 1 << 2;
        const TEXT_UNMARSHAL = 1 << 3;
        const ERROR          = 1 << 4;
    }
}

/// How values of a type are encoded.
#[derive(Clone, Copy, Debug)]
pub enum EncodeRoute {
    Custom(EncodeFn),
    Text(MarshalFn),
    Error(MessageFn),
    Structural,
}

/// How values of a type are decoded.
#[derive(Clone, Copy, Debug)]
pub enum DecodeRoute {
    Custom(DecodeFn),
    /// Text when the input is a string, structural otherwise.
    Text(UnmarshalFn),
    Structural,
}

/// Resolved hooks of one type.
#[derive(Clone, Copy, Debug)]
pub struct Hooks {
    pub flags: HookFlags,
    pub encode: EncodeRoute,
    pub decode: DecodeRoute,
}

impl Hooks {
    fn resolve(info: &TypeInfo) -> Self {
        let table = info.hooks();

        let mut flags = HookFlags::empty();
        flags.set(HookFlags::ENCODER, table.encode.is_some());
        flags.set(HookFlags::DECODER, table.decode.is_some());
        flags.set(HookFlags::TEXT_MARSHAL, table.marshal_text.is_some());
        flags.set(HookFlags::TEXT_UNMARSHAL, table.unmarshal_text.is_some());
        flags.set(HookFlags::ERROR, table.error_message.is_some());

        let encode = match (table.encode, table.marshal_text, table.error_message) {
            (Some(f), _, _) => EncodeRoute::Custom(f),
            (None, Some(f), _) => EncodeRoute::Text(f),
            (None, None, Some(f)) => EncodeRoute::Error(f),
            (None, None, None) => EncodeRoute::Structural,
        };
        let decode = match (table.decode, table.unmarshal_text) {
            (Some(f), _) => DecodeRoute::Custom(f),
            (None, Some(f)) => DecodeRoute::Text(f),
            (None, None) => DecodeRoute::Structural,
        };

        log::trace!("resolved hooks of `{}`: {flags:?}", info.type_path());
        Self {
            flags,
            encode,
            decode,
        }
    }
}

static HOOKS: TypeCache<Hooks> = TypeCache::new();

/// The cached hook resolution of `info`.
///
/// ```
/// use oc_conv::{Typed, hooks::{EncodeRoute, hooks_of}, impls::ErrorValue};
///
/// assert!(matches!(hooks_of(u32::type_info()).encode, EncodeRoute::Structural));
/// assert!(matches!(hooks_of(ErrorValue::type_info()).encode, EncodeRoute::Error(_)));
/// ```
pub fn hooks_of(info: &TypeInfo) -> &'static Hooks {
    HOOKS.get_or_build(info.type_id(), || Hooks::resolve(info))
}

#[cfg(test)]
mod tests {
    use super::{DecodeRoute, EncodeRoute, HookFlags, hooks_of};
    use crate::hooks::{TextMarshal, TextUnmarshal, ValueEncoder};
    use crate::{BoxError, Encoder, Error, Typed};
    use crate::derive::Reflect;

    #[derive(Reflect, Clone, Default, Debug)]
    #[conv(opaque, encoder, text, error)]
    struct Everything;

    impl ValueEncoder for Everything {
        fn encode_value(&self, enc: &mut Encoder<'_>) -> Result<(), Error> {
            enc.sink().write_nil()
        }
    }
    impl TextMarshal for Everything {
        fn marshal_text(&self) -> Result<String, BoxError> {
            Ok(String::new())
        }
    }
    impl TextUnmarshal for Everything {
        fn unmarshal_text(&mut self, _: &str) -> Result<(), BoxError> {
            Ok(())
        }
    }
    impl core::fmt::Display for Everything {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("everything")
        }
    }
    impl core::error::Error for Everything {}

    #[test]
    fn priority_order() {
        let hooks = hooks_of(Everything::type_info());
        assert_eq!(
            hooks.flags,
            HookFlags::ENCODER | HookFlags::TEXT_MARSHAL | HookFlags::TEXT_UNMARSHAL | HookFlags::ERROR
        );
        assert!(matches!(hooks.encode, EncodeRoute::Custom(_)));
        assert!(matches!(hooks.decode, DecodeRoute::Text(_)));
        assert!(core::ptr::eq(hooks, hooks_of(Everything::type_info())));
    }
}
