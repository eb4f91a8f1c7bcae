//! Name-to-codec lookup.
//!
//! A [`Codec`] is a pair of constructors turning a byte stream into a [`Sink`]
//! or a [`Source`]. Codecs are registered under one or more names; lookup is
//! ASCII case-insensitive.
//!
//! ## auto_register
//!
//! With the `auto_register` feature (default), formats submit a
//! [`CodecRegistration`] through the [`inventory`] crate and the registry
//! collects them on first use. Not every platform supports static
//! registration; without the feature, or on such platforms, call
//! [`register_builtin`] once at startup.
//!
//! [`inventory`]: https://docs.rs/inventory

use std::io::{BufRead, Write};
use std::sync::{Once, PoisonError, RwLock};

use oc_conv::{Reflect, Sink, Source};
use oc_utils::hash::{FixedHashState, HashMap};

use crate::CodecError;

// -----------------------------------------------------------------------------
// Codec

/// Constructors of one wire format.
#[derive(Clone, Copy)]
pub struct Codec {
    pub new_sink: for<'w> fn(&'w mut dyn Write) -> Box<dyn Sink + 'w>,
    pub new_source: for<'r> fn(&'r mut dyn BufRead) -> Box<dyn Source + 'r>,
}

impl core::fmt::Debug for Codec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Codec").finish_non_exhaustive()
    }
}

/// A codec and the names it answers to, submitted for static registration.
#[derive(Debug)]
pub struct CodecRegistration {
    pub names: &'static [&'static str],
    pub codec: Codec,
}

#[cfg(feature = "auto_register")]
inventory::collect!(CodecRegistration);

// -----------------------------------------------------------------------------
// Registry

static CODECS: RwLock<HashMap<String, Codec>> = RwLock::new(HashMap::with_hasher(FixedHashState));

fn insert(name: &str, codec: Codec) {
    log::debug!("registering codec `{name}`");
    CODECS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.to_ascii_lowercase(), codec);
}

// Built-ins go in before anything else so explicit registrations override them.
fn ensure_builtin() {
    static COLLECTED: Once = Once::new();
    COLLECTED.call_once(|| {
        #[cfg(feature = "auto_register")]
        for entry in inventory::iter::<CodecRegistration> {
            for name in entry.names {
                insert(name, entry.codec);
            }
        }
    });
}

/// Register `codec` under `name`, replacing any previous codec of that name.
pub fn register(name: &str, codec: Codec) {
    ensure_builtin();
    insert(name, codec);
}

/// Register the codecs shipped with this crate under all their names.
///
/// Repeated calls re-register the same entries.
pub fn register_builtin() {
    for entry in [&crate::cbor::REGISTRATION, &crate::resp::REGISTRATION] {
        for name in entry.names {
            register(name, entry.codec);
        }
    }
}

/// Find the codec registered under `name`.
///
/// ```
/// use oc_codec::{CodecError, lookup};
///
/// # oc_codec::registry::register_builtin();
/// assert!(lookup("Text/RESP").is_ok());
/// assert!(matches!(lookup("yaml"), Err(CodecError::CodecNotFound(_))));
/// ```
pub fn lookup(name: &str) -> Result<Codec, CodecError> {
    ensure_builtin();
    let codecs = CODECS.read().unwrap_or_else(PoisonError::into_inner);
    let found = codecs.get(name.to_ascii_lowercase().as_str()).copied();
    found.ok_or_else(|| {
        log::debug!("no codec registered under `{name}`");
        CodecError::CodecNotFound(name.to_owned())
    })
}

// -----------------------------------------------------------------------------
// One-shot helpers

/// Encode `value` with the codec registered under `name`.
pub fn marshal(name: &str, value: &dyn Reflect) -> Result<Vec<u8>, CodecError> {
    let codec = lookup(name)?;
    let mut out = Vec::new();
    {
        let mut sink = (codec.new_sink)(&mut out);
        oc_conv::encode(&mut *sink, value)?;
        sink.flush()?;
    }
    Ok(out)
}

/// Decode one value from `bytes` into `target` with the codec registered under `name`.
///
/// Bytes after the first complete value are ignored.
pub fn unmarshal(name: &str, bytes: &[u8], target: &mut dyn Reflect) -> Result<(), CodecError> {
    let codec = lookup(name)?;
    let mut reader = bytes;
    let mut source = (codec.new_source)(&mut reader);
    oc_conv::decode(&mut *source, target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{lookup, marshal, register, register_builtin, unmarshal};
    use crate::CodecError;

    #[test]
    fn names_are_case_insensitive() {
        register_builtin();
        for name in ["cbor", "CBOR", "Application/Cbor", "resp", "TEXT/resp", "application/RESP"] {
            assert!(lookup(name).is_ok(), "{name}");
        }
        let err = lookup("msgpack").unwrap_err();
        assert!(matches!(err, CodecError::CodecNotFound(ref n) if n == "msgpack"));
        assert_eq!(err.to_string(), "no codec registered under `msgpack`");
    }

    #[test]
    fn aliases_share_a_format() {
        register_builtin();
        let a = marshal("cbor", &vec![1_u16, 2]).unwrap();
        let b = marshal("application/cbor", &vec![1_u16, 2]).unwrap();
        assert_eq!(a, b);
        assert_eq!(marshal("resp", &-4_i64).unwrap(), b":-4\r\n");
    }

    #[test]
    fn user_codecs_can_alias_builtins() {
        register_builtin();
        let resp = lookup("resp").unwrap();
        register("x-redis", resp);
        let bytes = marshal("X-Redis", &String::from("ok")).unwrap();
        assert_eq!(bytes, b"+ok\r\n");

        let mut back = String::new();
        unmarshal("x-redis", &bytes, &mut back).unwrap();
        assert_eq!(back, "ok");
    }
}
