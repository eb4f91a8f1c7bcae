use core::fmt::Debug;
use core::time::Duration;
use std::collections::{BTreeMap, HashMap};
use std::time::SystemTime;

use oc_codec::{CodecError, marshal, unmarshal};
use oc_conv::cache::zero_of;
use oc_conv::derive::Reflect;
use oc_conv::hooks::ValueEncoder;
use oc_conv::impls::ErrorValue;
use oc_conv::{Encoder, Error, ErrorKind, Typed};
use proptest::prelude::*;

const CODECS: [&str; 2] = ["cbor", "resp"];

fn setup() {
    oc_codec::registry::register_builtin();
}

fn decode_as<T: Typed>(codec: &str, bytes: &[u8]) -> Result<T, CodecError> {
    let mut out = zero_of::<T>().clone();
    unmarshal(codec, bytes, &mut out)?;
    Ok(out)
}

#[track_caller]
fn round_trip<T: Typed + PartialEq + Debug>(value: &T) {
    setup();
    for codec in CODECS {
        let bytes = marshal(codec, value).unwrap();
        let back: T = decode_as(codec, &bytes).unwrap();
        assert_eq!(&back, value, "{codec}");
    }
}

#[test]
fn nil_and_booleans() {
    round_trip(&());
    round_trip(&true);
    round_trip(&false);
    round_trip(&None::<i32>);
    round_trip(&Some(Some(3_u8)));
}

#[test]
fn integers_at_every_width() {
    round_trip(&[i8::MIN, i8::MAX]);
    round_trip(&[i16::MIN, i16::MAX]);
    round_trip(&[i32::MIN, i32::MAX]);
    round_trip(&[i64::MIN, i64::MAX]);
    round_trip(&[isize::MIN, isize::MAX]);
    round_trip(&[u8::MAX, u8::MIN]);
    round_trip(&[u16::MAX, u16::MIN]);
    round_trip(&[u32::MAX, u32::MIN]);
    round_trip(&[u64::MAX, u64::MIN]);
    round_trip(&[usize::MAX, usize::MIN]);
}

#[test]
fn special_floats() {
    setup();
    for codec in CODECS {
        for v in [0.0_f64, -0.0, 1.25, f64::MAX, f64::MIN_POSITIVE, f64::INFINITY, f64::NEG_INFINITY] {
            let back: f64 = decode_as(codec, &marshal(codec, &v).unwrap()).unwrap();
            assert_eq!(back.to_bits(), v.to_bits(), "{codec} {v}");
        }
        let back: f64 = decode_as(codec, &marshal(codec, &f64::NAN).unwrap()).unwrap();
        assert!(back.is_nan(), "{codec}");
        let back: f32 = decode_as(codec, &marshal(codec, &f32::NEG_INFINITY).unwrap()).unwrap();
        assert_eq!(back, f32::NEG_INFINITY, "{codec}");
    }
}

#[test]
fn text_and_bytes() {
    round_trip(&String::new());
    round_trip(&String::from("héllo"));
    round_trip(&String::from("two\r\nlines"));
    round_trip(&Vec::<u8>::new());
    round_trip(&vec![0_u8, 13, 10, 255]);
    round_trip(&[7_u8; 4]);
    round_trip(&ErrorValue::new("boom"));
    round_trip(&ErrorValue::new("multi\nline"));
}

#[test]
fn times_and_durations() {
    round_trip(&SystemTime::UNIX_EPOCH);
    round_trip(&(SystemTime::UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789)));
    round_trip(&Duration::ZERO);
    round_trip(&Duration::new(93_784, 5));
}

#[test]
fn arrays_of_each_length() {
    round_trip(&Vec::<i32>::new());
    round_trip(&vec![String::from("one")]);
    round_trip(&vec![1.5_f64, -2.0, 3.0]);
    round_trip(&vec![vec![true], vec![], vec![false, true]]);
}

#[test]
fn nested_maps() {
    let inner = BTreeMap::from([(String::from("x"), vec![1_u16, 2]), (String::from("y"), vec![])]);
    let outer = BTreeMap::from([(String::from("a"), inner.clone()), (String::from("b"), BTreeMap::new())]);
    round_trip(&outer);

    let hashed: HashMap<u32, BTreeMap<String, BTreeMap<String, bool>>> = HashMap::from([(
        7,
        BTreeMap::from([(String::from("k"), BTreeMap::from([(String::from("v"), true)]))]),
    )]);
    round_trip(&hashed);
}

// -----------------------------------------------------------------------------
// Records

#[derive(Reflect, Clone, Debug, PartialEq)]
struct Left {
    shared: u8,
    left: u8,
}

#[derive(Reflect, Clone, Debug, PartialEq)]
struct Right {
    shared: u8,
    right: u8,
}

#[derive(Reflect, Clone, Debug, PartialEq)]
struct Pair {
    #[conv(embed)]
    l: Left,
    #[conv(embed)]
    r: Right,
}

#[derive(Reflect, Clone, Debug, PartialEq)]
struct Named {
    name: String,
}

#[derive(Reflect, Clone, Debug, PartialEq)]
struct Account {
    #[conv(rename = "id")]
    account_id: u64,
    #[conv(embed)]
    named: Named,
    // Shallower than `named.name`, so it wins.
    name: String,
    #[conv(omit_empty)]
    tags: Vec<String>,
    #[conv(omit_empty)]
    note: Option<String>,
    created: SystemTime,
    ttl: Duration,
}

fn keys(codec: &str, bytes: &[u8]) -> Vec<String> {
    let map: BTreeMap<String, wire::Skip> = decode_as(codec, bytes).unwrap();
    map.into_keys().collect()
}

// Accepts and discards any value, to inspect record keys on the wire.
mod wire {
    use oc_conv::derive::Reflect;
    use oc_conv::hooks::ValueDecoder;
    use oc_conv::{Decoder, Error};

    #[derive(Reflect, Clone, Debug, Default, PartialEq)]
    #[conv(opaque, decoder)]
    pub struct Skip;

    impl ValueDecoder for Skip {
        fn decode_value(&mut self, dec: &mut Decoder<'_>) -> Result<(), Error> {
            dec.skip()
        }
    }
}

#[test]
fn omit_empty_fields_stay_off_the_wire() {
    setup();
    let mut account = Account {
        account_id: 9,
        named: Named { name: "inner".into() },
        name: "outer".into(),
        tags: vec![],
        note: None,
        created: SystemTime::UNIX_EPOCH + Duration::from_secs(60),
        ttl: Duration::from_secs(30),
    };
    for codec in CODECS {
        let bytes = marshal(codec, &account).unwrap();
        assert_eq!(keys(codec, &bytes), ["created", "id", "name", "ttl"], "{codec}");
        let back: Account = decode_as(codec, &bytes).unwrap();
        assert_eq!(back.named.name, "", "{codec}");
        assert_eq!(back.name, "outer");
        assert_eq!(back.tags, Vec::<String>::new());
    }

    account.tags = vec!["vip".into()];
    account.note = Some(String::new());
    account.named.name.clear();
    round_trip(&account);
}

#[test]
fn equal_depth_fields_are_dropped_both_ways() {
    setup();
    let pair = Pair {
        l: Left { shared: 1, left: 2 },
        r: Right { shared: 3, right: 4 },
    };
    for codec in CODECS {
        let bytes = marshal(codec, &pair).unwrap();
        assert_eq!(keys(codec, &bytes), ["left", "right"], "{codec}");

        let wire = BTreeMap::from([("shared", 5_u8), ("left", 6), ("right", 7)]);
        let wire: BTreeMap<String, u8> = wire.into_iter().map(|(k, v)| (k.to_owned(), v)).collect();
        let back: Pair = decode_as(codec, &marshal(codec, &wire).unwrap()).unwrap();
        assert_eq!(back.l, Left { shared: 0, left: 6 });
        assert_eq!(back.r, Right { shared: 0, right: 7 });
    }
}

// -----------------------------------------------------------------------------
// Hooks and errors

#[derive(Reflect, Clone, Default, Debug, PartialEq)]
#[conv(encoder)]
struct Masked {
    secret: String,
}

impl ValueEncoder for Masked {
    fn encode_value(&self, enc: &mut Encoder<'_>) -> Result<(), Error> {
        enc.sink().write_string("***")
    }
}

#[test]
fn custom_encoders_win_in_every_format() {
    setup();
    let masked = Masked { secret: "hunter2".into() };
    assert_eq!(marshal("resp", &masked).unwrap(), b"+***\r\n");
    assert_eq!(marshal("cbor", &masked).unwrap(), [0x63, b'*', b'*', b'*']);
}

#[test]
fn overflow_is_reported() {
    setup();
    for codec in CODECS {
        let bytes = marshal(codec, &300_i32).unwrap();
        let err = decode_as::<i8>(codec, &bytes).unwrap_err();
        let CodecError::Conv(err) = err else {
            panic!("{codec}: {err}");
        };
        assert!(
            matches!(err.kind(), ErrorKind::Overflow { target: "i8", .. }),
            "{codec}: {err}"
        );

        let bytes = marshal(codec, &vec![1_i32, -1]).unwrap();
        let err = decode_as::<Vec<u32>>(codec, &bytes).unwrap_err();
        let CodecError::Conv(err) = err else {
            panic!("{codec}: {err}");
        };
        assert_eq!(err.path_string(), "[1]");
    }
}

#[test]
fn unknown_codecs_fail() {
    let err = marshal("application/x-nope", &1_u8).unwrap_err();
    assert!(matches!(err, CodecError::CodecNotFound(_)));
}

// -----------------------------------------------------------------------------
// Properties

proptest! {
    #[test]
    fn signed_round_trip(v in any::<i64>()) {
        setup();
        for codec in CODECS {
            let back: i64 = decode_as(codec, &marshal(codec, &v).unwrap()).unwrap();
            prop_assert_eq!(back, v);
        }
    }

    #[test]
    fn unsigned_round_trip(v in any::<u64>()) {
        setup();
        for codec in CODECS {
            let back: u64 = decode_as(codec, &marshal(codec, &v).unwrap()).unwrap();
            prop_assert_eq!(back, v);
        }
    }

    #[test]
    fn float_round_trip(v in any::<f64>().prop_filter("nan", |v| !v.is_nan())) {
        setup();
        for codec in CODECS {
            let back: f64 = decode_as(codec, &marshal(codec, &v).unwrap()).unwrap();
            prop_assert_eq!(back.to_bits(), v.to_bits());
        }
    }

    #[test]
    fn narrowing_matches_try_from(v in any::<i64>()) {
        setup();
        for codec in CODECS {
            let got = decode_as::<i16>(codec, &marshal(codec, &v).unwrap()).ok();
            prop_assert_eq!(got, i16::try_from(v).ok());
        }
    }

    #[test]
    fn text_round_trip(s in ".*") {
        setup();
        for codec in CODECS {
            let back: String = decode_as(codec, &marshal(codec, &s).unwrap()).unwrap();
            prop_assert_eq!(&back, &s);
        }
    }
}
