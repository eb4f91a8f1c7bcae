#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use oc_codec as codec;
pub use oc_conv as conv;
pub use oc_utils as utils;

pub use oc_codec::{CodecError, marshal, unmarshal};
pub use oc_conv::{Error, Reflect, Type};
