//! Static type information.
//!
//! Every [`Typed`] type owns exactly one `&'static` [`TypeInfo`], built on first
//! access and stored in a [`NonGenericTypeInfoCell`] or [`GenericTypeInfoCell`].

mod cell;
mod struct_info;
mod type_info;
mod typed;

pub use cell::{GenericTypeInfoCell, NonGenericTypeInfoCell};
pub use struct_info::{FieldFlags, FieldInfo, StructInfo};
pub use type_info::{Shape, TypeInfo};
pub use typed::Typed;
