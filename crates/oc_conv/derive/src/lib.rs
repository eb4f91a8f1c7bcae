//! See [`Reflect`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static CONV_ATTRIBUTE_NAME: &str = "conv";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Reflection Derivation
///
/// `#[derive(Reflect)]` implements `Reflect` and `Typed`, and `Struct` for records.
///
/// - Structs with named fields, and unit structs, are records: they encode as a map
///   from field name to field value.
/// - Tuple structs and enums must be marked `opaque` and provide hooks.
///
/// The type must also implement `Clone`. Opaque types and skipped fields take
/// their zero value from `Default`.
///
/// ## Field attributes
///
/// ```rust, ignore
/// #[derive(Reflect, Clone)]
/// struct Job {
///     #[conv(rename = "ID")]
///     id: u64,
///     #[conv(omit_empty)]
///     tags: Vec<String>,
///     #[conv(omit_zero)]
///     started: std::time::SystemTime,
///     #[conv(embed)]
///     meta: Meta,
///     #[conv(skip)]
///     cache: Cache,
/// }
/// ```
///
/// - `rename = "..."`: exposed name, instead of the identifier.
/// - `omit_empty`: leave the field out when empty (`0`, `""`, `[]`, `None`, ...).
/// - `omit_zero`: leave the field out when equal to the zero value.
/// - `embed`: promote the fields of this record into the parent. A field of the
///   parent with the same name shadows a promoted one.
/// - `skip`: not reflected at all; takes `Default::default()` as zero value.
///
/// ## Type attributes
///
/// ```rust, ignore
/// #[derive(Reflect, Clone, Default)]
/// #[conv(opaque, text)]
/// struct Version(u16, u16);
/// ```
///
/// - `opaque`: expose no structure; conversion goes through hooks only.
/// - `encoder`: use the type's `ValueEncoder` implementation.
/// - `decoder`: use the type's `ValueDecoder` implementation.
/// - `text`: use `TextMarshal` and `TextUnmarshal`.
/// - `error`: encode as an error carrying the `Display` message.
/// - `zero_eq`: the zero check of an opaque type compares against its zero value
///   with `PartialEq`.
#[proc_macro_derive(Reflect, attributes(conv))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match derive_data::ReflectDerive::from_input(&ast) {
        Ok(derive) => impls::impl_reflect(&derive).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
