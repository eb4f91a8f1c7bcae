//! `#[conv(...)]` attributes of types and fields.

use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr};

use crate::CONV_ATTRIBUTE_NAME;

// Reject a flag given twice.
fn set_flag(slot: &mut Option<Span>, meta: &ParseNestedMeta) -> syn::Result<()> {
    if slot.is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    *slot = Some(meta.path.span());
    Ok(())
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Type level options. Each flag keeps the span it was declared at.
#[derive(Default, Debug)]
pub(crate) struct TypeAttributes {
    pub opaque: Option<Span>,
    pub encoder: Option<Span>,
    pub decoder: Option<Span>,
    pub text: Option<Span>,
    pub error: Option<Span>,
    pub zero_eq: Option<Span>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(CONV_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let slot = if meta.path.is_ident("opaque") {
                    &mut this.opaque
                } else if meta.path.is_ident("encoder") {
                    &mut this.encoder
                } else if meta.path.is_ident("decoder") {
                    &mut this.decoder
                } else if meta.path.is_ident("text") {
                    &mut this.text
                } else if meta.path.is_ident("error") {
                    &mut this.error
                } else if meta.path.is_ident("zero_eq") {
                    &mut this.zero_eq
                } else {
                    return Err(meta.error(
                        "expected one of `opaque`, `encoder`, `decoder`, `text`, `error`, `zero_eq`",
                    ));
                };
                set_flag(slot, &meta)
            })?;
        }
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Field level options.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    pub rename: Option<LitStr>,
    pub skip: Option<Span>,
    pub omit_empty: Option<Span>,
    pub omit_zero: Option<Span>,
    pub embed: Option<Span>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(CONV_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if this.rename.is_some() {
                        return Err(meta.error("duplicate attribute"));
                    }
                    let name: LitStr = meta.value()?.parse()?;
                    if name.value().is_empty() {
                        return Err(syn::Error::new(name.span(), "field name cannot be empty"));
                    }
                    this.rename = Some(name);
                    return Ok(());
                }
                let slot = if meta.path.is_ident("skip") {
                    &mut this.skip
                } else if meta.path.is_ident("omit_empty") {
                    &mut this.omit_empty
                } else if meta.path.is_ident("omit_zero") {
                    &mut this.omit_zero
                } else if meta.path.is_ident("embed") {
                    &mut this.embed
                } else {
                    return Err(meta.error(
                        "expected one of `rename`, `skip`, `omit_empty`, `omit_zero`, `embed`",
                    ));
                };
                set_flag(slot, &meta)
            })?;
        }
        this.validate()?;
        Ok(this)
    }

    fn validate(&self) -> syn::Result<()> {
        if let Some(span) = self.skip {
            let others = self.rename.is_some()
                || self.omit_empty.is_some()
                || self.omit_zero.is_some()
                || self.embed.is_some();
            if others {
                return Err(syn::Error::new(span, "`skip` cannot be combined with other options"));
            }
        }
        if let (Some(span), Some(_)) = (self.embed, &self.rename) {
            return Err(syn::Error::new(span, "an embedded field has no name of its own"));
        }
        Ok(())
    }
}
