use syn::{Data, DeriveInput, Fields, Generics, Ident, Path, Type};

use super::{FieldAttributes, TypeAttributes};

/// One declared field of a record.
pub(crate) struct StructField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub attrs: FieldAttributes,
    /// Reflected position, `None` for skipped fields.
    pub index: Option<usize>,
}

pub(crate) enum ReflectKind<'a> {
    /// Named fields, or none at all.
    Struct(Vec<StructField<'a>>),
    Opaque,
}

/// Everything the generators need.
pub(crate) struct ReflectDerive<'a> {
    pub oc_conv_path: Path,
    pub ident: &'a Ident,
    pub generics: &'a Generics,
    pub attrs: TypeAttributes,
    pub kind: ReflectKind<'a>,
}

impl<'a> ReflectDerive<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;

        let kind = if attrs.opaque.is_some() {
            ReflectKind::Opaque
        } else {
            match &input.data {
                Data::Struct(data) => match &data.fields {
                    Fields::Named(named) => {
                        let mut fields = Vec::with_capacity(named.named.len());
                        let mut index = 0;
                        for field in &named.named {
                            let field_attrs = FieldAttributes::parse_attrs(&field.attrs)?;
                            let position = if field_attrs.skip.is_some() {
                                None
                            } else {
                                index += 1;
                                Some(index - 1)
                            };
                            fields.push(StructField {
                                // Named fields always carry an identifier.
                                ident: field.ident.as_ref().ok_or_else(|| {
                                    syn::Error::new_spanned(field, "expected a named field")
                                })?,
                                ty: &field.ty,
                                attrs: field_attrs,
                                index: position,
                            });
                        }
                        ReflectKind::Struct(fields)
                    }
                    Fields::Unit => ReflectKind::Struct(Vec::new()),
                    Fields::Unnamed(_) => {
                        return Err(syn::Error::new_spanned(
                            &input.ident,
                            "tuple structs have no field names, mark them `#[conv(opaque)]` and add hooks",
                        ));
                    }
                },
                Data::Enum(_) => {
                    return Err(syn::Error::new_spanned(
                        &input.ident,
                        "enums must be `#[conv(opaque)]` with hooks",
                    ));
                }
                Data::Union(_) => {
                    return Err(syn::Error::new_spanned(&input.ident, "unions are not supported"));
                }
            }
        };

        if let Some(param) = input.generics.lifetimes().next() {
            return Err(syn::Error::new_spanned(
                param,
                "reflected types must be `'static`, lifetime parameters are not supported",
            ));
        }

        Ok(Self {
            oc_conv_path: crate::path::oc_conv(),
            ident: &input.ident,
            generics: &input.generics,
            attrs,
            kind,
        })
    }

    /// The generic cell is needed as soon as the type has parameters.
    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.generics.params.is_empty()
    }
}
