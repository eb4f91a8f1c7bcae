use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;

use crate::derive_data::{ReflectDerive, ReflectKind, StructField};

/// Generate implementation code for `Typed`.
pub(crate) fn impl_trait_typed(derive: &ReflectDerive) -> TokenStream {
    let oc_conv_path = &derive.oc_conv_path;
    let typed_ = crate::path::typed_(oc_conv_path);
    let type_info_ = crate::path::type_info_(oc_conv_path);
    let shape_ = crate::path::shape_(oc_conv_path);

    let shape_tokens = match &derive.kind {
        ReflectKind::Struct(fields) => {
            let struct_info_ = crate::path::struct_info_(oc_conv_path);
            let field_infos = fields.iter().filter_map(|field| field_info_tokens(derive, field));
            quote! {
                #shape_::Struct(#struct_info_::new(&[#(#field_infos),*]))
            }
        }
        ReflectKind::Opaque => quote!(#shape_::Opaque),
    };

    let hooks_tokens = hooks_tokens(derive);
    let type_info_tokens = quote! {
        #type_info_::new::<Self>(#shape_tokens)#hooks_tokens
    };

    let inner_cell_tokens = if derive.is_generic() {
        let info_cell = crate::path::generic_type_info_cell_(oc_conv_path);
        quote! {
            static CELL: #info_cell = #info_cell::new();
            CELL.get_or_insert::<Self>(|| {
                #type_info_tokens
            })
        }
    } else {
        let info_cell = crate::path::non_generic_type_info_cell_(oc_conv_path);
        quote! {
            static CELL: #info_cell = #info_cell::new();
            CELL.get_or_init(|| {
                #type_info_tokens
            })
        }
    };

    let zero_tokens = match &derive.kind {
        ReflectKind::Struct(fields) => {
            let inits = fields.iter().map(|field| {
                let ident = field.ident;
                let ty = field.ty;
                if field.index.is_some() {
                    quote!(#ident: <#ty as #typed_>::zero_value())
                } else {
                    quote!(#ident: ::core::default::Default::default())
                }
            });
            quote!(Self { #(#inits,)* })
        }
        ReflectKind::Opaque => quote!(<Self as ::core::default::Default>::default()),
    };

    let ident = derive.ident;
    let (impl_generics, ty_generics, _) = derive.generics.split_for_impl();
    let where_clause = super::where_clause(derive);

    quote! {
        impl #impl_generics #typed_ for #ident #ty_generics #where_clause {
            fn type_info() -> &'static #type_info_ {
                #inner_cell_tokens
            }

            fn zero_value() -> Self {
                #zero_tokens
            }
        }
    }
}

// `FieldInfo::new::<T>(ident, index)` with rename and flags; `None` if skipped.
fn field_info_tokens(derive: &ReflectDerive, field: &StructField) -> Option<TokenStream> {
    let index = field.index?;
    let field_info_ = crate::path::field_info_(&derive.oc_conv_path);
    let field_flags_ = crate::path::field_flags_(&derive.oc_conv_path);

    let ty = field.ty;
    let name = field.ident.unraw().to_string();
    let rename = field
        .attrs
        .rename
        .as_ref()
        .map(|lit| quote!(.with_rename(#lit)));

    let flags: Vec<TokenStream> = [
        (field.attrs.omit_empty.is_some(), quote!(OMIT_EMPTY)),
        (field.attrs.omit_zero.is_some(), quote!(OMIT_ZERO)),
        (field.attrs.embed.is_some(), quote!(EMBED)),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .map(|(_, flag)| quote!(.union(#field_flags_::#flag)))
    .collect();
    let flags = if flags.is_empty() {
        None
    } else {
        Some(quote!(.with_flags(#field_flags_::empty()#(#flags)*)))
    };

    Some(quote! {
        #field_info_::new::<#ty>(#name, #index)#rename #flags
    })
}

// `.with_hooks(HookTable::EMPTY.with_*::<Self>()...)`, empty without hooks.
fn hooks_tokens(derive: &ReflectDerive) -> TokenStream {
    let attrs = &derive.attrs;
    let builders: Vec<TokenStream> = [
        (attrs.encoder.is_some(), quote!(with_encoder)),
        (attrs.decoder.is_some(), quote!(with_decoder)),
        (attrs.text.is_some(), quote!(with_text)),
        (attrs.error.is_some(), quote!(with_error)),
        (attrs.zero_eq.is_some(), quote!(with_zero_eq)),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .map(|(_, builder)| quote!(.#builder::<Self>()))
    .collect();

    if builders.is_empty() {
        return TokenStream::new();
    }
    let hook_table_ = crate::path::hook_table_(&derive.oc_conv_path);
    quote! {
        .with_hooks(#hook_table_::EMPTY #(#builders)*)
    }
}
