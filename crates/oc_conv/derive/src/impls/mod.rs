//! Code generation.

// -----------------------------------------------------------------------------
// Modules

mod trait_reflect;
mod trait_struct;
mod trait_typed;

// -----------------------------------------------------------------------------
// Internal API

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

use crate::derive_data::{ReflectDerive, ReflectKind};

/// Generate every impl of the derive, wrapped in an anonymous const.
pub(crate) fn impl_reflect(derive: &ReflectDerive) -> TokenStream {
    let typed_impl = trait_typed::impl_trait_typed(derive);
    let reflect_impl = trait_reflect::impl_trait_reflect(derive);
    let struct_impl = match &derive.kind {
        ReflectKind::Struct(fields) => trait_struct::impl_trait_struct(derive, fields),
        ReflectKind::Opaque => TokenStream::new(),
    };

    quote! {
        const _: () = {
            #typed_impl
            #reflect_impl
            #struct_impl
        };
    }
}

/// The where clause of every generated impl: the declared predicates plus
/// `Typed` on each type parameter.
pub(crate) fn where_clause(derive: &ReflectDerive) -> TokenStream {
    let typed_ = crate::path::typed_(&derive.oc_conv_path);

    let mut predicates: Vec<TokenStream> = derive
        .generics
        .where_clause
        .iter()
        .flat_map(|clause| clause.predicates.iter())
        .map(ToTokens::to_token_stream)
        .collect();
    predicates.extend(
        derive
            .generics
            .type_params()
            .map(|param| {
                let ident = &param.ident;
                quote!(#ident: #typed_)
            }),
    );

    if predicates.is_empty() {
        TokenStream::new()
    } else {
        quote!(where #(#predicates,)*)
    }
}
