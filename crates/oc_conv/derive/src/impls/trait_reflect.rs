use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ReflectDerive, ReflectKind};

/// Generate implementation code for `Reflect`.
pub(crate) fn impl_trait_reflect(derive: &ReflectDerive) -> TokenStream {
    let oc_conv_path = &derive.oc_conv_path;
    let reflect_ = crate::path::reflect_(oc_conv_path);
    let typed_ = crate::path::typed_(oc_conv_path);
    let type_info_ = crate::path::type_info_(oc_conv_path);
    let reflect_ref_ = crate::path::reflect_ref_(oc_conv_path);
    let reflect_mut_ = crate::path::reflect_mut_(oc_conv_path);
    let zero_of_ = crate::path::zero_of_(oc_conv_path);

    let (ref_tokens, mut_tokens) = match &derive.kind {
        ReflectKind::Struct(_) => (
            quote!(#reflect_ref_::Struct(self)),
            quote!(#reflect_mut_::Struct(self)),
        ),
        ReflectKind::Opaque => (quote!(#reflect_ref_::Opaque), quote!(#reflect_mut_::Opaque)),
    };

    let ident = derive.ident;
    let (impl_generics, ty_generics, _) = derive.generics.split_for_impl();
    let where_clause = super::where_clause(derive);

    quote! {
        impl #impl_generics #reflect_ for #ident #ty_generics #where_clause {
            #[inline]
            fn reflect_type_info(&self) -> &'static #type_info_ {
                <Self as #typed_>::type_info()
            }

            #[inline]
            fn reflect_ref(&self) -> #reflect_ref_<'_> {
                #ref_tokens
            }

            #[inline]
            fn reflect_mut(&mut self) -> #reflect_mut_<'_> {
                #mut_tokens
            }

            #[inline]
            fn reflect_reset(&mut self) {
                ::core::clone::Clone::clone_from(self, #zero_of_::<Self>());
            }
        }
    }
}
