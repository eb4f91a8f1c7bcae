use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ReflectDerive, StructField};

/// Generate implementation code for `Struct`, indexing the reflected fields.
pub(crate) fn impl_trait_struct(derive: &ReflectDerive, fields: &[StructField]) -> TokenStream {
    let oc_conv_path = &derive.oc_conv_path;
    let struct_ = crate::path::struct_(oc_conv_path);
    let reflect_ = crate::path::reflect_(oc_conv_path);

    let (indices, idents): (Vec<usize>, Vec<_>) = fields
        .iter()
        .filter_map(|field| Some((field.index?, field.ident)))
        .unzip();
    let field_len = indices.len();

    let ident = derive.ident;
    let (impl_generics, ty_generics, _) = derive.generics.split_for_impl();
    let where_clause = super::where_clause(derive);

    quote! {
        impl #impl_generics #struct_ for #ident #ty_generics #where_clause {
            #[inline]
            fn field_len(&self) -> usize {
                #field_len
            }

            fn field_at(&self, index: usize) -> ::core::option::Option<&dyn #reflect_> {
                match index {
                    #(#indices => ::core::option::Option::Some(&self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_at_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn #reflect_> {
                match index {
                    #(#indices => ::core::option::Option::Some(&mut self.#idents),)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}
