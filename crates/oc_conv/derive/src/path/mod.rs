//! Paths of `oc_conv` items used by generated code.
//!
//! Kept in one place so the generated code follows `oc_conv` refactors with a
//! single change.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the access path to the `oc_conv` crate, see `oc_macro_utils::Manifest`.
///
/// Reads the caller's manifest, so call it once per derive.
pub(crate) fn oc_conv() -> syn::Path {
    oc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("oc_conv"))
}

#[inline(always)]
pub(crate) fn reflect_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::Reflect }
}

#[inline(always)]
pub(crate) fn typed_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::Typed }
}

#[inline(always)]
pub(crate) fn struct_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::ops::Struct }
}

#[inline(always)]
pub(crate) fn reflect_ref_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::ops::ReflectRef }
}

#[inline(always)]
pub(crate) fn reflect_mut_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::ops::ReflectMut }
}

#[inline(always)]
pub(crate) fn type_info_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::info::TypeInfo }
}

#[inline(always)]
pub(crate) fn shape_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::info::Shape }
}

#[inline(always)]
pub(crate) fn struct_info_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::info::StructInfo }
}

#[inline(always)]
pub(crate) fn field_info_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::info::FieldInfo }
}

#[inline(always)]
pub(crate) fn field_flags_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::info::FieldFlags }
}

#[inline(always)]
pub(crate) fn hook_table_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::hooks::HookTable }
}

#[inline(always)]
pub(crate) fn non_generic_type_info_cell_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::info::NonGenericTypeInfoCell }
}

#[inline(always)]
pub(crate) fn generic_type_info_cell_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::info::GenericTypeInfoCell }
}

#[inline(always)]
pub(crate) fn zero_of_(oc_conv_path: &syn::Path) -> TokenStream {
    quote! { #oc_conv_path::cache::zero_of }
}
