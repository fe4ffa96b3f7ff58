//! `#[derive(Hcl)]`: generates the field tables and conversions used by
//! `hclmap-core`.
//!
//! - structs with named fields implement `Record` and `Property`
//! - single-field tuple structs are transparent newtypes
//! - enums of unit variants are string enumerations
//! - enums whose variants each hold one record are polymorphic values

use proc_macro::TokenStream;

mod attrs;
mod enums;
mod record;

#[proc_macro_derive(Hcl, attributes(hcl, serde))]
pub fn derive_hcl(input: TokenStream) -> TokenStream {
    let input: syn::DeriveInput = match syn::parse(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => record::expand_record(&input, fields),
            syn::Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
                record::expand_newtype(&input, &fields.unnamed[0])
            }
            other => Err(syn::Error::new_spanned(
                other,
                "Hcl can only be derived for structs with named fields or single-field tuple structs",
            )),
        },
        syn::Data::Enum(data) => enums::expand_enum(&input, data),
        syn::Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Hcl cannot be derived for unions",
        )),
    };

    expanded.unwrap_or_else(syn::Error::into_compile_error).into()
}
