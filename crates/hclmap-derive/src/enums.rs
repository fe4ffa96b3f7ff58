use crate::attrs::FieldAttrs;
use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{DataEnum, DeriveInput, Fields};

// expand_enum
pub fn expand_enum(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream> {
    if data.variants.iter().all(|v| matches!(v.fields, Fields::Unit)) {
        return expand_enumeration(input, data);
    }
    if data
        .variants
        .iter()
        .all(|v| matches!(&v.fields, Fields::Unnamed(f) if f.unnamed.len() == 1))
    {
        return expand_variants(input, data);
    }

    Err(syn::Error::new_spanned(
        &input.ident,
        "Hcl enums must have only unit variants or only single-field tuple variants",
    ))
}

fn expand_enumeration(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let type_name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut idents = Vec::new();
    let mut values = Vec::new();
    for variant in &data.variants {
        let attrs = FieldAttrs::parse(&variant.attrs)?;
        idents.push(&variant.ident);
        values.push(attrs.variant_rename().unwrap_or_else(|| variant.ident.to_string()));
    }

    Ok(quote! {
        impl #impl_generics ::hclmap_core::Property for #ident #ty_generics #where_clause {
            fn shape() -> ::hclmap_core::Shape {
                ::hclmap_core::Shape::Enumeration {
                    type_name: #type_name,
                    values: &[#(#values),*],
                }
            }

            fn to_node(&self) -> ::hclmap_core::Node<'_> {
                let value = match self {
                    #(Self::#idents => #values,)*
                };
                ::hclmap_core::Node::Str(::std::borrow::Cow::Borrowed(value))
            }

            fn from_raw(
                raw: ::hclmap_core::Raw<'_>,
                ctx: &::hclmap_core::DecodeContext<'_>,
            ) -> ::hclmap_core::Result<::std::option::Option<Self>> {
                match raw {
                    ::hclmap_core::Raw::Value(::hclmap_core::Value::String(s)) => match s.as_str() {
                        #(#values => ::std::result::Result::Ok(::std::option::Option::Some(Self::#idents)),)*
                        other => ctx.mismatch(#type_name, &::std::format!("unknown value '{}'", other)),
                    },
                    other => ctx.mismatch(#type_name, &other.describe()),
                }
            }
        }
    })
}

fn expand_variants(input: &DeriveInput, data: &DataEnum) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let type_name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut decls = Vec::new();
    let mut node_arms = Vec::new();
    let mut decode_arms = Vec::new();

    for (index, variant) in data.variants.iter().enumerate() {
        let attrs = FieldAttrs::parse(&variant.attrs)?;
        let variant_ident = &variant.ident;
        let name = variant_ident.to_string();
        let ty = match &variant.fields {
            Fields::Unnamed(fields) => &fields.unnamed[0].ty,
            _ => unreachable!("checked by expand_enum"),
        };
        let index = Literal::usize_unsuffixed(index);

        let mut decl = quote! {
            ::hclmap_core::VariantDecl::new(
                #name,
                <#ty as ::hclmap_core::Record>::type_name(),
                <#ty as ::hclmap_core::Record>::declared_fields,
            )
        };
        if let Some(key) = attrs.variant_rename() {
            decl = quote! { #decl.rename(#key) };
        }
        if let Some(doc) = attrs.documentation() {
            decl = quote! { #decl.doc(#doc) };
        }
        decls.push(decl);

        node_arms.push(quote! {
            Self::#variant_ident(inner) => ::hclmap_core::Node::Variant { index: #index, record: inner },
        });
        decode_arms.push(quote! {
            ::hclmap_core::Raw::Variant { index: #index, accessor } => ::std::result::Result::Ok(
                ::hclmap_core::decoder::decode_record::<#ty>(::hclmap_core::Raw::Record(accessor), ctx)?
                    .map(Self::#variant_ident),
            ),
        });
    }

    Ok(quote! {
        impl #impl_generics ::hclmap_core::Property for #ident #ty_generics #where_clause {
            fn shape() -> ::hclmap_core::Shape {
                ::hclmap_core::Shape::Variants {
                    type_name: #type_name,
                    variants: ::std::vec![#(#decls),*],
                }
            }

            fn to_node(&self) -> ::hclmap_core::Node<'_> {
                match self {
                    #(#node_arms)*
                }
            }

            fn from_raw(
                raw: ::hclmap_core::Raw<'_>,
                ctx: &::hclmap_core::DecodeContext<'_>,
            ) -> ::hclmap_core::Result<::std::option::Option<Self>> {
                match raw {
                    #(#decode_arms)*
                    other => ctx.mismatch(#type_name, &other.describe()),
                }
            }
        }
    })
}
