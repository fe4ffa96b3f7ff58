use crate::attrs::FieldAttrs;
use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Field, FieldsNamed, Visibility};

// expand_record
pub fn expand_record(input: &DeriveInput, fields: &FieldsNamed) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let type_name = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut decls = Vec::new();
    let mut node_arms = Vec::new();
    let mut decode_arms = Vec::new();

    for (index, field) in fields.named.iter().enumerate() {
        let field_ident = field.ident.as_ref().expect("named field");
        let name = field_ident.unraw().to_string();
        let ty = &field.ty;
        let attrs = FieldAttrs::parse(&field.attrs)?;
        let public = matches!(field.vis, Visibility::Public(_));
        let mapped = public && !attrs.is_excluded();
        let index = Literal::usize_unsuffixed(index);

        let embedded = mapped && attrs.is_embedded();
        let mut decl = if embedded {
            quote! {
                ::hclmap_core::FieldDecl::new(#name, ::hclmap_core::Shape::opaque::<#ty>)
                    .embedded(<#ty as ::hclmap_core::Record>::declared_fields)
            }
        } else if mapped {
            quote! {
                ::hclmap_core::FieldDecl::new(#name, <#ty as ::hclmap_core::Property>::shape)
            }
        } else {
            quote! {
                ::hclmap_core::FieldDecl::new(#name, ::hclmap_core::Shape::opaque::<#ty>)
            }
        };

        if !public {
            decl = quote! { #decl.private() };
        }
        if let Some(tag) = attrs.primary_tag() {
            decl = quote! { #decl.primary(#tag) };
        }
        if let Some(tag) = attrs.fallback_tag() {
            decl = quote! { #decl.fallback(#tag) };
        }
        if let Some(doc) = attrs.documentation() {
            decl = quote! { #decl.doc(#doc) };
        }
        decls.push(decl);

        if !mapped {
            continue;
        }

        if embedded {
            node_arms.push(quote! {
                [#index, rest @ ..] => ::hclmap_core::Record::field_node(&self.#field_ident, rest),
            });
            decode_arms.push(quote! {
                [#index, rest @ ..] => ::hclmap_core::Record::decode_field(&mut self.#field_ident, rest, raw, ctx),
            });
        } else {
            node_arms.push(quote! {
                [#index] => ::std::option::Option::Some(::hclmap_core::Property::to_node(&self.#field_ident)),
            });
            decode_arms.push(quote! {
                [#index] => ::hclmap_core::Property::decode_in_place(&mut self.#field_ident, raw, ctx),
            });
        }
    }

    Ok(quote! {
        impl #impl_generics ::hclmap_core::Record for #ident #ty_generics #where_clause {
            fn type_name() -> &'static str {
                #type_name
            }

            fn declared_fields() -> ::std::vec::Vec<::hclmap_core::FieldDecl> {
                ::std::vec![#(#decls),*]
            }

            fn field_node(&self, path: &[usize]) -> ::std::option::Option<::hclmap_core::Node<'_>> {
                match path {
                    #(#node_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn decode_field(
                &mut self,
                path: &[usize],
                raw: ::hclmap_core::Raw<'_>,
                ctx: &::hclmap_core::DecodeContext<'_>,
            ) -> ::hclmap_core::Result<()> {
                match path {
                    #(#decode_arms)*
                    _ => {
                        let _ = (raw, ctx);
                        ::std::result::Result::Err(::hclmap_core::property::unknown_field::<Self>(path))
                    }
                }
            }
        }

        impl #impl_generics ::hclmap_core::Property for #ident #ty_generics #where_clause {
            fn shape() -> ::hclmap_core::Shape {
                ::hclmap_core::property::record_shape::<Self>()
            }

            fn to_node(&self) -> ::hclmap_core::Node<'_> {
                ::hclmap_core::Node::Record(self)
            }

            fn from_raw(
                raw: ::hclmap_core::Raw<'_>,
                ctx: &::hclmap_core::DecodeContext<'_>,
            ) -> ::hclmap_core::Result<::std::option::Option<Self>> {
                ::hclmap_core::decoder::decode_record::<Self>(raw, ctx)
            }

            fn decode_in_place(
                &mut self,
                raw: ::hclmap_core::Raw<'_>,
                ctx: &::hclmap_core::DecodeContext<'_>,
            ) -> ::hclmap_core::Result<()> {
                ::hclmap_core::decoder::decode_record_in_place(self, raw, ctx)
            }
        }
    })
}

// expand_newtype
pub fn expand_newtype(input: &DeriveInput, field: &Field) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let ty = &field.ty;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::hclmap_core::Property for #ident #ty_generics #where_clause {
            fn shape() -> ::hclmap_core::Shape {
                <#ty as ::hclmap_core::Property>::shape()
            }

            fn to_node(&self) -> ::hclmap_core::Node<'_> {
                ::hclmap_core::Property::to_node(&self.0)
            }

            fn from_raw(
                raw: ::hclmap_core::Raw<'_>,
                ctx: &::hclmap_core::DecodeContext<'_>,
            ) -> ::hclmap_core::Result<::std::option::Option<Self>> {
                ::std::result::Result::Ok(
                    <#ty as ::hclmap_core::Property>::from_raw(raw, ctx)?.map(Self),
                )
            }
        }
    })
}
