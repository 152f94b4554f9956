//! Derive macros for bottle
//!
//! This crate provides procedural macros for the bottle container.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, GenericParam, LitStr, Meta, TypeParam};

/// Generates an `Injectable` implementation for a struct with named fields.
///
/// Fields marked with `#[inject]` are resolved from the container, under the
/// field's own name or under the name given as `#[inject("name")]` or
/// `#[inject(name = "name")]`. Such fields must be `Arc<T>`. Other fields are
/// filled with `Default::default()`.
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = input.ident;

    let generics = input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut where_predicates = where_clause
        .map(|w| w.predicates.clone().into_iter().collect())
        .unwrap_or_else(Vec::new);

    // Injectable values are shared across threads.
    for param in generics.params.iter() {
        if let GenericParam::Type(TypeParam { ident, .. }) = param {
            where_predicates.push(syn::parse_quote!(#ident: Send + Sync + 'static));
        }
    }

    let fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            Fields::Unit => Default::default(),
            Fields::Unnamed(fields) => {
                return Err(syn::Error::new_spanned(
                    fields,
                    "Injectable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Injectable can only be derived for structs",
            ))
        }
    };

    let mut field_inits = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident else {
            continue;
        };
        match field.attrs.iter().find(|a| a.path().is_ident("inject")) {
            Some(attr) => {
                let service = service_name(attr, &field_name)?;
                field_inits.push(quote! {
                    #field_name: container.get(#service)?
                });
            }
            None => field_inits.push(quote! {
                #field_name: ::core::default::Default::default()
            }),
        }
    }

    let where_clause = if !where_predicates.is_empty() {
        quote! { where #(#where_predicates),* }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl #impl_generics ::bottle::Injectable for #name #ty_generics #where_clause {
            fn inject(
                container: &dyn ::bottle::Container,
            ) -> ::bottle::anyhow::Result<Self> {
                ::core::result::Result::Ok(Self {
                    #(#field_inits,)*
                })
            }
        }
    })
}

// #[inject], #[inject("name")] or #[inject(name = "name")]
fn service_name(attr: &syn::Attribute, field: &syn::Ident) -> syn::Result<LitStr> {
    match &attr.meta {
        Meta::Path(_) => Ok(LitStr::new(&field.to_string(), field.span())),
        Meta::List(list) => {
            if let Ok(name) = list.parse_args::<LitStr>() {
                return Ok(name);
            }
            let named: syn::MetaNameValue = list.parse_args()?;
            if !named.path.is_ident("name") {
                return Err(syn::Error::new_spanned(named.path, "expected `name = \"...\"`"));
            }
            match named.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(name),
                    ..
                }) => Ok(name),
                other => Err(syn::Error::new_spanned(other, "service name must be a string literal")),
            }
        }
        Meta::NameValue(named) => Err(syn::Error::new_spanned(
            named,
            "use #[inject(\"name\")] or #[inject(name = \"name\")]",
        )),
    }
}
