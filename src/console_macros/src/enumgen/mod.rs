//! # `#[derive(ConsoleEnum)]`
//!
//! Implements `ConsoleEnum` and `ConsoleValue` for a fieldless enum. Members
//! are exposed by name, in declaration order; input matches them ignoring
//! case.

use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Result};

pub fn console_enum_impl(input: DeriveInput) -> Result<TokenStream2> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(&input.ident, "#[derive(ConsoleEnum)] needs an enum"));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(&input.ident, "#[derive(ConsoleEnum)] needs at least one variant"));
    }
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(&input.generics, "#[derive(ConsoleEnum)] does not support generics"));
    }

    let mut variants = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(variant, "console enums cannot carry data"));
        }
        variants.push(&variant.ident);
    }

    let ident = &input.ident;
    let enum_name = LitStr::new(&ident.to_string(), ident.span());
    let names = variants.iter().map(|v| LitStr::new(&v.to_string(), v.span()));
    let indices: Vec<usize> = (0..variants.len()).collect();

    Ok(quote! {
        impl ::console_core::ConsoleEnum for #ident {
            const INFO: ::console_core::EnumInfo = ::console_core::EnumInfo::new(#enum_name, &[ #( #names ),* ]);

            fn from_index(index: usize) -> ::core::option::Option<Self> {
                match index {
                    #( #indices => ::core::option::Option::Some(Self::#variants), )*
                    _ => ::core::option::Option::None,
                }
            }

            fn index(&self) -> usize {
                match self {
                    #( Self::#variants => #indices, )*
                }
            }
        }

        impl ::console_core::ConsoleValue for #ident {
            fn type_tag() -> ::console_core::TypeTag {
                ::console_core::TypeTag::Enum(<Self as ::console_core::ConsoleEnum>::INFO)
            }

            fn from_value(value: &::console_core::Value) -> ::core::result::Result<Self, ::console_core::InvokeError> {
                ::console_core::value::enum_from_value(value)
            }

            fn into_value(self) -> ::console_core::Value {
                ::console_core::value::enum_into_value(&self)
            }
        }
    })
}

// ================= TESTS ==========================
