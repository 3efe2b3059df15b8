//! # `#[derive(Commands)]`
//!
//! Generates `console_fields()` for a struct with named fields:
//!
//! - `#[command]` field: readable (cloned out) and writable value;
//! - `#[command(readonly)]` field: readable value only;
//! - `#[command(callback)]` field holding `fn(..) -> R` or
//!   `Box<dyn Fn(..) -> R>`: callable invoked with the console arguments.
//!
//! Field commands always belong to an instance.

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Field, Fields, LitStr, Result, Visibility};

use crate::attrs::{CommandArgs, find_marker, parse_marker};
use crate::types::callback;

pub fn commands_derive_impl(input: DeriveInput) -> Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(&input.ident, "#[derive(Commands)] needs a struct"));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(&input.ident, "#[derive(Commands)] needs named fields"));
    };

    let mut descriptors = Vec::new();
    for field in &fields.named {
        let Some(marker) = find_marker(&field.attrs) else { continue };
        let args = parse_marker(marker)?;
        if args.get || args.set {
            return Err(syn::Error::new_spanned(marker, "`get`/`set` apply to methods; fields are readable and writable by default"));
        }
        descriptors.extend(field_descriptors(field, &args)?);
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Console commands declared on this struct's fields.
            pub fn console_fields() -> ::std::vec::Vec<::console_core::MemberDescriptor> {
                ::std::vec![ #( #descriptors ),* ]
            }
        }
    })
}

fn field_descriptors(field: &Field, args: &CommandArgs) -> Result<Vec<TokenStream2>> {
    let Some(ident) = &field.ident else { return Ok(Vec::new()) };
    let name = LitStr::new(&args.command_name(&ident.to_string(), None), ident.span());
    let owner = quote! { ::console_core::OwnerType::of::<Self>() };
    let private = !matches!(field.vis, Visibility::Public(_));
    let force = args.force;
    let policy = quote! { .private(#private).force_include(#force) };

    if args.callback {
        let sig = callback(&field.ty)?;
        let specs = sig.params.iter().map(|p| {
            let pname = LitStr::new(&p.name, ident.span());
            let ty = &p.ty;
            quote! { ::console_core::ParamSpec::new(#pname, <#ty as ::console_core::ConsoleValue>::type_tag()) }
        });
        let (binds, passes): (Vec<_>, Vec<_>) = sig
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let arg = format_ident!("__arg{}", i);
                let ty = &p.ty;
                let bind = quote! { let #arg = <#ty as ::console_core::ConsoleValue>::from_value(&__args[#i])?; };
                let pass = if p.by_ref { quote! { &#arg } } else { quote! { #arg } };
                (bind, pass)
            })
            .unzip();
        let ret_ty = &sig.returns.ty;
        let call = quote! {
            ::console_core::with_component_ref::<Self, _>(__target, |__this| (__this.#ident)( #( #passes ),* ))?
        };
        let run = if sig.returns.fallible {
            quote! { let __ret = #call.map_err(::console_core::InvokeError::failed)?; }
        } else {
            quote! { let __ret = #call; }
        };
        return Ok(vec![quote! {
            ::console_core::MemberDescriptor::callable(
                #name,
                #owner,
                ::std::vec![ #( #specs ),* ],
                <#ret_ty as ::console_core::ConsoleValue>::type_tag(),
                |__target, __args| {
                    let _ = &__args;
                    #( #binds )*
                    #run
                    ::core::result::Result::Ok(::console_core::ConsoleValue::into_value(__ret))
                },
            )
            .with_member_kind(::console_core::MemberKind::Callback)
            #policy
        }]);
    }

    let ty = &field.ty;
    let tag = quote! { <#ty as ::console_core::ConsoleValue>::type_tag() };
    let mut out = vec![quote! {
        ::console_core::MemberDescriptor::getter(#name, #owner, #tag, |__target| {
            let __value = ::console_core::with_component_ref::<Self, _>(__target, |__this| {
                ::core::clone::Clone::clone(&__this.#ident)
            })?;
            ::core::result::Result::Ok(::console_core::ConsoleValue::into_value(__value))
        })
        .with_member_kind(::console_core::MemberKind::Field)
        #policy
    }];

    if !args.readonly {
        out.push(quote! {
            ::console_core::MemberDescriptor::setter(#name, #owner, #tag, |__target, __value| {
                let __value = <#ty as ::console_core::ConsoleValue>::from_value(&__value)?;
                ::console_core::with_component_mut::<Self, _>(__target, |__this| __this.#ident = __value)
            })
            .with_member_kind(::console_core::MemberKind::Field)
            #policy
        });
    }
    Ok(out)
}

// ================= TESTS ==========================
