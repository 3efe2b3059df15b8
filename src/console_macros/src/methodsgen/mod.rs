//! # `#[console_commands]`
//!
//! Expands an inherent `impl` block into itself (with the `#[command]`
//! markers removed) plus a second block holding
//!
//! ```ignore
//! pub fn console_methods() -> Vec<::console_core::MemberDescriptor>
//! ```
//!
//! The receiver decides how the member is reached:
//!
//! +-------------+-------------------------------------+
//! | Receiver    | Generated access                    |
//! +-------------+-------------------------------------+
//! | (none)      | static command, `Self::method(..)`  |
//! | &self       | `with_component_ref::<Self, _>`     |
//! | &mut self   | `with_component_mut::<Self, _>`     |
//! +-------------+-------------------------------------+
//!
//! Only `pub` methods are public; everything else is registered as private.

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{ImplItem, ImplItemFn, ItemImpl, LitStr, Result, Visibility};

use crate::attrs::{CommandArgs, is_marker, parse_marker};
use crate::types::{Param, Returns, method_params, returns};

/// How the generated thunk reaches the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Static,
    Shared,
    Exclusive,
}

fn access(method: &ImplItemFn) -> Result<Access> {
    match method.sig.receiver() {
        None => Ok(Access::Static),
        Some(r) if r.reference.is_none() => {
            Err(syn::Error::new_spanned(r, "commands take `&self` or `&mut self`, not `self`"))
        }
        Some(r) if r.mutability.is_some() => Ok(Access::Exclusive),
        Some(_) => Ok(Access::Shared),
    }
}

pub fn console_commands_impl(mut input: ItemImpl) -> Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(path, "#[console_commands] goes on an inherent impl block"));
    }

    let mut descriptors = Vec::new();
    for item in &mut input.items {
        let ImplItem::Fn(method) = item else { continue };
        let Some(index) = method.attrs.iter().position(is_marker) else { continue };
        let marker = method.attrs.remove(index);
        let args = parse_marker(&marker)?;
        descriptors.push(descriptor(method, &args)?);
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics #self_ty #where_clause {
            /// Console commands declared in this impl block.
            pub fn console_methods() -> ::std::vec::Vec<::console_core::MemberDescriptor> {
                ::std::vec![ #( #descriptors ),* ]
            }
        }
    })
}

/// Declares each parameter as a `let` converted from the console values.
fn bind_args(params: &[Param], source: impl Fn(usize) -> TokenStream2) -> (Vec<TokenStream2>, Vec<TokenStream2>) {
    params
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let ident = format_ident!("__arg{}", i);
            let ty = &p.ty;
            let value = source(i);
            let bind = quote! { let #ident = <#ty as ::console_core::ConsoleValue>::from_value(#value)?; };
            let pass = if p.by_ref { quote! { &#ident } } else { quote! { #ident } };
            (bind, pass)
        })
        .unzip()
}

/// Invokes the member and leaves its (unwrapped) result in `__ret`.
fn invoke(access: Access, method: &syn::Ident, passes: &[TokenStream2], ret: &Returns) -> TokenStream2 {
    let call = match access {
        Access::Static => quote! { Self::#method( #( #passes ),* ) },
        Access::Shared => quote! {
            ::console_core::with_component_ref::<Self, _>(__target, |__this| __this.#method( #( #passes ),* ))?
        },
        Access::Exclusive => quote! {
            ::console_core::with_component_mut::<Self, _>(__target, |__this| __this.#method( #( #passes ),* ))?
        },
    };
    if ret.fallible {
        quote! { let __ret = #call.map_err(::console_core::InvokeError::failed)?; }
    } else {
        quote! { let __ret = #call; }
    }
}

fn type_tag(ty: &syn::Type) -> TokenStream2 {
    quote! { <#ty as ::console_core::ConsoleValue>::type_tag() }
}

fn descriptor(method: &ImplItemFn, args: &CommandArgs) -> Result<TokenStream2> {
    let access = access(method)?;
    let ident = &method.sig.ident;
    let member = ident.to_string();
    let params = method_params(&method.sig)?;
    let ret = returns(&method.sig.output)?;
    let owner = quote! { ::console_core::OwnerType::of::<Self>() };

    let built = if args.get {
        if !params.is_empty() || ret.is_void() {
            return Err(syn::Error::new_spanned(&method.sig, "a `get` command takes no parameters and returns a value"));
        }
        let name = LitStr::new(&args.command_name(&member, Some("get_")), ident.span());
        let tag = type_tag(&ret.ty);
        let run = invoke(access, ident, &[], &ret);
        quote! {
            ::console_core::MemberDescriptor::getter(#name, #owner, #tag, |__target| {
                let _ = &__target;
                #run
                ::core::result::Result::Ok(::console_core::ConsoleValue::into_value(__ret))
            })
        }
    } else if args.set {
        if params.len() != 1 {
            return Err(syn::Error::new_spanned(&method.sig, "a `set` command takes exactly one parameter"));
        }
        let name = LitStr::new(&args.command_name(&member, Some("set_")), ident.span());
        let tag = type_tag(&params[0].ty);
        let (binds, passes) = bind_args(&params, |_| quote! { &__value });
        let run = invoke(access, ident, &passes, &ret);
        quote! {
            ::console_core::MemberDescriptor::setter(#name, #owner, #tag, |__target, __value| {
                let _ = &__target;
                #( #binds )*
                #run
                let _ = __ret;
                ::core::result::Result::Ok(())
            })
        }
    } else {
        let name = LitStr::new(&args.command_name(&member, None), ident.span());
        let specs = params.iter().map(|p| {
            let pname = LitStr::new(&p.name, ident.span());
            let tag = type_tag(&p.ty);
            quote! { ::console_core::ParamSpec::new(#pname, #tag) }
        });
        let ret_tag = type_tag(&ret.ty);
        let (binds, passes) = bind_args(&params, |i| quote! { &__args[#i] });
        let run = invoke(access, ident, &passes, &ret);
        quote! {
            ::console_core::MemberDescriptor::callable(
                #name,
                #owner,
                ::std::vec![ #( #specs ),* ],
                #ret_tag,
                |__target, __args| {
                    let _ = (&__target, &__args);
                    #( #binds )*
                    #run
                    ::core::result::Result::Ok(::console_core::ConsoleValue::into_value(__ret))
                },
            )
        }
    };

    let private = !matches!(method.vis, Visibility::Public(_));
    let force = args.force;
    let is_static = (access == Access::Static).then(|| quote! { .into_static() });
    Ok(quote! { #built #is_static .private(#private).force_include(#force) })
}

// ================= TESTS ==========================

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand(input: ItemImpl) -> String {
        console_commands_impl(input).unwrap().to_string()
    }

    #[test]
    fn test_receivers() {
        let shared: ImplItemFn = parse_quote! { fn a(&self) {} };
        let exclusive: ImplItemFn = parse_quote! { fn a(&mut self) {} };
        let none: ImplItemFn = parse_quote! { fn a() {} };
        let owned: ImplItemFn = parse_quote! { fn a(self) {} };
        assert_eq!(access(&shared).unwrap(), Access::Shared);
        assert_eq!(access(&exclusive).unwrap(), Access::Exclusive);
        assert_eq!(access(&none).unwrap(), Access::Static);
        assert!(access(&owned).is_err());
    }

    #[test]
    fn test_markers_are_removed_and_collected() {
        let out = expand(parse_quote! {
            impl Health {
                #[command(name = "Heal")]
                pub fn add_health(&mut self, amount: f32) -> f32 { self.points += amount; self.points }

                fn helper(&self) {}

                #[command]
                fn restart() {}
            }
        });
        assert!(out.contains("console_methods"));
        assert!(out.contains("\"heal\""));
        assert!(out.contains("\"restart\""));
        assert!(out.contains("with_component_mut"));
        assert!(out.contains("into_static"));
        assert!(!out.contains("# [command"));
        assert!(!out.contains("\"helper\""));
    }

    #[test]
    fn test_property_names_strip_prefixes() {
        let out = expand(parse_quote! {
            impl Player {
                #[command(get)]
                pub fn get_score(&self) -> i32 { self.score }
                #[command(set)]
                pub fn set_score(&mut self, score: i32) { self.score = score; }
            }
        });
        assert!(out.contains("MemberDescriptor :: getter (\"score\""));
        assert!(out.contains("MemberDescriptor :: setter (\"score\""));
    }

    #[test]
    fn test_fallible_methods_map_errors() {
        let out = expand(parse_quote! {
            impl Door {
                #[command]
                pub fn open(&mut self) -> Result<bool, String> { Ok(true) }
            }
        });
        assert!(out.contains("InvokeError :: failed"));
    }

    #[test]
    fn test_misdeclared_properties_are_rejected() {
        let bad_get: ItemImpl = parse_quote! {
            impl Player {
                #[command(get)]
                pub fn score(&self, x: u8) -> i32 { 0 }
            }
        };
        assert!(console_commands_impl(bad_get).is_err());

        let bad_set: ItemImpl = parse_quote! {
            impl Player {
                #[command(set)]
                pub fn score(&mut self) {}
            }
        };
        assert!(console_commands_impl(bad_set).is_err());

        let trait_impl: ItemImpl = parse_quote! {
            impl Default for Player {
                fn default() -> Self { Player }
            }
        };
        assert!(console_commands_impl(trait_impl).is_err());
    }
}
