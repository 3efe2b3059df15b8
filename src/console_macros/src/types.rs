//! Signature analysis shared by the generators.

use syn::{
    FnArg, GenericArgument, Pat, PathArguments, Result, ReturnType, Signature, Type, TypeParamBound, parse_quote,
};

/// One console-visible parameter.
pub struct Param {
    pub name: String, // Shown in hints and type info
    pub ty: Type,     // Owned type converted from the console value
    pub by_ref: bool, // Passed to the member as `&value`
}

/// Return type with an outer `Result` peeled off.
pub struct Returns {
    pub ty: Type,       // Type converted into the console value
    pub fallible: bool, // Member returns `Result<ty, E>`
}

impl Returns {
    pub fn is_void(&self) -> bool {
        matches!(&self.ty, Type::Tuple(t) if t.elems.is_empty())
    }
}

fn is_str(ty: &Type) -> bool {
    matches!(ty, Type::Path(p) if p.qself.is_none() && p.path.is_ident("str"))
}

/// Maps a declared parameter type to the owned type the console converts to.
/// `&str` becomes `String`, `&T` becomes `T`; both are passed back by reference.
pub fn param(name: String, ty: &Type) -> Result<Param> {
    match ty {
        Type::Reference(r) if r.mutability.is_some() => {
            Err(syn::Error::new_spanned(ty, "`&mut` parameters cannot be filled from the console"))
        }
        Type::Reference(r) if is_str(&r.elem) => Ok(Param { name, ty: parse_quote!(::std::string::String), by_ref: true }),
        Type::Reference(r) => Ok(Param { name, ty: (*r.elem).clone(), by_ref: true }),
        Type::ImplTrait(_) => Err(syn::Error::new_spanned(ty, "`impl Trait` parameters are not supported")),
        _ => Ok(Param { name, ty: ty.clone(), by_ref: false }),
    }
}

/// `T` when `ty` is written `Result<T, ..>` (any path ending in `Result`).
fn result_ok_type(ty: &Type) -> Option<Type> {
    let Type::Path(p) = ty else { return None };
    let last = p.path.segments.last()?;
    if last.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else { return None };
    args.args.iter().find_map(|a| match a {
        GenericArgument::Type(t) => Some(t.clone()),
        _ => None,
    })
}

pub fn returns(ret: &ReturnType) -> Result<Returns> {
    let ty = match ret {
        ReturnType::Default => return Ok(Returns { ty: parse_quote!(()), fallible: false }),
        ReturnType::Type(_, ty) => ty.as_ref(),
    };
    if let Type::Reference(_) = ty {
        return Err(syn::Error::new_spanned(ty, "borrowed return values cannot leave the component; return an owned value"));
    }
    Ok(match result_ok_type(ty) {
        Some(ok) => Returns { ty: ok, fallible: true },
        None => Returns { ty: ty.clone(), fallible: false },
    })
}

/// Parameters of a method, without its receiver.
pub fn method_params(sig: &Signature) -> Result<Vec<Param>> {
    sig.inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(t) => Some(t),
            FnArg::Receiver(_) => None,
        })
        .enumerate()
        .map(|(i, arg)| {
            let name = match arg.pat.as_ref() {
                Pat::Ident(p) => p.ident.to_string().trim_start_matches('_').to_string(),
                _ => format!("arg{i}"),
            };
            param(name, &arg.ty)
        })
        .collect()
}

/// Signature of a callback field: `fn(A, B) -> R`, or `Box<dyn Fn(A, B) -> R>`
/// (also behind `Arc`/`Rc`).
pub struct Callback {
    pub params: Vec<Param>,
    pub returns: Returns,
}

pub fn callback(ty: &Type) -> Result<Callback> {
    match ty {
        Type::BareFn(f) => {
            let params = f
                .inputs
                .iter()
                .enumerate()
                .map(|(i, arg)| {
                    let name = arg.name.as_ref().map_or_else(|| format!("arg{i}"), |(n, _)| n.to_string());
                    param(name, &arg.ty)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Callback { params, returns: returns(&f.output)? })
        }
        Type::Path(p) => {
            let boxed = p
                .path
                .segments
                .last()
                .filter(|s| s.ident == "Box" || s.ident == "Arc" || s.ident == "Rc")
                .and_then(|s| match &s.arguments {
                    PathArguments::AngleBracketed(args) => args.args.first(),
                    _ => None,
                });
            match boxed {
                Some(GenericArgument::Type(Type::TraitObject(obj))) => fn_trait(obj.bounds.iter(), ty),
                _ => Err(unsupported_callback(ty)),
            }
        }
        _ => Err(unsupported_callback(ty)),
    }
}

fn fn_trait<'a>(mut bounds: impl Iterator<Item = &'a TypeParamBound>, ty: &Type) -> Result<Callback> {
    let segment = bounds
        .find_map(|b| match b {
            TypeParamBound::Trait(t) => t.path.segments.last().filter(|s| s.ident == "Fn"),
            _ => None,
        })
        .ok_or_else(|| unsupported_callback(ty))?;
    let PathArguments::Parenthesized(args) = &segment.arguments else {
        return Err(unsupported_callback(ty));
    };
    let params = args
        .inputs
        .iter()
        .enumerate()
        .map(|(i, t)| param(format!("arg{i}"), t))
        .collect::<Result<Vec<_>>>()?;
    Ok(Callback { params, returns: returns(&args.output)? })
}

fn unsupported_callback(ty: &Type) -> syn::Error {
    syn::Error::new_spanned(ty, "callback fields must be `fn(..) -> R` or `Box<dyn Fn(..) -> R>`")
}

// ================= TESTS ==========================

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;
    use syn::ImplItemFn;

    fn text(ty: &Type) -> String {
        ty.to_token_stream().to_string().replace(' ', "")
    }

    #[test]
    fn test_params_map_borrowed_types() {
        let p = param("name".into(), &parse_quote!(&str)).unwrap();
        assert_eq!(text(&p.ty), "::std::string::String");
        assert!(p.by_ref);

        let p = param("pos".into(), &parse_quote!(&Vector3)).unwrap();
        assert_eq!(text(&p.ty), "Vector3");
        assert!(p.by_ref);

        let p = param("n".into(), &parse_quote!(u8)).unwrap();
        assert!(!p.by_ref);

        assert!(param("out".into(), &parse_quote!(&mut u8)).is_err());
    }

    #[test]
    fn test_returns_peel_result() {
        let r = returns(&parse_quote!(-> Result<f32, String>)).unwrap();
        assert_eq!(text(&r.ty), "f32");
        assert!(r.fallible);

        let r = returns(&parse_quote!(-> io::Result<()>)).unwrap();
        assert!(r.fallible);
        assert!(r.is_void());

        let r = returns(&ReturnType::Default).unwrap();
        assert!(r.is_void());
        assert!(!r.fallible);

        assert!(returns(&parse_quote!(-> &str)).is_err());
    }

    #[test]
    fn test_method_params_skip_receiver() {
        let f: ImplItemFn = parse_quote! {
            fn teleport(&mut self, _target: ObjectRef, to: Vector3, (a, b): (u8, u8)) {}
        };
        let params = method_params(&f.sig).unwrap();
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["target", "to", "arg2"]);
    }

    #[test]
    fn test_callback_shapes() {
        let cb = callback(&parse_quote!(fn(amount: f32) -> bool)).unwrap();
        assert_eq!(cb.params[0].name, "amount");
        assert_eq!(text(&cb.returns.ty), "bool");

        let cb = callback(&parse_quote!(Box<dyn Fn(u32, &str) + Send>)).unwrap();
        assert_eq!(cb.params.len(), 2);
        assert_eq!(cb.params[1].name, "arg1");
        assert!(cb.returns.is_void());

        assert!(callback(&parse_quote!(Box<dyn FnMut()>)).is_err());
        assert!(callback(&parse_quote!(u32)).is_err());
    }
}
