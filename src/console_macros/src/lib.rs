extern crate proc_macro;

mod attrs;
mod enumgen;
mod fieldsgen;
mod methodsgen;
mod types;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemImpl, parse_macro_input};

use enumgen::console_enum_impl;
use fieldsgen::commands_derive_impl;
use methodsgen::console_commands_impl;

/// Turns the `#[command]` methods of an inherent `impl` block into console
/// commands, collected by a generated `console_methods()` function.
///
/// ```ignore
/// #[console_commands]
/// impl Health {
///     #[command]
///     pub fn add_health(&mut self, amount: f32) -> f32 { ... }
///
///     #[command(get, name = "hp")]
///     pub fn points(&self) -> f32 { ... }
///
///     #[command]
///     pub fn restart() { ... }
/// }
/// ```
#[proc_macro_attribute]
pub fn console_commands(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let span = proc_macro2::TokenStream::from(attr);
        return syn::Error::new_spanned(span, "#[console_commands] takes no arguments")
            .to_compile_error()
            .into();
    }
    let input = parse_macro_input!(item as ItemImpl);
    console_commands_impl(input).unwrap_or_else(syn::Error::into_compile_error).into()
}

/// Exposes `#[command]` fields (getter and setter) and `#[command(callback)]`
/// function fields through a generated `console_fields()` function.
#[proc_macro_derive(Commands, attributes(command))]
pub fn commands_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    commands_derive_impl(input).unwrap_or_else(syn::Error::into_compile_error).into()
}

/// Lets a fieldless enum cross the console boundary, matched by member name.
#[proc_macro_derive(ConsoleEnum)]
pub fn console_enum_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    console_enum_impl(input).unwrap_or_else(syn::Error::into_compile_error).into()
}
