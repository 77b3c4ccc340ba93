//! Procedural macros for `confkey` configuration key enums.
//!
//! `#[derive(ConfigurationKey)]` checks the enum and registers the helper
//! attributes read by `confkey_gen` at build time. `#[configuration_methods]`
//! strips the method markers from an inherent `impl` block, since helper
//! attributes only exist on the derived item itself.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;
mod methods;

/// Derive macro marking an enum as a configuration key space.
///
/// Emits `CONFIGURATION_KEYS`, every variant in declaration order.
#[proc_macro_derive(
    ConfigurationKey,
    attributes(configuration, property_file_resolver, pass_annotations)
)]
pub fn derive_configuration_key(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Strips `#[configuration(validator | key_string)]` from the methods of an
/// inherent `impl` block after checking them.
#[proc_macro_attribute]
pub fn configuration_methods(args: TokenStream, item: TokenStream) -> TokenStream {
    methods::expand(args.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
