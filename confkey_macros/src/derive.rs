//! `ConfigurationKey` derive expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Data, DeriveInput, Fields, Lit, LitStr};

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "ConfigurationKey can only be derived for enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "ConfigurationKey requires at least one variant",
        ));
    }
    check_item_attributes(&input.attrs)?;

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "configuration keys must be unit variants",
            ));
        }
        check_variant_markers(&variant.attrs)?;
        variants.push(&variant.ident);
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Every configuration key, in declaration order.
            pub const CONFIGURATION_KEYS: &'static [Self] = &[#(Self::#variants),*];
        }
    })
}

fn check_item_attributes(attrs: &[Attribute]) -> syn::Result<()> {
    for attr in attrs {
        if attr.path().is_ident("configuration") {
            if matches!(attr.meta, syn::Meta::Path(_)) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("annotation_name")
                    || meta.path.is_ident("configuration_bean_name")
                    || meta.path.is_ident("properties_path")
                {
                    return lit_str(&meta).map(drop);
                }
                if meta.path.is_ident("producers_for_primitives") {
                    return flag(&meta).map(drop);
                }
                Err(meta.error("unsupported configuration option on enum"))
            })?;
        } else if attr.path().is_ident("property_file_resolver") {
            let mut has_path = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("properties_path") {
                    has_path = true;
                    return lit_str(&meta).map(drop);
                }
                if meta.path.is_ident("system_property_name") {
                    return lit_str(&meta).map(drop);
                }
                Err(meta.error("unsupported property_file_resolver option"))
            })?;
            if !has_path {
                return Err(syn::Error::new_spanned(
                    attr,
                    "property_file_resolver requires a properties_path",
                ));
            }
        } else if attr.path().is_ident("pass_annotations") {
            attr.parse_args_with(
                syn::punctuated::Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated,
            )?;
        }
    }
    Ok(())
}

fn check_variant_markers(attrs: &[Attribute]) -> syn::Result<()> {
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("configuration")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default_key") || meta.path.is_ident("null_value") {
                return Ok(());
            }
            if meta.path.is_ident("validator") || meta.path.is_ident("key_string") {
                return Err(meta.error("this marker belongs on a method in a #[configuration_methods] impl"));
            }
            Err(meta.error("unknown configuration marker"))
        })?;
    }
    Ok(())
}

fn lit_str(meta: &ParseNestedMeta) -> syn::Result<LitStr> {
    let key = path_name(meta);
    match meta.value()?.parse::<Lit>()? {
        Lit::Str(text) => Ok(text),
        other => Err(syn::Error::new(other.span(), format!("{key} must be a string"))),
    }
}

/// Accepts `flag`, `flag = true`, and `flag = false`.
fn flag(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if !meta.input.peek(syn::Token![=]) {
        return Ok(true);
    }
    let key = path_name(meta);
    match meta.value()?.parse::<Lit>()? {
        Lit::Bool(value) => Ok(value.value),
        other => Err(syn::Error::new(other.span(), format!("{key} must be a boolean"))),
    }
}

fn path_name(meta: &ParseNestedMeta) -> String {
    meta.path
        .get_ident()
        .map_or_else(|| "option".to_owned(), ToString::to_string)
}
