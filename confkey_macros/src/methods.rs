//! `#[configuration_methods]` expansion.

use proc_macro2::TokenStream;
use quote::ToTokens;
use syn::{FnArg, ImplItem, ImplItemFn, ItemImpl};

pub(crate) fn expand(args: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    if !args.is_empty() {
        return Err(syn::Error::new_spanned(
            args,
            "configuration_methods takes no arguments",
        ));
    }
    let mut block: ItemImpl = syn::parse2(item)?;
    if let Some((_, path, _)) = &block.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "configuration_methods applies to inherent impl blocks only",
        ));
    }
    for member in &mut block.items {
        if let ImplItem::Fn(method) = member {
            strip_markers(method)?;
        }
    }
    Ok(block.into_token_stream())
}

fn strip_markers(method: &mut ImplItemFn) -> syn::Result<()> {
    let mut marked = false;
    for attr in method
        .attrs
        .iter()
        .filter(|attr| attr.path().is_ident("configuration"))
    {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("validator") || meta.path.is_ident("key_string") {
                marked = true;
                return Ok(());
            }
            if meta.path.is_ident("default_key") || meta.path.is_ident("null_value") {
                return Err(meta.error("this marker belongs on an enum variant"));
            }
            Err(meta.error("unknown configuration marker"))
        })?;
    }
    if marked && !takes_only_shared_self(method) {
        return Err(syn::Error::new_spanned(
            &method.sig,
            "marked methods must take `&self` and nothing else",
        ));
    }
    method
        .attrs
        .retain(|attr| !attr.path().is_ident("configuration"));
    Ok(())
}

fn takes_only_shared_self(method: &ImplItemFn) -> bool {
    let mut inputs = method.sig.inputs.iter();
    let receiver_ok = matches!(
        inputs.next(),
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none()
    );
    receiver_ok && inputs.next().is_none()
}
