//! Attribute parsing for configuration declarations.

use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, Lit, Meta, Token};

use crate::model::{Annotation, AttributeValue, CONFIGURATION, Marker, MemberKind, PASS_ANNOTATIONS};

/// Derive that makes an item a declaration even without `#[configuration]`.
pub(crate) const DERIVE_NAME: &str = "ConfigurationKey";

/// Reports whether `attrs` derive `ConfigurationKey`.
pub(crate) fn derives_configuration_key(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut found = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        let paths = attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)?;
        found |= paths
            .iter()
            .any(|path| path.segments.last().is_some_and(|s| s.ident == DERIVE_NAME));
    }
    Ok(found)
}

/// Lowers the item-level attributes named `name` into one annotation.
///
/// Repeated attributes are merged in source order. Returns `None` when no
/// attribute carries the name.
pub(crate) fn annotation(attrs: &[Attribute], name: &str) -> syn::Result<Option<Annotation>> {
    let mut merged: Option<Annotation> = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(name)) {
        let annotation = merged.get_or_insert_with(|| Annotation::new(name));
        match &attr.meta {
            Meta::Path(_) => {}
            Meta::List(_) if name == PASS_ANNOTATIONS => {
                let entries = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
                let mut values = match annotation.attributes.pop() {
                    Some((_, AttributeValue::List(existing))) => existing,
                    _ => Vec::new(),
                };
                values.extend(entries.iter().map(|entry| AttributeValue::Path(render(entry))));
                annotation
                    .attributes
                    .push(("value".to_owned(), AttributeValue::List(values)));
            }
            Meta::List(_) => {
                attr.parse_nested_meta(|meta| {
                    let key = render(&meta.path);
                    let value = if meta.input.peek(Token![=]) {
                        attribute_value(&key, &meta.value()?.parse::<Expr>()?)?
                    } else if meta.input.peek(syn::token::Paren) {
                        let content;
                        syn::parenthesized!(content in meta.input);
                        let entries = Punctuated::<Meta, Token![,]>::parse_terminated(&content)?;
                        AttributeValue::List(
                            entries.iter().map(|entry| AttributeValue::Path(render(entry))).collect(),
                        )
                    } else {
                        AttributeValue::Bool(true)
                    };
                    annotation.attributes.push((key, value));
                    Ok(())
                })?;
            }
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    format!("use #[{name}(...)] instead of #[{name} = ...]"),
                ));
            }
        }
    }
    Ok(merged)
}

fn attribute_value(key: &str, expr: &Expr) -> syn::Result<AttributeValue> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(text) => Ok(AttributeValue::Str(text.value())),
            Lit::Bool(flag) => Ok(AttributeValue::Bool(flag.value)),
            other => Err(syn::Error::new_spanned(
                other,
                format!("{key} must be a string or a boolean"),
            )),
        },
        Expr::Path(path) => Ok(AttributeValue::Path(render(path))),
        other => Err(syn::Error::new_spanned(
            other,
            format!("{key} must be a string, a boolean or a path"),
        )),
    }
}

/// Parses the marker keywords attached to a member.
pub(crate) fn markers(attrs: &[Attribute], kind: MemberKind) -> syn::Result<Vec<Marker>> {
    let mut found = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(CONFIGURATION)) {
        attr.parse_nested_meta(|meta| {
            let Some(marker) = meta
                .path
                .get_ident()
                .and_then(|ident| Marker::from_keyword(&ident.to_string()))
            else {
                return Err(meta.error("unknown configuration marker"));
            };
            if marker.member_kind() != kind {
                let target = match marker.member_kind() {
                    MemberKind::Constant => "a variant",
                    MemberKind::Method => "a method",
                };
                return Err(meta.error(format!("`{}` marks {target}", marker.keyword())));
            }
            found.push(marker);
            Ok(())
        })?;
    }
    Ok(found)
}

fn render(tokens: &impl ToTokens) -> String {
    tokens.to_token_stream().to_string()
}
