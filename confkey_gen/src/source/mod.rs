//! Source introspection backed by `syn`.
//!
//! Files are parsed before macro expansion, so the marker attributes that
//! `confkey_macros` later strips are still visible. Every enum that derives
//! `ConfigurationKey` or carries `#[configuration(...)]` is lowered into a
//! [`Declaration`]; structs and unions carrying the attribute are kept as
//! [`DeclarationKind::Other`] so the driver can reject them.

mod attrs;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use syn::{Attribute, Fields, ImplItem, Item, ItemEnum, ItemImpl, Type};

use crate::error::BuildError;
use crate::model::{
    Annotation, CONFIGURATION, Declaration, DeclarationKind, Member, MemberKind, PASS_ANNOTATIONS,
    PROPERTY_FILE_RESOLVER,
};

/// Module path used when a source is registered without one.
pub const CRATE_ROOT: &str = "crate";

/// Declarations collected from one or more source files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    declarations: Vec<Declaration>,
}

impl SourceSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            declarations: Vec::new(),
        }
    }

    /// Reads and parses `path` as the module `module_path`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] when the file cannot be read and
    /// [`BuildError::Parse`] when it is not valid Rust or carries malformed
    /// configuration attributes.
    pub fn load(&mut self, path: &Utf8Path, module_path: &str) -> Result<&mut Self, BuildError> {
        let text = read_source(path)?;
        self.add_source(path, module_path, &text)
    }

    /// Parses `text` as the module `module_path`.
    ///
    /// `origin` only labels parse errors.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Parse`] when `text` is not valid Rust or carries
    /// malformed configuration attributes.
    pub fn add_source(
        &mut self,
        origin: &Utf8Path,
        module_path: &str,
        text: &str,
    ) -> Result<&mut Self, BuildError> {
        let found = parse_str(module_path, text).map_err(|err| {
            let start = err.span().start();
            BuildError::Parse {
                path: origin.to_path_buf(),
                message: format!("{}:{}: {err}", start.line, start.column + 1),
            }
        })?;
        tracing::debug!(
            path = %origin,
            module = module_path,
            declarations = found.len(),
            "parsed configuration source"
        );
        self.declarations.extend(found);
        Ok(self)
    }

    /// Every collected declaration, in source order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Declarations carrying the annotation called `name`.
    #[must_use]
    pub fn declarations_annotated_with(&self, name: &str) -> Vec<&Declaration> {
        self.declarations
            .iter()
            .filter(|declaration| declaration.is_annotated_with(name))
            .collect()
    }

    /// Consumes the set, returning the declarations.
    #[must_use]
    pub fn into_declarations(self) -> Vec<Declaration> {
        self.declarations
    }
}

/// Parses `text` as the module `module_path` and lowers its declarations.
///
/// An empty module path stands for the crate root.
///
/// # Errors
///
/// Returns the `syn` error for invalid Rust or malformed configuration
/// attributes.
pub fn parse_str(module_path: &str, text: &str) -> syn::Result<Vec<Declaration>> {
    let file = syn::parse_file(text)?;
    let root = match module_path.trim() {
        "" => CRATE_ROOT,
        trimmed => trimmed,
    };
    let mut found = Vec::new();
    collect_module(root, &file.items, &mut found)?;
    Ok(found)
}

fn read_source(path: &Utf8Path) -> Result<String, BuildError> {
    let io_error = |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        io_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "source path has no file name",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
    dir.read_to_string(file_name).map_err(io_error)
}

fn collect_module(namespace: &str, items: &[Item], found: &mut Vec<Declaration>) -> syn::Result<()> {
    let first = found.len();
    for entry in items {
        match entry {
            Item::Enum(item) if is_declaration(&item.attrs)? => {
                found.push(lower_enum(namespace, item)?);
            }
            Item::Struct(item) if is_declaration(&item.attrs)? => {
                found.push(other(namespace, &item.ident, "struct", &item.attrs)?);
            }
            Item::Union(item) if is_declaration(&item.attrs)? => {
                found.push(other(namespace, &item.ident, "union", &item.attrs)?);
            }
            _ => {}
        }
    }

    for entry in items {
        if let Item::Impl(block) = entry {
            attach_methods(block, found.get_mut(first..).unwrap_or_default())?;
        }
    }

    for entry in items {
        if let Item::Mod(module) = entry
            && let Some((_, nested)) = &module.content
        {
            let path = if namespace.is_empty() {
                module.ident.to_string()
            } else {
                format!("{namespace}::{}", module.ident)
            };
            collect_module(&path, nested, found)?;
        }
    }
    Ok(())
}

fn is_declaration(item_attrs: &[Attribute]) -> syn::Result<bool> {
    Ok(item_attrs.iter().any(|attr| attr.path().is_ident(CONFIGURATION))
        || attrs::derives_configuration_key(item_attrs)?)
}

fn annotations(item_attrs: &[Attribute]) -> syn::Result<Vec<Annotation>> {
    let mut found = Vec::new();
    found.push(
        attrs::annotation(item_attrs, CONFIGURATION)?
            .unwrap_or_else(|| Annotation::new(CONFIGURATION)),
    );
    for name in [PROPERTY_FILE_RESOLVER, PASS_ANNOTATIONS] {
        found.extend(attrs::annotation(item_attrs, name)?);
    }
    Ok(found)
}

fn lower_enum(namespace: &str, item: &ItemEnum) -> syn::Result<Declaration> {
    let mut declaration = Declaration::enumeration(namespace, item.ident.to_string());
    declaration.annotations = annotations(&item.attrs)?;
    for variant in &item.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "configuration keys must be unit variants",
            ));
        }
        let mut member = Member::constant(variant.ident.to_string());
        member.markers = attrs::markers(&variant.attrs, MemberKind::Constant)?;
        declaration.members.push(member);
    }
    Ok(declaration)
}

fn other(
    namespace: &str,
    ident: &syn::Ident,
    kind: &str,
    item_attrs: &[Attribute],
) -> syn::Result<Declaration> {
    let mut declaration = Declaration::enumeration(namespace, ident.to_string());
    declaration.kind = DeclarationKind::Other(kind.to_owned());
    declaration.annotations = annotations(item_attrs)?;
    Ok(declaration)
}

fn attach_methods(block: &ItemImpl, declarations: &mut [Declaration]) -> syn::Result<()> {
    if block.trait_.is_some() {
        return Ok(());
    }
    let Type::Path(self_ty) = block.self_ty.as_ref() else {
        return Ok(());
    };
    let Some(name) = self_ty.path.get_ident() else {
        return Ok(());
    };
    let Some(declaration) = declarations
        .iter_mut()
        .find(|declaration| declaration.kind == DeclarationKind::Enum && *name == declaration.name)
    else {
        return Ok(());
    };
    for item in &block.items {
        if let ImplItem::Fn(method) = item {
            let mut member = Member::method(method.sig.ident.to_string());
            member.markers = attrs::markers(&method.attrs, MemberKind::Method)?;
            declaration.members.push(member);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
