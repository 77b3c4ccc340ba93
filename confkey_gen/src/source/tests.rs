//! Tests for source introspection.

use super::*;
use crate::model::{AttributeValue, Marker};
use anyhow::{Context, Result, ensure};
use camino::Utf8PathBuf;
use rstest::rstest;

const KEYS: &str = r#"
use confkey_macros::ConfigurationKey;

#[derive(Debug, Clone, Copy, ConfigurationKey)]
#[configuration(annotation_name = "*Key", producers_for_primitives = true)]
#[property_file_resolver(properties_path = "/etc/db.properties")]
#[pass_annotations(must_use, serde :: Serialize)]
pub enum Db {
    Url,
    #[configuration(default_key)]
    Pool,
    #[configuration(null_value)]
    Unset,
}

#[confkey_macros::configuration_methods]
impl Db {
    #[configuration(validator)]
    pub fn validator(&self) -> fn(&str) -> bool {
        |value| !value.is_empty()
    }

    pub fn helper(&self) {}

    #[configuration(key_string)]
    pub fn key(&self) -> &'static str {
        "db"
    }
}

impl std::fmt::Display for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("db")
    }
}

pub enum Plain { A }
"#;

#[rstest]
fn lowers_annotated_enums() -> Result<()> {
    let found = parse_str("crate::keys", KEYS)?;
    ensure!(found.len() == 1, "expected one declaration, got {found:?}");
    let db = found.first().context("declaration")?;
    ensure!(db.name == "Db" && db.namespace == "crate::keys");
    ensure!(db.kind == DeclarationKind::Enum);

    let constants: Vec<_> = db.constants().map(|c| c.name.as_str()).collect();
    ensure!(constants == ["Url", "Pool", "Unset"]);
    let methods: Vec<_> = db.methods().map(|m| m.name.as_str()).collect();
    ensure!(methods == ["validator", "helper", "key"], "trait methods leak: {methods:?}");
    ensure!(
        db.members
            .iter()
            .find(|member| member.name == "Pool")
            .is_some_and(|member| member.has_marker(Marker::DefaultKey))
    );

    let configuration = db.annotation(CONFIGURATION).context("configuration")?;
    ensure!(configuration.str_value("annotation_name") == Some("*Key"));
    ensure!(configuration.bool_value("producers_for_primitives") == Some(true));
    let resolver = db
        .annotation(PROPERTY_FILE_RESOLVER)
        .context("resolver annotation")?;
    ensure!(resolver.str_value("properties_path") == Some("/etc/db.properties"));
    let passed = db.annotation(PASS_ANNOTATIONS).context("pass annotations")?;
    ensure!(matches!(passed.value("value"), Some(AttributeValue::List(v)) if v.len() == 2));
    Ok(())
}

#[rstest]
fn derive_alone_marks_a_declaration() -> Result<()> {
    let found = parse_str(
        "crate",
        "#[derive(crate::ConfigurationKey)] enum Flags { On, Off }",
    )?;
    let flags = found.first().context("declaration")?;
    ensure!(flags.is_annotated_with(CONFIGURATION));
    ensure!(flags.annotation(PROPERTY_FILE_RESOLVER).is_none());
    Ok(())
}

#[rstest]
fn nested_modules_extend_the_namespace() -> Result<()> {
    let text = r"
        mod settings {
            pub mod network {
                #[configuration]
                pub enum Net { Host }
                impl Net { pub fn host(&self) {} }
            }
        }
        impl Net { pub fn outer(&self) {} }
    ";
    let found = parse_str("crate", text)?;
    let net = found.first().context("declaration")?;
    ensure!(net.namespace == "crate::settings::network");
    let methods: Vec<_> = net.methods().map(|m| m.name.as_str()).collect();
    ensure!(methods == ["host"], "impls from other modules leak: {methods:?}");
    Ok(())
}

#[rstest]
#[case("#[configuration] pub struct Settings { a: u8 }", "struct")]
#[case("#[configuration] pub union Bits { a: u8 }", "union")]
fn non_enums_are_kept_as_other(#[case] text: &str, #[case] kind: &str) -> Result<()> {
    let found = parse_str("crate", text)?;
    let item = found.first().context("declaration")?;
    ensure!(item.kind == DeclarationKind::Other(kind.to_owned()));
    Ok(())
}

#[rstest]
fn tuple_variants_are_rejected() {
    let err = parse_str("crate", "#[configuration] enum Bad { A(u8) }").expect_err("invalid");
    assert_eq!(err.to_string(), "configuration keys must be unit variants");
}

#[rstest]
fn parse_errors_carry_locations() {
    let mut set = SourceSet::new();
    let err = set
        .add_source(Utf8Path::new("src/keys.rs"), "crate::keys", "enum {}")
        .expect_err("invalid Rust");
    let BuildError::Parse { path, message } = err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(path, "src/keys.rs");
    assert!(message.starts_with("1:"), "missing location in {message}");
}

#[rstest]
fn load_reads_through_the_filesystem() -> Result<()> {
    let tempdir = tempfile::tempdir().context("create temp dir")?;
    let path = Utf8PathBuf::from_path_buf(tempdir.path().join("keys.rs"))
        .map_err(|p| anyhow::anyhow!("non-UTF-8 path {}", p.display()))?;
    std::fs::write(&path, KEYS)?;

    let mut set = SourceSet::new();
    set.load(&path, "crate::keys")?;
    ensure!(set.declarations_annotated_with(CONFIGURATION).len() == 1);
    ensure!(set.declarations_annotated_with(PROPERTY_FILE_RESOLVER).len() == 1);
    ensure!(set.declarations_annotated_with("unknown").is_empty());

    let missing = set.load(&path.with_file_name("absent.rs"), "crate");
    ensure!(matches!(missing, Err(BuildError::Io { .. })));
    Ok(())
}

#[rstest]
fn pass_through_literals_keep_their_spacing() -> Result<()> {
    let text = r#"
        #[derive(ConfigurationKey)]
        #[pass_annotations(doc = "hello  world", serde :: Serialize)]
        pub enum Db { Url }
    "#;
    let found = parse_str("crate", text)?;
    let db = found.first().context("declaration")?;
    let passed = crate::scan::passed_annotations(db);
    ensure!(
        passed == [r#"doc = "hello  world""#, "serde::Serialize"],
        "unexpected pass-through entries {passed:?}"
    );
    Ok(())
}

#[rstest]
#[case("")]
#[case("  ")]
fn empty_module_paths_default_to_the_crate_root(#[case] module_path: &str) -> Result<()> {
    let mut set = SourceSet::new();
    set.add_source(
        Utf8Path::new("src/lib.rs"),
        module_path,
        "#[configuration] pub enum Db { Url } mod net { #[configuration] pub enum Net { Host } }",
    )?;
    let namespaces: Vec<_> = set
        .into_declarations()
        .into_iter()
        .map(|declaration| declaration.namespace)
        .collect();
    ensure!(namespaces == ["crate", "crate::net"], "{namespaces:?}");
    Ok(())
}
