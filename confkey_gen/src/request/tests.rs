//! Tests for request construction under both feature sets.

use super::*;
use crate::error::ErrorCategory;
use crate::model::{Annotation, AttributeValue, Marker, Member, PASS_ANNOTATIONS};
use anyhow::{Result, anyhow, ensure};
use rstest::rstest;

fn configuration(attributes: &[(&str, AttributeValue)]) -> Annotation {
    attributes
        .iter()
        .fold(Annotation::new(CONFIGURATION), |annotation, (key, value)| {
            annotation.with(*key, value.clone())
        })
}

fn string(value: &str) -> AttributeValue {
    AttributeValue::Str(value.to_owned())
}

#[rstest]
fn resolves_default_names_and_marked_default_key() -> Result<()> {
    let declaration = Declaration::enumeration("crate::keys", "Foo")
        .with_member(Member::constant("QUX"))
        .with_member(Member::constant("BAR").marked(Marker::DefaultKey))
        .with_annotation(configuration(&[
            (keys::ANNOTATION_NAME, string("*Config")),
            (keys::CONFIGURATION_BEAN_NAME, string("*ConfigBean")),
        ]));

    let request = GenerationRequest::from_declaration(&declaration, FeatureSet::Rich)
        .map_err(|err| anyhow!(err))?;

    ensure!(request.annotation_name == "FooConfig", "{}", request.annotation_name);
    ensure!(
        request.configuration_bean_name == "FooConfigBean",
        "{}",
        request.configuration_bean_name
    );
    ensure!(request.default_key == "BAR", "{}", request.default_key);
    ensure!(!request.generate_resolver, "no resolver was requested");
    ensure!(request.artifacts().len() == 2, "annotation and bean only");
    Ok(())
}

#[rstest]
fn property_file_resolver_derives_override_variable() -> Result<()> {
    let declaration = Declaration::enumeration("crate::db", "Db")
        .with_member(Member::constant("Url"))
        .with_annotation(Annotation::new(CONFIGURATION))
        .with_annotation(
            Annotation::new(PROPERTY_FILE_RESOLVER)
                .with(keys::PROPERTIES_PATH, string("/etc/db.properties")),
        );

    let request = GenerationRequest::from_declaration(&declaration, FeatureSet::Rich)
        .map_err(|err| anyhow!(err))?;

    ensure!(request.generate_resolver, "resolver should be generated");
    ensure!(request.properties_path.as_deref() == Some("/etc/db.properties"));
    ensure!(request.system_property_name.as_deref() == Some("DbConfigPath"));
    let names: Vec<_> = request
        .artifacts()
        .into_iter()
        .map(|artifact| artifact.qualified_name)
        .collect();
    ensure!(
        names
            == [
                "crate::db::DbConfig",
                "crate::db::DbConfigBean",
                "crate::db::DbPropertyFileConfigurationResolver",
            ],
        "unexpected artifacts {names:?}"
    );
    Ok(())
}

#[rstest]
fn resolver_without_path_is_rejected() {
    let declaration = Declaration::enumeration("crate", "Db")
        .with_member(Member::constant("Url"))
        .with_annotation(Annotation::new(PROPERTY_FILE_RESOLVER));
    let err = GenerationRequest::from_declaration(&declaration, FeatureSet::Rich)
        .expect_err("path is required");
    assert_eq!(err.category(), ErrorCategory::NamingValidation);
}

#[rstest]
fn double_wildcard_is_rejected() {
    let declaration = Declaration::enumeration("crate", "Foo")
        .with_member(Member::constant("A"))
        .with_annotation(configuration(&[(keys::ANNOTATION_NAME, string("*Config*"))]));
    let err = GenerationRequest::from_declaration(&declaration, FeatureSet::Rich)
        .expect_err("template is malformed");
    assert_eq!(err.diagnostic_message(), "Invalid parameters: Invalid annotation_name pattern");
}

#[rstest]
#[case(FeatureSet::Rich)]
#[case(FeatureSet::Minimal)]
fn empty_enumeration_is_structural(#[case] features: FeatureSet) {
    let declaration = Declaration::enumeration("crate", "Empty")
        .with_annotation(configuration(&[(keys::PRODUCERS_FOR_PRIMITIVES, AttributeValue::Bool(true))]));
    let err = GenerationRequest::from_declaration(&declaration, features)
        .expect_err("no constants");
    assert_eq!(err.category(), ErrorCategory::Structural);
    assert_eq!(err.to_string(), "Enum with no constants");
}

#[rstest]
#[case::double_wildcard(configuration(&[(keys::ANNOTATION_NAME, string("*Config*"))]))]
#[case::lone_wildcard(configuration(&[(keys::CONFIGURATION_BEAN_NAME, string("*"))]))]
#[case::resolver_without_path(Annotation::new(PROPERTY_FILE_RESOLVER))]
fn empty_enumeration_wins_over_parameter_faults(#[case] faulty: Annotation) {
    let declaration = Declaration::enumeration("crate", "Empty").with_annotation(faulty);
    let err = GenerationRequest::from_declaration(&declaration, FeatureSet::Rich)
        .expect_err("no constants");
    assert_eq!(err.category(), ErrorCategory::Structural);
    assert_eq!(err.to_string(), "Enum with no constants");
}

#[rstest]
fn non_enum_declarations_are_structural() {
    let mut declaration = Declaration::enumeration("crate", "Settings");
    declaration.kind = DeclarationKind::Other("struct".to_owned());
    let err = GenerationRequest::from_declaration(&declaration, FeatureSet::Rich)
        .expect_err("structs are rejected");
    assert_eq!(err.category(), ErrorCategory::Structural);
    assert_eq!(err.to_string(), "Code generation is supported only on enum types");
}

#[rstest]
fn minimal_features_ignore_rich_attributes() -> Result<()> {
    let declaration = Declaration::enumeration("crate::app", "Keys")
        .with_member(Member::constant("Host"))
        .with_member(Member::constant("Unset").marked(Marker::NullValue))
        .with_annotation(configuration(&[
            (keys::ANNOTATION_NAME, string("*Settings")),
            (keys::PRODUCERS_FOR_PRIMITIVES, AttributeValue::Bool(true)),
            (keys::PROPERTIES_PATH, string("/etc/app.properties")),
        ]))
        .with_annotation(Annotation::new(PASS_ANNOTATIONS).with(
            "value",
            AttributeValue::List(vec![AttributeValue::Path("must_use".to_owned())]),
        ));

    let request = GenerationRequest::from_declaration(&declaration, FeatureSet::Minimal)
        .map_err(|err| anyhow!(err))?;

    ensure!(request.annotation_name == FIXED_ANNOTATION_NAME);
    ensure!(request.configuration_bean_name == FIXED_CONFIGURATION_BEAN_NAME);
    ensure!(!request.producers_for_primitives, "primitives disabled");
    ensure!(request.passed_annotations.is_empty(), "pass-through disabled");
    ensure!(request.properties_path.as_deref() == Some("/etc/app.properties"));
    ensure!(request.null_value.as_deref() == Some("Unset"));
    ensure!(!request.generate_resolver, "resolver disabled");
    Ok(())
}
