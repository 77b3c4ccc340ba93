//! Generation requests derived from annotated declarations.
//!
//! A [`GenerationRequest`] is everything a round needs to emit the artifacts
//! for one enum: resolved names, marker references, and the optional
//! property-file settings. It is built once per declaration and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::model::{CONFIGURATION, Declaration, DeclarationKind, PROPERTY_FILE_RESOLVER};
use crate::naming;
use crate::scan::{self, Metadata};

/// Template rendering the typed key handle.
pub const CONFIGURATION_TEMPLATE: &str = "Configuration.rs.jinja";
/// Template rendering the configuration bean.
pub const CONFIGURATION_BEAN_TEMPLATE: &str = "ConfigurationBean.rs.jinja";
/// Template rendering the property-file resolver.
pub const CONFIGURATION_RESOLVER_TEMPLATE: &str = "ConfigurationResolver.rs.jinja";

/// Annotation type name used when names are not configurable.
pub const FIXED_ANNOTATION_NAME: &str = "Configuration";
/// Bean name used when names are not configurable.
pub const FIXED_CONFIGURATION_BEAN_NAME: &str = "ConfigurationBean";
/// Suffix of the generated resolver's name.
pub const RESOLVER_SUFFIX: &str = "PropertyFileConfigurationResolver";

/// Attribute keys recognised on the annotations.
pub mod keys {
    /// Template for the annotation type's name.
    pub const ANNOTATION_NAME: &str = "annotation_name";
    /// Template for the bean's name.
    pub const CONFIGURATION_BEAN_NAME: &str = "configuration_bean_name";
    /// Whether typed producers are generated for primitive values.
    pub const PRODUCERS_FOR_PRIMITIVES: &str = "producers_for_primitives";
    /// Default location of the property file.
    pub const PROPERTIES_PATH: &str = "properties_path";
    /// Template for the environment variable overriding the path.
    pub const SYSTEM_PROPERTY_NAME: &str = "system_property_name";
}

/// Generator feature sets.
///
/// `Minimal` emits fixed names for a single declaration; `Rich` enables
/// every configurable capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSet {
    /// Fixed artifact names, no resolver, one declaration per round.
    Minimal,
    /// Configurable names and property-file resolvers, plus pass-through
    /// annotations and primitive producers.
    #[default]
    Rich,
}

impl FeatureSet {
    /// Capabilities enabled by this feature set.
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Minimal => Capabilities {
                custom_names: false,
                pass_through_annotations: false,
                primitive_producers: false,
                property_file_resolver: false,
                single_declaration: true,
            },
            Self::Rich => Capabilities {
                custom_names: true,
                pass_through_annotations: true,
                primitive_producers: true,
                property_file_resolver: true,
                single_declaration: false,
            },
        }
    }
}

/// Optional generator capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(
    clippy::struct_excessive_bools,
    reason = "each flag is an independent capability"
)]
pub struct Capabilities {
    /// `annotation_name` and `configuration_bean_name` are honoured.
    pub custom_names: bool,
    /// `pass_annotations(...)` entries are copied onto the bean.
    pub pass_through_annotations: bool,
    /// `producers_for_primitives` is honoured.
    pub primitive_producers: bool,
    /// `property_file_resolver(...)` emits a resolver artifact.
    pub property_file_resolver: bool,
    /// More than one matched declaration per round is reported.
    pub single_declaration: bool,
}

/// Artifact kinds emitted per declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Typed key handle.
    Annotation,
    /// Configuration bean.
    Bean,
    /// Property-file resolver.
    Resolver,
}

impl ArtifactKind {
    /// Template resource rendering this artifact.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::Annotation => CONFIGURATION_TEMPLATE,
            Self::Bean => CONFIGURATION_BEAN_TEMPLATE,
            Self::Resolver => CONFIGURATION_RESOLVER_TEMPLATE,
        }
    }
}

/// One file to render and emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// What the file contains.
    pub kind: ArtifactKind,
    /// Fully qualified name of the generated type.
    pub qualified_name: String,
}

/// Resolved parameters for one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Simple name of the enum.
    pub enum_name: String,
    /// Module path enclosing the enum.
    pub namespace: String,
    /// Enum constants in declaration order.
    pub constants: Vec<String>,
    /// Resolved annotation type name.
    pub annotation_name: String,
    /// Resolved bean name.
    pub configuration_bean_name: String,
    /// Default property-file path.
    pub properties_path: Option<String>,
    /// Environment variable overriding the property-file path.
    pub system_property_name: Option<String>,
    /// Call reference returning the validator.
    pub validator: Option<String>,
    /// Default key constant.
    pub default_key: String,
    /// Call reference returning the key string.
    pub key_string: Option<String>,
    /// Null-value constant.
    pub null_value: Option<String>,
    /// Bare qualified names of annotations copied onto the bean.
    pub passed_annotations: Vec<String>,
    /// Whether typed primitive producers are generated.
    pub producers_for_primitives: bool,
    /// Whether the property-file resolver is emitted.
    pub generate_resolver: bool,
    /// Feature set the request was built under.
    pub features: FeatureSet,
}

impl GenerationRequest {
    /// Builds the request for `declaration` under `features`.
    ///
    /// # Errors
    ///
    /// Returns a structural error for non-enums and empty enums, whatever
    /// else the declaration carries. Otherwise returns
    /// [`GenerationError::InvalidParameter`] for malformed name templates or
    /// a resolver without a path.
    pub fn from_declaration(
        declaration: &Declaration,
        features: FeatureSet,
    ) -> Result<Self, GenerationError> {
        if let DeclarationKind::Other(kind) = &declaration.kind {
            return Err(GenerationError::NotAnEnumeration {
                name: declaration.name.clone(),
                kind: kind.clone(),
            });
        }
        let metadata = scan::scan(declaration);
        let default_key = scan::default_key(declaration, &metadata)?;
        let capabilities = features.capabilities();
        let configuration = declaration.annotation(CONFIGURATION);
        let class_name = declaration.name.as_str();

        let (annotation_name, configuration_bean_name) = if capabilities.custom_names {
            let annotation_template = configuration
                .and_then(|a| a.str_value(keys::ANNOTATION_NAME))
                .unwrap_or(naming::DEFAULT_ANNOTATION_NAME);
            let bean_template = configuration
                .and_then(|a| a.str_value(keys::CONFIGURATION_BEAN_NAME))
                .unwrap_or(naming::DEFAULT_CONFIGURATION_BEAN_NAME);
            (
                naming::annotation_name(class_name, Some(annotation_template))?,
                naming::configuration_bean_name(class_name, Some(bean_template))?,
            )
        } else {
            (
                FIXED_ANNOTATION_NAME.to_owned(),
                FIXED_CONFIGURATION_BEAN_NAME.to_owned(),
            )
        };

        let producers_for_primitives = capabilities.primitive_producers
            && configuration
                .and_then(|a| a.bool_value(keys::PRODUCERS_FOR_PRIMITIVES))
                .unwrap_or(false);

        let (properties_path, system_property_name, generate_resolver) =
            property_file_settings(declaration, capabilities)?;
        let Metadata {
            validator,
            key_string,
            null_value,
            passed_annotations,
            ..
        } = metadata;

        Ok(Self {
            enum_name: declaration.name.clone(),
            namespace: declaration.namespace.clone(),
            constants: declaration.constants().map(|c| c.name.clone()).collect(),
            annotation_name,
            configuration_bean_name,
            properties_path,
            system_property_name,
            validator: validator.map(|found| found.reference()),
            default_key,
            key_string: key_string.map(|found| found.reference()),
            null_value: null_value.map(|found| found.reference()),
            passed_annotations: if capabilities.pass_through_annotations {
                passed_annotations
            } else {
                Vec::new()
            },
            producers_for_primitives,
            generate_resolver,
            features,
        })
    }

    /// Joins the namespace and `simple_name`.
    #[must_use]
    pub fn qualify(&self, simple_name: &str) -> String {
        if self.namespace.is_empty() {
            simple_name.to_owned()
        } else {
            format!("{}::{simple_name}", self.namespace)
        }
    }

    /// Simple name of the generated resolver.
    #[must_use]
    pub fn resolver_name(&self) -> String {
        format!("{}{RESOLVER_SUFFIX}", self.enum_name)
    }

    /// Artifacts to emit, in emission order.
    #[must_use]
    pub fn artifacts(&self) -> Vec<Artifact> {
        let mut artifacts = vec![
            Artifact {
                kind: ArtifactKind::Annotation,
                qualified_name: self.qualify(&self.annotation_name),
            },
            Artifact {
                kind: ArtifactKind::Bean,
                qualified_name: self.qualify(&self.configuration_bean_name),
            },
        ];
        if self.generate_resolver {
            artifacts.push(Artifact {
                kind: ArtifactKind::Resolver,
                qualified_name: self.qualify(&self.resolver_name()),
            });
        }
        artifacts
    }
}

type PropertyFileSettings = (Option<String>, Option<String>, bool);

fn property_file_settings(
    declaration: &Declaration,
    capabilities: Capabilities,
) -> Result<PropertyFileSettings, GenerationError> {
    let inline_path = declaration
        .annotation(CONFIGURATION)
        .and_then(|a| a.str_value(keys::PROPERTIES_PATH))
        .map(str::to_owned);
    let Some(resolver) = declaration.annotation(PROPERTY_FILE_RESOLVER) else {
        return Ok((inline_path, None, false));
    };
    let Some(path) = resolver.str_value(keys::PROPERTIES_PATH) else {
        return Err(GenerationError::invalid_parameter(
            "property_file_resolver requires a properties_path",
        ));
    };
    if !capabilities.property_file_resolver {
        return Ok((Some(path.to_owned()), None, false));
    }
    let system_property_name = naming::system_property_name(
        &declaration.name,
        resolver.str_value(keys::SYSTEM_PROPERTY_NAME),
    );
    Ok((Some(path.to_owned()), Some(system_property_name), true))
}

#[cfg(test)]
mod tests;
