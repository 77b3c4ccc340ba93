//! Ordered property maps handed to the template renderer.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::request::GenerationRequest;

/// Identifies the generator in emitted file headers.
pub const GENERATOR_NAME: &str = "confkey_gen::driver::ConfigurationGenerator";

/// Parameter names understood by the templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// Generator identification.
    GeneratorName,
    /// Simple name of the enum.
    EnumClass,
    /// Module path of the enum.
    PackageName,
    /// Enum constants in declaration order.
    Constants,
    /// Attribute paths applied to the bean.
    PassedAnnotations,
    /// Whether primitive producers are generated.
    ProducersForPrimitives,
    /// Annotation type name.
    AnnotationName,
    /// Bean name.
    ConfigurationBeanName,
    /// Validator call reference.
    Validator,
    /// Default property-file path.
    PropertiesPath,
    /// Path override variable.
    SystemPropertyName,
    /// Key-string call reference.
    KeyString,
    /// Default key constant.
    DefaultKey,
    /// Null-value constant.
    NullValue,
}

impl PropertyKey {
    /// Name the templates use for this parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GeneratorName => "generator_name",
            Self::EnumClass => "enum_class",
            Self::PackageName => "package_name",
            Self::Constants => "constants",
            Self::PassedAnnotations => "passed_annotations",
            Self::ProducersForPrimitives => "producers_for_primitives",
            Self::AnnotationName => "annotation_name",
            Self::ConfigurationBeanName => "configuration_bean_name",
            Self::Validator => "validator",
            Self::PropertiesPath => "properties_path",
            Self::SystemPropertyName => "system_property_name",
            Self::KeyString => "key_string",
            Self::DefaultKey => "default_key",
            Self::NullValue => "null_value",
        }
    }
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Text value.
    Str(String),
    /// Flag value.
    Bool(bool),
    /// Ordered list of text values.
    List(Vec<String>),
}

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(text) => serializer.serialize_str(text),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Insertion-ordered generation parameters.
///
/// Serialises as a map so template engines see plain named variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: Vec<(PropertyKey, PropertyValue)>,
}

impl PropertyMap {
    /// Builds the map for `request`.
    ///
    /// Required parameters are always present; optional ones only when the
    /// request carries them.
    #[must_use]
    pub fn from_request(request: &GenerationRequest) -> Self {
        let mut map = Self::default();
        map.push(PropertyKey::GeneratorName, text(GENERATOR_NAME));
        map.push(PropertyKey::EnumClass, text(&request.enum_name));
        map.push(PropertyKey::PackageName, text(&request.namespace));
        map.push(
            PropertyKey::Constants,
            PropertyValue::List(request.constants.clone()),
        );
        map.push(
            PropertyKey::PassedAnnotations,
            PropertyValue::List(request.passed_annotations.clone()),
        );
        map.push(
            PropertyKey::ProducersForPrimitives,
            PropertyValue::Bool(request.producers_for_primitives),
        );
        map.push(PropertyKey::AnnotationName, text(&request.annotation_name));
        map.push(
            PropertyKey::ConfigurationBeanName,
            text(&request.configuration_bean_name),
        );
        map.push_optional(PropertyKey::Validator, request.validator.as_deref());
        map.push_optional(
            PropertyKey::PropertiesPath,
            request.properties_path.as_deref(),
        );
        map.push_optional(
            PropertyKey::SystemPropertyName,
            request.system_property_name.as_deref(),
        );
        map.push_optional(PropertyKey::KeyString, request.key_string.as_deref());
        map.push(PropertyKey::DefaultKey, text(&request.default_key));
        map.push_optional(PropertyKey::NullValue, request.null_value.as_deref());
        map
    }

    fn push(&mut self, key: PropertyKey, value: PropertyValue) {
        self.entries.push((key, value));
    }

    fn push_optional(&mut self, key: PropertyKey, value: Option<&str>) {
        if let Some(found) = value {
            self.push(key, text(found));
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: PropertyKey) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    /// Returns a text value stored under `key`.
    #[must_use]
    pub fn get_str(&self, key: PropertyKey) -> Option<&str> {
        match self.get(key) {
            Some(PropertyValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    /// Iterates over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &PropertyValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    /// Parameter names in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    /// Number of parameters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the map holds no parameters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn text(value: &str) -> PropertyValue {
    PropertyValue::Str(value.to_owned())
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}
