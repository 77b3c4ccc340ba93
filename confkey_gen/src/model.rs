//! Declaration model consumed by the generation pipeline.
//!
//! The pipeline never touches `syn` types directly. Source introspection
//! lowers annotated items into these plain values so the scanner, the name
//! resolver, and the driver can be exercised without parsing any Rust.

use std::fmt;

/// Attribute that marks an enum as a configuration key space.
pub const CONFIGURATION: &str = "configuration";
/// Attribute that requests a property-file-backed resolver.
pub const PROPERTY_FILE_RESOLVER: &str = "property_file_resolver";
/// Multi-value attribute listing annotations copied onto the bean.
pub const PASS_ANNOTATIONS: &str = "pass_annotations";

/// Kind of item an annotated declaration was attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationKind {
    /// A fixed set of named constants.
    Enum,
    /// Any other item, named by its keyword (`struct`, `union`, ...).
    Other(String),
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum => f.write_str("enum"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

/// Role a marker sub-attribute assigns to a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Method returning the predicate used to validate values.
    Validator,
    /// Constant used when a handle is created without an explicit key.
    DefaultKey,
    /// Method returning the lookup string for a key.
    KeyString,
    /// Constant standing for "no key".
    NullValue,
}

impl Marker {
    /// Parses the marker keyword used inside `#[configuration(...)]`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "validator" => Some(Self::Validator),
            "default_key" => Some(Self::DefaultKey),
            "key_string" => Some(Self::KeyString),
            "null_value" => Some(Self::NullValue),
            _ => None,
        }
    }

    /// Returns the keyword spelling of the marker.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Validator => "validator",
            Self::DefaultKey => "default_key",
            Self::KeyString => "key_string",
            Self::NullValue => "null_value",
        }
    }

    /// Member kind the marker applies to.
    #[must_use]
    pub const fn member_kind(self) -> MemberKind {
        match self {
            Self::Validator | Self::KeyString => MemberKind::Method,
            Self::DefaultKey | Self::NullValue => MemberKind::Constant,
        }
    }
}

/// Kind of an enclosed member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// An enum variant.
    Constant,
    /// A method from an inherent impl block.
    Method,
}

/// A member enclosed by a declaration, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Simple name of the member.
    pub name: String,
    /// Whether the member is a constant or a method.
    pub kind: MemberKind,
    /// Marker sub-attributes attached to the member.
    pub markers: Vec<Marker>,
}

impl Member {
    /// Creates an unmarked constant.
    #[must_use]
    pub fn constant(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Constant,
            markers: Vec::new(),
        }
    }

    /// Creates an unmarked method.
    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            markers: Vec::new(),
        }
    }

    /// Attaches `marker` to the member.
    #[must_use]
    pub fn marked(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Reports whether the member carries `marker`.
    #[must_use]
    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }
}

/// Value of a single annotation attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// String literal.
    Str(String),
    /// Boolean literal.
    Bool(bool),
    /// Path or type reference, rendered as source text.
    Path(String),
    /// Ordered list of values.
    List(Vec<AttributeValue>),
}

/// An annotation attached to a declaration together with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Attribute name, for example `configuration`.
    pub name: String,
    /// Attribute values in source order. List-style annotations store their
    /// entries under `value`.
    pub attributes: Vec<(String, AttributeValue)>,
}

impl Annotation {
    /// Creates an annotation without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.push((key.into(), value));
        self
    }

    /// Returns the first value stored under `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Returns a string attribute.
    #[must_use]
    pub fn str_value(&self, key: &str) -> Option<&str> {
        match self.value(key) {
            Some(AttributeValue::Str(text)) => Some(text),
            _ => None,
        }
    }

    /// Returns a boolean attribute.
    #[must_use]
    pub fn bool_value(&self, key: &str) -> Option<bool> {
        match self.value(key) {
            Some(AttributeValue::Bool(flag)) => Some(*flag),
            _ => None,
        }
    }
}

/// An annotated source declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Simple name of the declared type.
    pub name: String,
    /// Enclosing module path, for example `crate::keys`.
    pub namespace: String,
    /// Kind of item the annotations were attached to.
    pub kind: DeclarationKind,
    /// Enclosed members in declaration order.
    pub members: Vec<Member>,
    /// Annotations attached to the declaration.
    pub annotations: Vec<Annotation>,
}

impl Declaration {
    /// Creates an enum declaration with no members or annotations.
    #[must_use]
    pub fn enumeration(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            kind: DeclarationKind::Enum,
            members: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Adds a member.
    #[must_use]
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Adds an annotation.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns the attached annotation called `name`, if any.
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|annotation| annotation.name == name)
    }

    /// Reports whether an annotation called `name` is attached.
    #[must_use]
    pub fn is_annotated_with(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }

    /// Iterates over the enum constants in declaration order.
    pub fn constants(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|member| member.kind == MemberKind::Constant)
    }

    /// Iterates over the methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|member| member.kind == MemberKind::Method)
    }

    /// Joins the namespace and `simple_name` into a qualified name.
    #[must_use]
    pub fn qualify(&self, simple_name: &str) -> String {
        if self.namespace.is_empty() {
            simple_name.to_owned()
        } else {
            format!("{}::{simple_name}", self.namespace)
        }
    }
}
