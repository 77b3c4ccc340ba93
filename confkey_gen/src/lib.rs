//! Build-time generator for typed configuration keys.
//!
//! An enum marked with `#[derive(ConfigurationKey)]` (from `confkey_macros`)
//! names a configuration key space. A build script hands the source file to
//! [`Builder`], which parses it, resolves the generated type names, and
//! writes three companions into `OUT_DIR`:
//!
//! - a key handle wrapping one variant (`<Enum>Config` by default);
//! - a bean holding the configured values (`<Enum>ConfigBean`);
//! - with `#[property_file_resolver(...)]`, a resolver that loads the bean
//!   from a property file.
//!
//! The crate then `include!`s the generated files next to the enum.
//!
//! The pipeline is usable without Cargo: [`driver::ConfigurationGenerator`]
//! runs a round over plain [`model::Declaration`] values against any
//! [`render::TemplateRenderer`], [`emit::Filer`], and
//! [`diagnostics::DiagnosticSink`].

pub mod builder;
pub mod diagnostics;
pub mod driver;
pub mod emit;
pub mod error;
pub mod model;
pub mod naming;
pub mod properties;
pub mod render;
pub mod request;
pub mod scan;
pub mod settings;
pub mod source;

pub use builder::{Builder, Report};
pub use error::{BuildError, GenerationError};
pub use request::FeatureSet;
