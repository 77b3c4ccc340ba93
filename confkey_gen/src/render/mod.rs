//! Template rendering for generated artifacts.
//!
//! The built-in templates ship inside the crate. When
//! [`EngineSettings::template_dir`] is set, a template of the same name in
//! that directory takes precedence.

use std::io;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use minijinja::{AutoEscape, Environment, ErrorKind};
use thiserror::Error;

use crate::error::{BuildError, GenerationError};
use crate::properties::PropertyMap;
use crate::request::{
    CONFIGURATION_BEAN_TEMPLATE, CONFIGURATION_RESOLVER_TEMPLATE, CONFIGURATION_TEMPLATE,
};
use crate::settings::EngineSettings;

/// Templates embedded in the crate, by resource name.
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        CONFIGURATION_TEMPLATE,
        include_str!("../../templates/Configuration.rs.jinja"),
    ),
    (
        CONFIGURATION_BEAN_TEMPLATE,
        include_str!("../../templates/ConfigurationBean.rs.jinja"),
    ),
    (
        CONFIGURATION_RESOLVER_TEMPLATE,
        include_str!("../../templates/ConfigurationResolver.rs.jinja"),
    ),
];

/// Returns the built-in template called `name`.
#[must_use]
pub fn builtin_template(name: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, text)| *text)
}

/// Failures raised while rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template of that name exists.
    #[error("template not found")]
    Missing {
        /// Requested resource name.
        name: String,
    },

    /// The engine rejected the template or its parameters.
    #[error(transparent)]
    Engine(#[from] minijinja::Error),
}

impl RenderError {
    /// Converts the failure into a per-declaration generation error.
    #[must_use]
    pub fn into_generation_error(self, template: &str) -> GenerationError {
        GenerationError::Template {
            template: template.to_owned(),
            detail: self.to_string(),
        }
    }
}

/// Renders a named template with a parameter map.
pub trait TemplateRenderer {
    /// Renders `template` with `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Missing`] for unknown templates and
    /// [`RenderError::Engine`] for syntax or evaluation failures.
    fn render(&self, template: &str, context: &PropertyMap) -> Result<String, RenderError>;
}

/// `minijinja`-backed renderer.
#[derive(Debug)]
pub struct JinjaRenderer {
    env: Environment<'static>,
}

impl JinjaRenderer {
    /// Builds a renderer from engine settings.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] when the template directory cannot be
    /// opened.
    pub fn new(settings: &EngineSettings) -> Result<Self, BuildError> {
        let overrides = settings
            .template_dir
            .as_deref()
            .map(open_template_dir)
            .transpose()?;
        Ok(Self::build(settings, overrides))
    }

    /// Renderer using the default settings and built-in templates only.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::build(&EngineSettings::default(), None)
    }

    fn build(settings: &EngineSettings, overrides: Option<Dir>) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(settings.trim_blocks);
        env.set_lstrip_blocks(settings.lstrip_blocks);
        env.set_keep_trailing_newline(settings.keep_trailing_newline);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("rust_string", rust_string);
        env.set_loader(move |name| load_template(overrides.as_ref(), name));
        Self { env }
    }
}

impl TemplateRenderer for JinjaRenderer {
    fn render(&self, template: &str, context: &PropertyMap) -> Result<String, RenderError> {
        let compiled = self.env.get_template(template).map_err(|err| {
            if err.kind() == ErrorKind::TemplateNotFound {
                RenderError::Missing {
                    name: template.to_owned(),
                }
            } else {
                RenderError::Engine(err)
            }
        })?;
        Ok(compiled.render(context)?)
    }
}

fn open_template_dir(path: &Utf8Path) -> Result<Dir, BuildError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_template(overrides: Option<&Dir>, name: &str) -> Result<Option<String>, minijinja::Error> {
    if let Some(dir) = overrides {
        match dir.read_to_string(name) {
            Ok(text) => {
                tracing::debug!(template = name, "using template override");
                return Ok(Some(text));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("cannot read template override {name}"),
                )
                .with_source(err));
            }
        }
    }
    Ok(builtin_template(name).map(str::to_owned))
}

/// Renders `value` as a Rust string literal.
fn rust_string(value: &str) -> String {
    format!("{value:?}")
}
