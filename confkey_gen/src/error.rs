//! Error types for `confkey_gen`.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Failures raised while generating code for a single declaration.
///
/// None of these escape a round: the driver turns each one into an error
/// diagnostic attached to the offending declaration.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The annotated item is not an enum.
    #[error("Code generation is supported only on enum types")]
    NotAnEnumeration {
        /// Simple name of the rejected item.
        name: String,
        /// Item keyword, for example `struct`.
        kind: String,
    },

    /// The enum declares no constants, so no default key exists.
    #[error("Enum with no constants")]
    EmptyEnumeration {
        /// Simple name of the empty enum.
        name: String,
    },

    /// A name template or base name failed validation.
    #[error("{message}")]
    InvalidParameter {
        /// Human-readable description naming the offending parameter.
        message: String,
    },

    /// A template could not be found or rendered.
    #[error("Error rendering template {template}: {detail}")]
    Template {
        /// Template resource name.
        template: String,
        /// Engine-provided failure detail.
        detail: String,
    },

    /// Creating or writing an output file failed.
    #[error("Error creating files: {qualified_name}: {source}")]
    Emission {
        /// Qualified name of the artifact being written.
        qualified_name: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of generation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Not an enum, or an enum without constants.
    Structural,
    /// A name template or base name is malformed.
    NamingValidation,
    /// Template lookup or rendering failed.
    Template,
    /// Output file creation or writing failed.
    EmissionIo,
    /// More than one declaration matched where only one is supported.
    Multiplicity,
}

impl GenerationError {
    /// Builds a [`GenerationError::InvalidParameter`] from a message.
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Classifies the failure.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NotAnEnumeration { .. } | Self::EmptyEnumeration { .. } => {
                ErrorCategory::Structural
            }
            Self::InvalidParameter { .. } => ErrorCategory::NamingValidation,
            Self::Template { .. } => ErrorCategory::Template,
            Self::Emission { .. } => ErrorCategory::EmissionIo,
        }
    }

    /// Message reported to the diagnostic sink.
    ///
    /// Naming failures carry an `Invalid parameters: ` prefix.
    #[must_use]
    pub fn diagnostic_message(&self) -> String {
        match self {
            Self::InvalidParameter { message } => format!("Invalid parameters: {message}"),
            other => other.to_string(),
        }
    }
}

/// Failures surfaced by the build-script facade.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Reading a source file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A source file is not valid Rust.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path of the rejected file.
        path: Utf8PathBuf,
        /// Parser message including the location.
        message: String,
    },

    /// Settings could not be loaded or extracted.
    #[error("failed to load generator settings: {0}")]
    Settings(#[from] Box<figment::Error>),

    /// A required environment variable is not set.
    #[error("environment variable {0} is not set; run from a build script or use Builder::new")]
    MissingEnv(&'static str),

    /// The round finished with error diagnostics.
    #[error("configuration generation reported {errors} error(s):\n{summary}")]
    Generation {
        /// Number of error diagnostics.
        errors: usize,
        /// One line per error diagnostic.
        summary: String,
    },
}

impl From<figment::Error> for BuildError {
    fn from(err: figment::Error) -> Self {
        Self::Settings(Box::new(err))
    }
}
