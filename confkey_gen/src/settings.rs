//! Generator and template-engine settings.
//!
//! Settings are layered with `figment`, lowest priority first: built-in
//! defaults, an optional TOML file, then `CONFKEY_`-prefixed environment
//! variables. Nested keys use `__`, so `CONFKEY_ENGINE__TRIM_BLOCKS=false`
//! sets `engine.trim_blocks`.

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;
use crate::request::FeatureSet;

/// Prefix shared by every settings environment variable.
pub const ENV_PREFIX: &str = "CONFKEY_";

/// Settings file looked up next to the manifest by the build facade.
pub const SETTINGS_FILE: &str = "confkey.toml";

/// Template engine behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Directory whose templates take precedence over the built-in ones.
    pub template_dir: Option<Utf8PathBuf>,
    /// Drop the first newline after a block tag.
    pub trim_blocks: bool,
    /// Strip leading whitespace before a block tag.
    pub lstrip_blocks: bool,
    /// Keep the final newline of a template.
    pub keep_trailing_newline: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            template_dir: None,
            trim_blocks: true,
            lstrip_blocks: true,
            keep_trailing_newline: true,
        }
    }
}

/// Generator behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Feature set rounds run under.
    pub features: FeatureSet,
}

/// All settings read by the build facade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `[engine]` table.
    pub engine: EngineSettings,
    /// `[generator]` table.
    pub generator: GeneratorSettings,
}

impl Settings {
    /// Loads settings, reading `file` when given.
    ///
    /// A missing file contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Settings`] when a layer cannot be parsed or
    /// the merged values do not deserialise.
    pub fn load(file: Option<&Utf8Path>) -> Result<Self, BuildError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path.as_std_path()));
        }
        let settings = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract::<Self>()?;
        tracing::debug!(?settings, "loaded generator settings");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply_without_sources() {
        figment::Jail::expect_with(|_| {
            let settings = Settings::load(None).map_err(|e| e.to_string())?;
            assert_eq!(settings, Settings::default());
            assert!(settings.engine.trim_blocks);
            assert_eq!(settings.generator.features, FeatureSet::Rich);
            Ok(())
        });
    }

    #[rstest]
    fn file_overrides_defaults() {
        figment::Jail::expect_with(|j| {
            j.create_file(
                SETTINGS_FILE,
                "[engine]\ntemplate_dir = \"templates\"\nlstrip_blocks = false\n\n[generator]\nfeatures = \"minimal\"\n",
            )?;
            let settings =
                Settings::load(Some(Utf8Path::new(SETTINGS_FILE))).map_err(|e| e.to_string())?;
            assert_eq!(
                settings.engine.template_dir.as_deref(),
                Some(Utf8Path::new("templates"))
            );
            assert!(!settings.engine.lstrip_blocks);
            assert!(settings.engine.trim_blocks);
            assert_eq!(settings.generator.features, FeatureSet::Minimal);
            Ok(())
        });
    }

    #[rstest]
    fn environment_overrides_file() {
        figment::Jail::expect_with(|j| {
            j.create_file(SETTINGS_FILE, "[engine]\ntrim_blocks = true\n")?;
            j.set_env("CONFKEY_ENGINE__TRIM_BLOCKS", "false");
            j.set_env("CONFKEY_GENERATOR__FEATURES", "minimal");
            let settings =
                Settings::load(Some(Utf8Path::new(SETTINGS_FILE))).map_err(|e| e.to_string())?;
            assert!(!settings.engine.trim_blocks);
            assert_eq!(settings.generator.features, FeatureSet::Minimal);
            Ok(())
        });
    }

    #[rstest]
    fn missing_file_contributes_nothing() {
        figment::Jail::expect_with(|_| {
            let settings = Settings::load(Some(Utf8Path::new("absent.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(settings, Settings::default());
            Ok(())
        });
    }

    #[rstest]
    fn unknown_feature_set_is_rejected() {
        figment::Jail::expect_with(|j| {
            j.set_env("CONFKEY_GENERATOR__FEATURES", "everything");
            let err = Settings::load(None).expect_err("invalid feature set");
            assert!(matches!(err, BuildError::Settings(_)));
            Ok(())
        });
    }
}
