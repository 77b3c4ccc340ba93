//! Build-script facade.
//!
//! ```no_run
//! // build.rs
//! fn main() -> Result<(), confkey_gen::BuildError> {
//!     confkey_gen::Builder::from_env()?
//!         .source("src/keys.rs", "crate::keys")
//!         .generate()?;
//!     Ok(())
//! }
//! ```

use std::env;

use camino::{Utf8Path, Utf8PathBuf};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::driver::{ConfigurationGenerator, RoundOutcome, Session};
use crate::emit::DirFiler;
use crate::error::BuildError;
use crate::render::JinjaRenderer;
use crate::request::FeatureSet;
use crate::settings::{SETTINGS_FILE, Settings};
use crate::source::SourceSet;

/// Configures and runs one generation round from a build script.
#[derive(Debug, Clone)]
pub struct Builder {
    out_dir: Utf8PathBuf,
    manifest_dir: Option<Utf8PathBuf>,
    sources: Vec<(Utf8PathBuf, String)>,
    features: Option<FeatureSet>,
    settings_file: Option<Utf8PathBuf>,
}

/// Summary of a successful round.
#[derive(Debug, Clone)]
pub struct Report {
    /// Paths of the generated files, in emission order.
    pub written: Vec<Utf8PathBuf>,
    /// Every diagnostic the round reported.
    pub diagnostics: Vec<Diagnostic>,
    /// Per-declaration outcomes.
    pub outcome: RoundOutcome,
}

impl Builder {
    /// Creates a builder writing below `out_dir`.
    ///
    /// Relative source paths resolve against the working directory.
    #[must_use]
    pub fn new(out_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            manifest_dir: None,
            sources: Vec::new(),
            features: None,
            settings_file: None,
        }
    }

    /// Creates a builder from the variables Cargo sets for build scripts.
    ///
    /// Output goes to `OUT_DIR`. Relative source paths and the default
    /// `confkey.toml` resolve against `CARGO_MANIFEST_DIR`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingEnv`] when either variable is unset or
    /// not valid UTF-8.
    pub fn from_env() -> Result<Self, BuildError> {
        let out_dir = env_path("OUT_DIR")?;
        let manifest_dir = env_path("CARGO_MANIFEST_DIR")?;
        let mut builder = Self::new(out_dir);
        builder.settings_file = Some(manifest_dir.join(SETTINGS_FILE));
        builder.manifest_dir = Some(manifest_dir);
        Ok(builder)
    }

    /// Adds a source file declaring keys in the module `module_path`.
    #[must_use]
    pub fn source(mut self, path: impl Into<Utf8PathBuf>, module_path: impl Into<String>) -> Self {
        self.sources.push((path.into(), module_path.into()));
        self
    }

    /// Overrides the feature set from the settings.
    #[must_use]
    pub const fn features(mut self, features: FeatureSet) -> Self {
        self.features = Some(features);
        self
    }

    /// Reads settings from `path` instead of the default file.
    #[must_use]
    pub fn settings_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    /// Output directory.
    #[must_use]
    pub fn out_dir(&self) -> &Utf8Path {
        &self.out_dir
    }

    /// Parses the sources and runs the round.
    ///
    /// Under Cargo, every source and an existing settings file are
    /// registered with `cargo::rerun-if-changed`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] or [`BuildError::Parse`] when a source
    /// cannot be read, [`BuildError::Settings`] when settings fail to load,
    /// and [`BuildError::Generation`] when the round reported errors.
    pub fn generate(self) -> Result<Report, BuildError> {
        let settings_file = self.settings_file.as_deref().map(|path| self.resolve(path));
        let settings = Settings::load(settings_file.as_deref())?;
        let features = self.features.unwrap_or(settings.generator.features);

        let mut sources = SourceSet::new();
        for (path, module_path) in &self.sources {
            let resolved = self.resolve(path);
            sources.load(&resolved, module_path)?;
            self.rerun_if_changed(&resolved);
        }
        if let Some(path) = settings_file.as_ref().filter(|path| path.exists()) {
            self.rerun_if_changed(path);
        }

        let renderer = JinjaRenderer::new(&settings.engine)?;
        let mut filer = DirFiler::open(&self.out_dir)?;
        let mut diagnostics = Diagnostics::new();
        let outcome = {
            let mut session = Session {
                renderer: &renderer,
                filer: &mut filer,
                sink: &mut diagnostics,
            };
            ConfigurationGenerator::new(features).process(sources.declarations(), &mut session)
        };

        let errors: Vec<String> = diagnostics.errors().map(ToString::to_string).collect();
        if !errors.is_empty() {
            return Err(BuildError::Generation {
                errors: errors.len(),
                summary: errors.join("\n"),
            });
        }
        Ok(Report {
            written: filer.into_written(),
            diagnostics: diagnostics.into_records(),
            outcome,
        })
    }

    fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        match &self.manifest_dir {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    #[expect(
        clippy::print_stdout,
        reason = "Cargo reads build script directives from stdout"
    )]
    fn rerun_if_changed(&self, path: &Utf8Path) {
        if self.manifest_dir.is_some() {
            println!("cargo::rerun-if-changed={path}");
        }
    }
}

fn env_path(name: &'static str) -> Result<Utf8PathBuf, BuildError> {
    env::var(name)
        .map(Utf8PathBuf::from)
        .map_err(|_| BuildError::MissingEnv(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result, ensure};
    use rstest::rstest;

    const KEYS: &str = r#"
#[derive(ConfigurationKey)]
#[property_file_resolver(properties_path = "db.properties")]
pub enum Db {
    #[configuration(default_key)]
    Url,
    Pool,
}
"#;

    /// Runs `test` while the settings environment is locked.
    fn jailed(test: impl FnOnce() -> Result<()>) -> Result<()> {
        let mut outcome = Ok(());
        figment::Jail::expect_with(|_| {
            outcome = test();
            Ok(())
        });
        outcome
    }

    fn workspace() -> Result<(tempfile::TempDir, Utf8PathBuf)> {
        let tempdir = tempfile::tempdir().context("create temp dir")?;
        let root = Utf8PathBuf::from_path_buf(tempdir.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("non-UTF-8 path {}", p.display()))?;
        Ok((tempdir, root))
    }

    #[rstest]
    fn generates_files_into_the_output_directory() -> Result<()> {
        jailed(|| {
            let (_guard, root) = workspace()?;
            std::fs::write(root.join("keys.rs"), KEYS)?;
            let report = Builder::new(root.join("out"))
                .source(root.join("keys.rs"), "crate::keys")
                .settings_file(root.join("absent.toml"))
                .generate()?;
            ensure!(
                report.written
                    == [
                        root.join("out/keys/db_config.rs"),
                        root.join("out/keys/db_config_bean.rs"),
                        root.join("out/keys/db_property_file_configuration_resolver.rs"),
                    ],
                "unexpected files {:?}",
                report.written
            );
            ensure!(report.outcome.consumed());
            let handle = std::fs::read_to_string(root.join("out/keys/db_config.rs"))?;
            ensure!(handle.contains("pub struct DbConfig {"));
            Ok(())
        })
    }

    #[rstest]
    fn error_diagnostics_fail_the_build() -> Result<()> {
        jailed(|| {
            let (_guard, root) = workspace()?;
            std::fs::write(root.join("keys.rs"), "#[configuration] pub enum Empty {}")?;
            let err = Builder::new(root.join("out"))
                .source(root.join("keys.rs"), "crate")
                .settings_file(root.join("absent.toml"))
                .generate()
                .err()
                .context("generation should fail")?;
            let BuildError::Generation { errors, summary } = err else {
                anyhow::bail!("expected a generation error, got {err:?}");
            };
            ensure!(errors == 1);
            ensure!(summary == "error: crate::Empty: Enum with no constants", "{summary}");
            Ok(())
        })
    }

    #[rstest]
    fn features_override_settings() -> Result<()> {
        jailed(|| {
            let (_guard, root) = workspace()?;
            std::fs::write(root.join("keys.rs"), KEYS)?;
            std::fs::write(
                root.join("confkey.toml"),
                "[generator]\nfeatures = \"rich\"\n",
            )?;
            let report = Builder::new(root.join("out"))
                .source(root.join("keys.rs"), "crate::keys")
                .settings_file(root.join("confkey.toml"))
                .features(FeatureSet::Minimal)
                .generate()?;
            ensure!(report.written.len() == 2);
            ensure!(report.written.contains(&root.join("out/keys/configuration.rs")));
            Ok(())
        })
    }

    #[rstest]
    fn unreadable_sources_are_io_errors() -> Result<()> {
        jailed(|| {
            let (_guard, root) = workspace()?;
            let err = Builder::new(root.join("out"))
                .source(root.join("missing.rs"), "crate")
                .settings_file(root.join("absent.toml"))
                .generate()
                .err()
                .context("generation should fail")?;
            ensure!(matches!(err, BuildError::Io { .. }), "{err:?}");
            Ok(())
        })
    }

    #[rstest]
    fn from_env_requires_cargo_variables() {
        figment::Jail::expect_with(|j| {
            j.clear_env();
            let err = Builder::from_env().expect_err("OUT_DIR is unset");
            assert!(matches!(err, BuildError::MissingEnv("OUT_DIR")));
            Ok(())
        });
    }
}
