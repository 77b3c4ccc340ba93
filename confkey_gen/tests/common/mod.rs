//! Shared helpers for the generator integration tests.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;

/// Temporary crate layout with a `src/` and an output directory.
pub struct Workspace {
    _dir: tempfile::TempDir,
    /// Root of the temporary directory.
    pub root: Utf8PathBuf,
}

impl Workspace {
    /// Creates an empty workspace.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|p| anyhow::anyhow!("non-UTF-8 path {}", p.display()))?;
        std::fs::create_dir_all(root.join("src")).context("create src")?;
        Ok(Self { _dir: dir, root })
    }

    /// Writes `text` to `relative` below the root.
    pub fn write(&self, relative: &str, text: &str) -> Result<Utf8PathBuf> {
        let path = self.root.join(relative);
        std::fs::write(&path, text).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Output directory passed to the builder.
    pub fn out_dir(&self) -> Utf8PathBuf {
        self.root.join("out")
    }

    /// Reads a generated file and checks that it parses as Rust.
    pub fn generated(&self, relative: &str) -> Result<String> {
        let path = self.out_dir().join(relative);
        let text = std::fs::read_to_string(&path).with_context(|| format!("read {path}"))?;
        syn::parse_file(&text).with_context(|| format!("{path} is not valid Rust:\n{text}"))?;
        Ok(text)
    }
}

/// Runs `test` while figment's environment lock is held.
pub fn jailed(test: impl FnOnce() -> Result<()>) -> Result<()> {
    let mut outcome = Ok(());
    figment::Jail::expect_with(|_| {
        outcome = test();
        Ok(())
    });
    outcome
}
