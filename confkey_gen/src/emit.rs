//! Output filers for generated sources.
//!
//! A filer maps a generated type's qualified name to an output file. The
//! directory-backed filer writes below a build's `OUT_DIR` through
//! `cap_std`; the in-memory filer backs tests.

use std::collections::{BTreeMap, HashSet};
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};
use heck::ToSnakeCase;

use crate::error::BuildError;
use crate::model::Declaration;

/// Creates output files for generated types.
pub trait Filer {
    /// Opens a fresh writer for `qualified_name`.
    ///
    /// `origin` is the declaration the file is generated from.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be created, including an
    /// [`io::ErrorKind::AlreadyExists`] error when the same name was already
    /// created in this session.
    fn create_source_file(
        &mut self,
        qualified_name: &str,
        origin: &Declaration,
    ) -> io::Result<Box<dyn Write + '_>>;
}

/// Maps a qualified name to a path relative to the output directory.
///
/// Leading `crate`, `self`, and `super` segments are dropped, the remaining
/// module segments become directories, and the type name becomes a
/// `snake_case` file name. `crate::keys::DbConfig` maps to
/// `keys/db_config.rs`.
///
/// # Errors
///
/// Returns [`io::ErrorKind::InvalidInput`] when the name has no type
/// segment.
pub fn output_path(qualified_name: &str) -> io::Result<Utf8PathBuf> {
    let mut segments: Vec<&str> = qualified_name
        .split("::")
        .map(str::trim)
        .skip_while(|segment| matches!(*segment, "crate" | "self" | "super" | ""))
        .collect();
    let Some(type_name) = segments.pop().filter(|name| !name.is_empty()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{qualified_name}' does not name a type"),
        ));
    };
    let mut path = Utf8PathBuf::new();
    for segment in segments {
        path.push(segment);
    }
    path.push(format!("{}.rs", type_name.to_snake_case()));
    Ok(path)
}

fn already_created(qualified_name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("attempt to recreate a file for type {qualified_name}"),
    )
}

/// Filer writing below an output directory.
#[derive(Debug)]
pub struct DirFiler {
    root: Utf8PathBuf,
    dir: Dir,
    created: HashSet<String>,
    written: Vec<Utf8PathBuf>,
}

impl DirFiler {
    /// Opens `out_dir`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] when the directory cannot be created or
    /// opened.
    pub fn open(out_dir: &Utf8Path) -> Result<Self, BuildError> {
        Ok(Self {
            root: out_dir.to_path_buf(),
            dir: ensure_dir(out_dir)?,
            created: HashSet::new(),
            written: Vec::new(),
        })
    }

    /// Output directory root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute paths of every file created so far, in creation order.
    #[must_use]
    pub fn written(&self) -> &[Utf8PathBuf] {
        &self.written
    }

    /// Consumes the filer, returning the created paths.
    #[must_use]
    pub fn into_written(self) -> Vec<Utf8PathBuf> {
        self.written
    }
}

impl Filer for DirFiler {
    fn create_source_file(
        &mut self,
        qualified_name: &str,
        origin: &Declaration,
    ) -> io::Result<Box<dyn Write + '_>> {
        if self.created.contains(qualified_name) {
            return Err(already_created(qualified_name));
        }
        let relative = output_path(qualified_name)?;
        if let Some(parent) = relative.parent().filter(|p| !p.as_str().is_empty()) {
            self.dir.create_dir_all(parent)?;
        }
        let file = self.dir.open_with(
            &relative,
            OpenOptions::new().write(true).create(true).truncate(true),
        )?;
        tracing::debug!(
            declaration = %origin.name,
            path = %relative,
            "created output file for {qualified_name}"
        );
        self.created.insert(qualified_name.to_owned());
        self.written.push(self.root.join(&relative));
        Ok(Box::new(file))
    }
}

fn ensure_dir(path: &Utf8Path) -> Result<Dir, BuildError> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(dir),
        Err(open_err) if open_err.kind() == io::ErrorKind::NotFound => {
            Dir::create_ambient_dir_all(path, ambient_authority()).map_err(|io_err| {
                BuildError::Io {
                    path: path.to_path_buf(),
                    source: io_err,
                }
            })?;
            Dir::open_ambient_dir(path, ambient_authority()).map_err(|io_err| BuildError::Io {
                path: path.to_path_buf(),
                source: io_err,
            })
        }
        Err(open_err) => Err(BuildError::Io {
            path: path.to_path_buf(),
            source: open_err,
        }),
    }
}

/// Filer keeping generated files in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryFiler {
    files: BTreeMap<String, Vec<u8>>,
    failing: HashSet<String>,
}

impl MemoryFiler {
    /// Creates an empty filer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes creation of `qualified_name` fail with a permission error.
    #[must_use]
    pub fn failing_on(mut self, qualified_name: impl Into<String>) -> Self {
        self.failing.insert(qualified_name.into());
        self
    }

    /// Text written for `qualified_name`.
    #[must_use]
    pub fn contents(&self, qualified_name: &str) -> Option<&str> {
        self.files
            .get(qualified_name)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Qualified names of the created files, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Reports whether nothing was created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Filer for MemoryFiler {
    fn create_source_file(
        &mut self,
        qualified_name: &str,
        _origin: &Declaration,
    ) -> io::Result<Box<dyn Write + '_>> {
        if self.failing.contains(qualified_name) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("cannot create {qualified_name}"),
            ));
        }
        if self.files.contains_key(qualified_name) {
            return Err(already_created(qualified_name));
        }
        let buffer = self.files.entry(qualified_name.to_owned()).or_default();
        Ok(Box::new(buffer))
    }
}
