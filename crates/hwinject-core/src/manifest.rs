//! Host-file manifests shipped by vendor packages.
//!
//! Each non-comment line is `kind, path`:
//!
//! ```text
//! # NVIDIA Jetson libraries
//! lib, /usr/lib/aarch64-linux-gnu/tegra/libcuda.so.1.1
//! sym, /usr/lib/aarch64-linux-gnu/tegra/libcuda.so
//! dev, /dev/nvhost-ctrl
//! ```
//!
//! `lib` and `file` entries are mounted, `sym` entries are recreated as
//! symlinks. `dev` and `dir` entries are skipped.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hwinject_common::constants::MANIFEST_EXTENSION;
use hwinject_common::error::{InjectError, Result};

/// Kind column of a manifest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Shared library, mounted.
    Library,
    /// Any other regular file, mounted.
    File,
    /// Symbolic link, recreated.
    Symlink,
    /// Device node, skipped.
    Device,
    /// Directory, skipped.
    Directory,
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "lib" => Ok(Self::Library),
            "file" => Ok(Self::File),
            "sym" => Ok(Self::Symlink),
            "dev" => Ok(Self::Device),
            "dir" => Ok(Self::Directory),
            other => Err(format!("unknown entry kind '{other}'")),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library => write!(f, "lib"),
            Self::File => write!(f, "file"),
            Self::Symlink => write!(f, "sym"),
            Self::Device => write!(f, "dev"),
            Self::Directory => write!(f, "dir"),
        }
    }
}

/// Host files to inject, split by how they are injected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Regular files to bind-mount, in manifest order.
    pub files: Vec<PathBuf>,
    /// Symlinks to recreate, in manifest order.
    pub symlinks: Vec<PathBuf>,
}

impl Manifest {
    /// Appends the entries of `other` after this manifest's entries.
    pub fn extend(&mut self, other: Self) {
        self.files.extend(other.files);
        self.symlinks.extend(other.symlinks);
    }

    /// Whether the manifest names nothing to inject.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.symlinks.is_empty()
    }
}

/// Parses manifest text.
///
/// # Errors
///
/// Returns [`InjectError::Manifest`] for a line with an unknown kind, no
/// path, or a relative path.
pub fn parse_manifest(text: &str) -> Result<Manifest> {
    let mut manifest = Manifest::default();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let err = |message: String| InjectError::Manifest {
            line: idx + 1,
            message,
        };

        let (kind, path) = line
            .split_once(',')
            .ok_or_else(|| err(format!("expected 'kind, path', got '{line}'")))?;
        let kind: EntryKind = kind.trim().parse().map_err(err)?;
        let path = path.trim();
        if path.is_empty() {
            return Err(err("missing path".into()));
        }
        if !path.starts_with('/') {
            return Err(err(format!("path must be absolute: {path}")));
        }

        match kind {
            EntryKind::Library | EntryKind::File => manifest.files.push(PathBuf::from(path)),
            EntryKind::Symlink => manifest.symlinks.push(PathBuf::from(path)),
            EntryKind::Device | EntryKind::Directory => {
                tracing::warn!(line = idx + 1, %kind, path, "skipping unsupported manifest entry");
            }
        }
    }
    Ok(manifest)
}

/// Reads and concatenates manifests in the given order.
///
/// # Errors
///
/// Returns [`InjectError::Io`] if a file cannot be read, or the parse
/// error of the first malformed manifest.
pub fn load_manifests<P: AsRef<Path>>(paths: &[P]) -> Result<Manifest> {
    let mut manifest = Manifest::default();
    for path in paths {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| InjectError::io(path, e))?;
        let parsed = parse_manifest(&text)?;
        tracing::debug!(
            path = %path.display(),
            files = parsed.files.len(),
            symlinks = parsed.symlinks.len(),
            "loaded manifest"
        );
        manifest.extend(parsed);
    }
    Ok(manifest)
}

/// Lists the `.csv` manifests in `dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`InjectError::Io`] if `dir` cannot be read.
pub fn discover_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| InjectError::io(dir, e))?;
    let mut found = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| InjectError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == MANIFEST_EXTENSION) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}
