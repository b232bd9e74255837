//! Domain primitive types used across the hwinject workspace.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The host's canonical multiarch library directory.
///
/// Always stored with exactly one trailing separator, matching how the
/// directory is compared against host file paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct HostLibDir(String);

impl HostLibDir {
    /// Creates a host library directory, normalising the trailing separator.
    #[must_use]
    pub fn new(dir: impl AsRef<str>) -> Self {
        let trimmed = dir.as_ref().trim_end_matches('/');
        Self(format!("{trimmed}/"))
    }

    /// Returns the directory with its trailing separator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the directory as a path (the trailing separator is ignored
    /// by path comparisons).
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Whether `dir` names the same directory, ignoring trailing separators.
    #[must_use]
    pub fn same_dir(&self, dir: &Path) -> bool {
        self.as_path().components().eq(dir.components())
    }
}

impl Default for HostLibDir {
    fn default() -> Self {
        Self::new(crate::constants::host_lib_dir())
    }
}

impl From<String> for HostLibDir {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<HostLibDir> for String {
    fn from(value: HostLibDir) -> Self {
        value.0
    }
}

impl From<HostLibDir> for PathBuf {
    fn from(value: HostLibDir) -> Self {
        Self::from(value.0)
    }
}

impl fmt::Display for HostLibDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two stages of a read-only bind mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MountStage {
    /// Initial `MS_BIND` of the source onto the placeholder.
    Bind,
    /// `MS_REMOUNT` of the bind with `MS_RDONLY|MS_NODEV|MS_NOSUID`.
    Remount,
}

impl fmt::Display for MountStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind => write!(f, "bind mount"),
            Self::Remount => write!(f, "read-only remount"),
        }
    }
}

/// Coarse classification of a filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Regular file.
    Regular,
    /// Symbolic link.
    Symlink,
    /// Directory.
    Directory,
    /// Character or block device.
    Device,
    /// FIFO, socket, or anything else.
    Other,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular file"),
            Self::Symlink => write!(f, "symlink"),
            Self::Directory => write!(f, "directory"),
            Self::Device => write!(f, "device"),
            Self::Other => write!(f, "special file"),
        }
    }
}
