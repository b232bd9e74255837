//! Configuration model for host-file injection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{InjectError, Result};
use crate::types::HostLibDir;

/// The container a set of host files is injected into.
///
/// Read-only to the injection core; owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Absolute path to the container's root filesystem.
    pub rootfs: PathBuf,
    /// In-container library directory, e.g. `/usr/lib/aarch64-linux-gnu`.
    pub libs_dir: PathBuf,
    /// Owner applied to created nodes.
    pub uid: u32,
    /// Group applied to created nodes.
    pub gid: u32,
}

impl ContainerConfig {
    /// Loads a container configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// names a relative rootfs or library directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| InjectError::io(path, e))?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that both directories are absolute.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::Config`] naming the first relative directory.
    pub fn validate(&self) -> Result<()> {
        if !self.rootfs.is_absolute() {
            return Err(InjectError::Config {
                message: format!("rootfs must be absolute: {}", self.rootfs.display()),
            });
        }
        if !self.libs_dir.is_absolute() {
            return Err(InjectError::Config {
                message: format!("libs_dir must be absolute: {}", self.libs_dir.display()),
            });
        }
        Ok(())
    }
}

/// Per-call knobs shared by the mount and symlink operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectOptions {
    /// Host root prefixed onto every requested path.
    pub root: PathBuf,
    /// Host multiarch library directory used by the path resolver.
    pub host_lib_dir: HostLibDir,
    /// Preferred container directory for library files, if any.
    pub directory_hint: Option<PathBuf>,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from(crate::constants::DEFAULT_HOST_ROOT),
            host_lib_dir: HostLibDir::default(),
            directory_hint: None,
        }
    }
}
