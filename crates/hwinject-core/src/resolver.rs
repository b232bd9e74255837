//! Destination placement for host files inside the container rootfs.
//!
//! Hosts that do not use the container's multiarch layout may still keep
//! vendor files under a copy of the multiarch directory. Files found there
//! are moved into the preferred container directory, keeping any vendor
//! subdirectory, while everything else keeps its host path verbatim.
//!
//! Placement is split into a pure [`PathResolver::classify`] step and a
//! [`PathResolver::resolve`] step that touches the rootfs to follow
//! symlinked directories.

use std::fmt;
use std::path::{Path, PathBuf};

use hwinject_common::error::Result;
use hwinject_common::types::HostLibDir;

use crate::path::{base_name, join_under, resolve_in_root, resolve_parent_in_root};

/// How a host file is placed inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Mirror the full host path under the rootfs.
    Passthrough,
    /// The file sits in a subdirectory of the host library directory; keep
    /// that subdirectory beneath the hint. `dir` is hint + subdirectory.
    SubpathRemap {
        /// Container directory, before symlink resolution.
        dir: PathBuf,
    },
    /// The file sits directly in the host library directory; place it
    /// directly in the hint.
    FlatRemap {
        /// Container directory, before symlink resolution.
        dir: PathBuf,
    },
}

impl Placement {
    /// Whether the destination keeps the file's full host path.
    #[must_use]
    pub const fn is_passthrough(&self) -> bool {
        matches!(self, Self::Passthrough)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passthrough => write!(f, "passthrough"),
            Self::SubpathRemap { .. } => write!(f, "subpath-remap"),
            Self::FlatRemap { .. } => write!(f, "flat-remap"),
        }
    }
}

/// A resolved destination together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Strategy chosen for the file.
    pub placement: Placement,
    /// Absolute destination under the container rootfs.
    pub destination: PathBuf,
}

/// Computes in-container destinations for host files.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    host_lib_dir: HostLibDir,
}

impl PathResolver {
    /// Creates a resolver for the given host library directory.
    #[must_use]
    pub const fn new(host_lib_dir: HostLibDir) -> Self {
        Self { host_lib_dir }
    }

    /// Picks the placement strategy for `path` without touching the filesystem.
    ///
    /// Passthrough applies when there is no hint, when `path` is not strictly
    /// inside the host library directory, or when the hint is a different
    /// directory that already contains `path`. Otherwise the file is remapped into the
    /// hint, keeping its subdirectory if it has one.
    #[must_use]
    pub fn classify(&self, path: &Path, hint: Option<&Path>) -> Placement {
        let Some(hint) = hint else {
            return Placement::Passthrough;
        };
        let rest = match path.strip_prefix(self.host_lib_dir.as_path()) {
            Ok(rest) if !rest.as_os_str().is_empty() => rest,
            _ => return Placement::Passthrough,
        };
        if !self.host_lib_dir.same_dir(hint) && path.starts_with(hint) {
            return Placement::Passthrough;
        }
        match rest.parent() {
            Some(sub) if !sub.as_os_str().is_empty() => Placement::SubpathRemap {
                dir: hint.join(sub),
            },
            _ => Placement::FlatRemap {
                dir: hint.to_path_buf(),
            },
        }
    }

    /// Computes the destination of `path` inside `rootfs`.
    ///
    /// The destination directory is resolved through any symlinks inside
    /// `rootfs` and the file's base name is appended. A passthrough file keeps
    /// its host directory, as seen from inside the container.
    ///
    /// # Errors
    ///
    /// Returns a path-construction error if a path overflows `PATH_MAX`, if
    /// `path` has no base name, or if symlink resolution fails.
    pub fn resolve(&self, rootfs: &Path, path: &Path, hint: Option<&Path>) -> Result<Resolution> {
        let placement = self.classify(path, hint);
        let destination = match &placement {
            Placement::Passthrough => resolve_parent_in_root(rootfs, path)?,
            Placement::SubpathRemap { dir } | Placement::FlatRemap { dir } => {
                let dir = resolve_in_root(rootfs, dir)?;
                join_under(&dir, Path::new(base_name(path)?))?
            }
        };
        tracing::debug!(
            path = %path.display(),
            %placement,
            destination = %destination.display(),
            "resolved destination"
        );
        Ok(Resolution {
            placement,
            destination,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::symlink;

    use super::*;

    const LIBDIR: &str = "/usr/lib/aarch64-linux-gnu";

    fn resolver() -> PathResolver {
        PathResolver::new(HostLibDir::new(format!("{LIBDIR}/")))
    }

    #[test]
    fn classify_without_hint_is_passthrough() {
        let placement = resolver().classify(Path::new("/usr/lib/aarch64-linux-gnu/libfoo.so"), None);
        assert_eq!(placement, Placement::Passthrough);
    }

    #[test]
    fn classify_outside_host_lib_dir_is_passthrough() {
        let placement = resolver().classify(Path::new("/etc/vendor.conf"), Some(Path::new(LIBDIR)));
        assert_eq!(placement, Placement::Passthrough);
    }

    #[test]
    fn classify_file_in_lib_dir_is_flat_remap() {
        let placement = resolver().classify(
            Path::new("/usr/lib/aarch64-linux-gnu/libfoo.so"),
            Some(Path::new(LIBDIR)),
        );
        assert_eq!(
            placement,
            Placement::FlatRemap {
                dir: PathBuf::from(LIBDIR)
            }
        );
    }

    #[test]
    fn classify_file_in_vendor_subdir_is_subpath_remap() {
        let placement = resolver().classify(
            Path::new("/usr/lib/aarch64-linux-gnu/vendor/libbar.so"),
            Some(Path::new(LIBDIR)),
        );
        assert_eq!(
            placement,
            Placement::SubpathRemap {
                dir: PathBuf::from("/usr/lib/aarch64-linux-gnu/vendor")
            }
        );
    }

    #[test]
    fn classify_keeps_nested_subdirectories() {
        let placement = resolver().classify(
            Path::new("/usr/lib/aarch64-linux-gnu/tegra/egl/libEGL.so"),
            Some(Path::new("/usr/lib64")),
        );
        assert_eq!(
            placement,
            Placement::SubpathRemap {
                dir: PathBuf::from("/usr/lib64/tegra/egl")
            }
        );
    }

    #[test]
    fn classify_different_hint_containing_file_is_passthrough() {
        let placement = resolver().classify(
            Path::new("/usr/lib/aarch64-linux-gnu/tegra/libnvos.so"),
            Some(Path::new("/usr/lib/aarch64-linux-gnu/tegra")),
        );
        assert_eq!(placement, Placement::Passthrough);
    }

    #[test]
    fn classify_different_hint_remaps_into_hint() {
        let placement = resolver().classify(
            Path::new("/usr/lib/aarch64-linux-gnu/libfoo.so"),
            Some(Path::new("/usr/lib64")),
        );
        assert_eq!(
            placement,
            Placement::FlatRemap {
                dir: PathBuf::from("/usr/lib64")
            }
        );
    }

    #[test]
    fn classify_compares_components_not_strings() {
        let placement = resolver().classify(
            Path::new("/usr/lib/aarch64-linux-gnu-extra/libfoo.so"),
            Some(Path::new(LIBDIR)),
        );
        assert_eq!(placement, Placement::Passthrough);
    }

    #[test]
    fn classify_host_lib_dir_itself_is_passthrough() {
        let placement = resolver().classify(Path::new(LIBDIR), Some(Path::new("/usr/lib64")));
        assert_eq!(placement, Placement::Passthrough);
    }

    #[test]
    fn resolve_passthrough_stays_inside_rootfs_behind_absolute_link() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        let outside = tempfile::tempdir().expect("tempdir");
        symlink(outside.path(), rootfs.path().join("etc")).expect("symlink");

        let res = resolver()
            .resolve(rootfs.path(), Path::new("/etc/vendor.conf"), None)
            .expect("resolve");
        assert!(res.destination.starts_with(rootfs.path()));
        assert_eq!(
            res.destination,
            join_under(rootfs.path(), &outside.path().join("vendor.conf")).expect("join")
        );
    }

    #[test]
    fn resolve_flat_remap_destination() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        let res = resolver()
            .resolve(
                rootfs.path(),
                Path::new("/usr/lib/aarch64-linux-gnu/libfoo.so"),
                Some(Path::new(LIBDIR)),
            )
            .expect("resolve");
        assert_eq!(
            res.destination,
            rootfs.path().join("usr/lib/aarch64-linux-gnu/libfoo.so")
        );
    }

    #[test]
    fn resolve_subpath_remap_destination() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        let res = resolver()
            .resolve(
                rootfs.path(),
                Path::new("/usr/lib/aarch64-linux-gnu/vendor/libbar.so"),
                Some(Path::new(LIBDIR)),
            )
            .expect("resolve");
        assert_eq!(
            res.destination,
            rootfs.path().join("usr/lib/aarch64-linux-gnu/vendor/libbar.so")
        );
    }

    #[test]
    fn resolve_passthrough_destination() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        let res = resolver()
            .resolve(
                rootfs.path(),
                Path::new("/etc/vendor.conf"),
                Some(Path::new(LIBDIR)),
            )
            .expect("resolve");
        assert!(res.placement.is_passthrough());
        assert_eq!(res.destination, rootfs.path().join("etc/vendor.conf"));
    }

    #[test]
    fn resolve_follows_symlinked_hint_inside_rootfs() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(rootfs.path().join("usr/lib/aarch64-linux-gnu")).expect("mkdir");
        symlink("lib/aarch64-linux-gnu", rootfs.path().join("usr/lib64")).expect("symlink");

        let res = resolver()
            .resolve(
                rootfs.path(),
                Path::new("/usr/lib/aarch64-linux-gnu/libfoo.so"),
                Some(Path::new("/usr/lib64")),
            )
            .expect("resolve");
        assert_eq!(
            res.destination,
            rootfs.path().join("usr/lib/aarch64-linux-gnu/libfoo.so")
        );
    }

    #[test]
    fn resolve_is_deterministic() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        let path = Path::new("/usr/lib/aarch64-linux-gnu/vendor/libbar.so");
        let first = resolver().resolve(rootfs.path(), path, Some(Path::new(LIBDIR))).expect("first");
        let second = resolver().resolve(rootfs.path(), path, Some(Path::new(LIBDIR))).expect("second");
        assert_eq!(first, second);
    }
}
