//! Read-only bind mounting of host files into a container rootfs.
//!
//! Either every requested file ends up bind-mounted read-only and is
//! returned in a [`MountList`], or nothing mounted by the call survives.

use std::path::{Path, PathBuf};

use hwinject_common::config::ContainerConfig;
use hwinject_common::error::Result;

use crate::filesystem::node;
use crate::filesystem::{Mounter, SyscallMounter};
use crate::path::join_under;
use crate::resolver::PathResolver;

/// Destinations of successfully mounted files, in request order.
///
/// The owner is responsible for unmounting every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountList(Vec<PathBuf>);

impl MountList {
    /// Number of mounted files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no file was mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the destinations as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }

    /// Consumes the list, returning the destinations.
    #[must_use]
    pub fn into_inner(self) -> Vec<PathBuf> {
        self.0
    }
}

impl IntoIterator for MountList {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MountList {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Unmounts everything recorded in it when dropped, unless committed.
struct MountGuard<'m, M: Mounter> {
    mounter: &'m M,
    mounted: Vec<PathBuf>,
}

impl<'m, M: Mounter> MountGuard<'m, M> {
    fn with_capacity(mounter: &'m M, capacity: usize) -> Self {
        Self {
            mounter,
            mounted: Vec::with_capacity(capacity),
        }
    }

    fn record(&mut self, dst: PathBuf) {
        self.mounted.push(dst);
    }

    fn commit(mut self) -> MountList {
        MountList(std::mem::take(&mut self.mounted))
    }
}

impl<M: Mounter> Drop for MountGuard<'_, M> {
    fn drop(&mut self) {
        for dst in self.mounted.iter().rev() {
            tracing::debug!(path = %dst.display(), "rolling back mount");
            if let Err(e) = self.mounter.unmount(dst) {
                tracing::warn!(path = %dst.display(), error = %e, "rollback unmount failed");
            }
        }
    }
}

/// Drives placement, staging, and mounting of host files.
#[derive(Debug, Clone, Default)]
pub struct FileInjector<M = SyscallMounter> {
    mounter: M,
    resolver: PathResolver,
}

impl<M: Mounter> FileInjector<M> {
    /// Creates an injector using `mounter` for all mount operations.
    #[must_use]
    pub const fn new(mounter: M, resolver: PathResolver) -> Self {
        Self { mounter, resolver }
    }

    /// Bind-mounts each of `paths` (relative to host `root`) read-only into
    /// the container.
    ///
    /// For every file a placeholder owned by the container's uid/gid and
    /// carrying the source's permission bits is created at the destination,
    /// the source is bound onto it, and the bind is remounted
    /// `ro,nodev,nosuid`.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Everything mounted by this call, including
    /// a bind whose remount failed, is unmounted in reverse order first.
    pub fn mount_files<P: AsRef<Path>>(
        &self,
        root: &Path,
        container: &ContainerConfig,
        hint: Option<&Path>,
        paths: &[P],
    ) -> Result<MountList> {
        let mut guard = MountGuard::with_capacity(&self.mounter, paths.len());
        for path in paths {
            self.mount_one(&mut guard, root, container, hint, path.as_ref())?;
        }
        let list = guard.commit();
        tracing::info!(count = list.len(), rootfs = %container.rootfs.display(), "host files mounted");
        Ok(list)
    }

    fn mount_one(
        &self,
        guard: &mut MountGuard<'_, M>,
        root: &Path,
        container: &ContainerConfig,
        hint: Option<&Path>,
        path: &Path,
    ) -> Result<()> {
        let src = join_under(root, path)?;
        let dst = self.resolver.resolve(&container.rootfs, path, hint)?.destination;

        let mode = node::file_mode(&src)?;
        node::create_placeholder(&dst, container.uid, container.gid, mode)?;

        tracing::info!(src = %src.display(), dst = %dst.display(), "mounting file");
        self.mounter.bind(&src, &dst)?;
        guard.record(dst.clone());
        self.mounter.remount_readonly(&src, &dst)
    }
}
