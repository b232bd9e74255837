//! Recreation of host symlinks inside the container rootfs.
//!
//! Links whose name starts with `lib` are gathered into the container's
//! library directory so the dynamic linker finds them; any other link keeps
//! its host path, with that path's directories resolved inside the rootfs.
//! The recreated link points at the literal host target.
//!
//! Not transactional: a failure leaves links created so far in place, and
//! re-running over the same input replaces them.

use std::path::{Path, PathBuf};

use hwinject_common::config::ContainerConfig;
use hwinject_common::constants::LIBRARY_PREFIX;
use hwinject_common::error::{InjectError, Result};
use hwinject_common::types::FileKind;

use crate::filesystem::node;
use crate::path::{PATH_MAX, base_name, join_under, resolve_in_root, resolve_parent_in_root};

/// Reads the target of the host symlink at `src`.
///
/// # Errors
///
/// Returns [`InjectError::UnsupportedFileType`] if `src` is not a symlink,
/// [`InjectError::ReadLink`] if it cannot be read, and
/// [`InjectError::PathTooLong`] if the target does not fit `PATH_MAX`.
pub fn read_host_link(src: &Path) -> Result<PathBuf> {
    let kind = node::file_kind(src)?;
    if kind != FileKind::Symlink {
        return Err(InjectError::UnsupportedFileType {
            path: src.to_path_buf(),
            kind,
        });
    }
    let target = std::fs::read_link(src).map_err(|e| InjectError::ReadLink {
        path: src.to_path_buf(),
        source: e,
    })?;
    if target.as_os_str().len() >= PATH_MAX {
        return Err(InjectError::PathTooLong { path: target });
    }
    Ok(target)
}

/// Computes where the host symlink `path` is recreated inside the container.
///
/// # Errors
///
/// Returns a path-construction error if `path` has no base name, if the
/// library directory cannot be resolved, or if a path overflows.
pub fn symlink_destination(container: &ContainerConfig, path: &Path) -> Result<PathBuf> {
    let name = base_name(path)?;
    if name.as_encoded_bytes().starts_with(LIBRARY_PREFIX.as_bytes()) {
        let libs_dir = resolve_in_root(&container.rootfs, &container.libs_dir)?;
        join_under(&libs_dir, Path::new(name))
    } else {
        resolve_parent_in_root(&container.rootfs, path)
    }
}

/// Recreates each host symlink in `paths` (relative to host `root`) inside
/// the container, owned by the container's uid/gid.
///
/// Any existing node at a destination is removed first.
///
/// # Errors
///
/// Returns the first failure immediately; links already created stay.
pub fn project_symlinks<P: AsRef<Path>>(
    root: &Path,
    container: &ContainerConfig,
    paths: &[P],
) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        let src = join_under(root, path)?;
        let target = read_host_link(&src)?;
        let dst = symlink_destination(container, path)?;

        node::remove_node(&dst)?;
        tracing::info!(dst = %dst.display(), target = %target.display(), "creating symlink");
        node::create_symlink(&dst, &target, container.uid, container.gid)?;
    }
    tracing::info!(count = paths.len(), rootfs = %container.rootfs.display(), "symlinks projected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::symlink;

    use super::*;

    fn container(rootfs: &Path) -> ContainerConfig {
        ContainerConfig {
            rootfs: rootfs.to_path_buf(),
            libs_dir: PathBuf::from("/usr/lib/aarch64-linux-gnu"),
            uid: nix::unistd::getuid().as_raw(),
            gid: nix::unistd::getgid().as_raw(),
        }
    }

    #[test]
    fn destination_of_library_link_is_libs_dir() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        let dst = symlink_destination(
            &container(rootfs.path()),
            Path::new("/usr/lib/aarch64-linux-gnu/tegra/libcuda.so.1"),
        )
        .expect("destination");
        assert_eq!(dst, rootfs.path().join("usr/lib/aarch64-linux-gnu/libcuda.so.1"));
    }

    #[test]
    fn destination_of_other_link_keeps_host_path() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        let dst = symlink_destination(&container(rootfs.path()), Path::new("/etc/alternatives/foo"))
            .expect("destination");
        assert_eq!(dst, rootfs.path().join("etc/alternatives/foo"));
    }

    #[test]
    fn destination_follows_symlinked_libs_dir() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(rootfs.path().join("usr/lib64")).expect("mkdir");
        std::fs::create_dir_all(rootfs.path().join("usr/lib")).expect("mkdir");
        symlink("../lib64", rootfs.path().join("usr/lib/aarch64-linux-gnu")).expect("symlink");

        let dst = symlink_destination(&container(rootfs.path()), Path::new("/usr/lib/libnvos.so"))
            .expect("destination");
        assert_eq!(dst, rootfs.path().join("usr/lib64/libnvos.so"));
    }

    #[test]
    fn destination_of_other_link_follows_absolute_parent_inside_rootfs() {
        let rootfs = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(rootfs.path().join("opt/alternatives")).expect("mkdir");
        symlink("/opt/alternatives", rootfs.path().join("etc")).expect("symlink");

        let dst = symlink_destination(&container(rootfs.path()), Path::new("/etc/foo"))
            .expect("destination");
        assert_eq!(dst, rootfs.path().join("opt/alternatives/foo"));
    }

    #[test]
    fn read_host_link_rejects_regular_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("libfoo.so");
        std::fs::write(&file, b"").expect("write");

        let err = read_host_link(&file).unwrap_err();
        assert!(matches!(
            err,
            InjectError::UnsupportedFileType {
                kind: FileKind::Regular,
                ..
            }
        ));
    }

    #[test]
    fn read_host_link_missing_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(read_host_link(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn project_replaces_existing_regular_file() {
        let host = tempfile::tempdir().expect("tempdir");
        let rootfs = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(host.path().join("etc")).expect("mkdir");
        symlink("/opt/vendor/vendor.conf", host.path().join("etc/vendor.conf")).expect("symlink");
        std::fs::create_dir_all(rootfs.path().join("etc")).expect("mkdir");
        std::fs::write(rootfs.path().join("etc/vendor.conf"), b"stale").expect("write");

        project_symlinks(host.path(), &container(rootfs.path()), &["/etc/vendor.conf"])
            .expect("project");

        assert_eq!(
            std::fs::read_link(rootfs.path().join("etc/vendor.conf")).expect("readlink"),
            PathBuf::from("/opt/vendor/vendor.conf")
        );
    }

    #[test]
    fn project_stops_at_first_failure_without_rollback() {
        let host = tempfile::tempdir().expect("tempdir");
        let rootfs = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(host.path().join("etc")).expect("mkdir");
        symlink("a.conf", host.path().join("etc/first")).expect("symlink");

        let err = project_symlinks(
            host.path(),
            &container(rootfs.path()),
            &["/etc/first", "/etc/missing", "/etc/never"],
        )
        .unwrap_err();

        assert!(matches!(err, InjectError::Io { .. }));
        assert!(rootfs.path().join("etc/first").symlink_metadata().is_ok());
        assert!(rootfs.path().join("etc/never").symlink_metadata().is_err());
    }
}
