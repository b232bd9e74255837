//! Creation, inspection, and removal of filesystem nodes inside a rootfs.

use std::fs::{DirBuilder, FileType, OpenOptions, Permissions};
use std::io;
use std::os::unix::fs::{DirBuilderExt, FileTypeExt, MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;

use hwinject_common::error::{InjectError, Result};
use hwinject_common::types::FileKind;

const PERMISSION_BITS: u32 = 0o7777;
const DIR_MODE: u32 = 0o755;

/// Returns the kind of the node at `path` without following a final symlink.
///
/// # Errors
///
/// Returns [`InjectError::Io`] if `path` cannot be inspected.
pub fn file_kind(path: &Path) -> Result<FileKind> {
    let meta = std::fs::symlink_metadata(path).map_err(|e| InjectError::io(path, e))?;
    Ok(kind_of(meta.file_type()))
}

fn kind_of(ft: FileType) -> FileKind {
    if ft.is_symlink() {
        FileKind::Symlink
    } else if ft.is_file() {
        FileKind::Regular
    } else if ft.is_dir() {
        FileKind::Directory
    } else if ft.is_block_device() || ft.is_char_device() {
        FileKind::Device
    } else {
        FileKind::Other
    }
}

/// Returns the full mode of the regular file at `path`, following symlinks.
///
/// # Errors
///
/// Returns [`InjectError::Io`] if `path` cannot be stat'ed and
/// [`InjectError::UnsupportedFileType`] if it is not a regular file.
pub fn file_mode(path: &Path) -> Result<u32> {
    let meta = std::fs::metadata(path).map_err(|e| InjectError::io(path, e))?;
    if !meta.is_file() {
        return Err(InjectError::UnsupportedFileType {
            path: path.to_path_buf(),
            kind: kind_of(meta.file_type()),
        });
    }
    Ok(meta.mode())
}

fn create_parents(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        DirBuilder::new()
            .recursive(true)
            .mode(DIR_MODE)
            .create(parent)
            .map_err(|e| InjectError::io(parent, e))?;
    }
    Ok(())
}

/// Creates an empty file at `path` to serve as a bind-mount target.
///
/// Missing parent directories are created. An existing regular file is
/// reused as-is. The file ends up owned by `uid:gid` with the permission
/// bits of `mode`. A symlink at `path` is never followed; owner and mode
/// are applied through the opened handle.
///
/// # Errors
///
/// Returns [`InjectError::UnsupportedFileType`] if `path` is a symlink or
/// some other non-regular node, and [`InjectError::Io`] if any step fails,
/// including when `path` already exists as a directory.
pub fn create_placeholder(path: &Path, uid: u32, gid: u32, mode: u32) -> Result<()> {
    create_parents(path)?;
    let perms = mode & PERMISSION_BITS;
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(perms)
        .custom_flags(libc::O_NOFOLLOW | libc::O_NONBLOCK)
        .open(path)
        .map_err(|e| match e.raw_os_error() {
            Some(libc::ELOOP) => InjectError::UnsupportedFileType {
                path: path.to_path_buf(),
                kind: FileKind::Symlink,
            },
            _ => InjectError::io(path, e),
        })?;

    let meta = file.metadata().map_err(|e| InjectError::io(path, e))?;
    if !meta.is_file() {
        return Err(InjectError::UnsupportedFileType {
            path: path.to_path_buf(),
            kind: kind_of(meta.file_type()),
        });
    }
    std::os::unix::fs::fchown(&file, Some(uid), Some(gid)).map_err(|e| InjectError::io(path, e))?;
    file.set_permissions(Permissions::from_mode(perms))
        .map_err(|e| InjectError::io(path, e))?;
    Ok(())
}

/// Creates a symlink at `path` pointing at `target`, owned by `uid:gid`.
///
/// `target` is stored literally; it is not resolved.
///
/// # Errors
///
/// Returns [`InjectError::Io`] if parent creation, link creation, or
/// `lchown` fails.
pub fn create_symlink(path: &Path, target: &Path, uid: u32, gid: u32) -> Result<()> {
    create_parents(path)?;
    std::os::unix::fs::symlink(target, path).map_err(|e| InjectError::io(path, e))?;
    std::os::unix::fs::lchown(path, Some(uid), Some(gid)).map_err(|e| InjectError::io(path, e))?;
    Ok(())
}

/// Removes whatever node exists at `path`.
///
/// Files and symlinks are unlinked, directories are removed with `rmdir`.
/// A missing node is not an error.
///
/// # Errors
///
/// Returns [`InjectError::Remove`] for any other failure, such as a
/// non-empty directory.
pub fn remove_node(path: &Path) -> Result<()> {
    let result = match std::fs::remove_file(path) {
        Err(e) if e.raw_os_error() == Some(libc::EISDIR) => std::fs::remove_dir(path),
        other => other,
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(InjectError::Remove {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
