//! Path construction confined to a root directory.
//!
//! Every helper here enforces the platform `PATH_MAX` limit and refuses to
//! produce a path that climbs out of the base it was built under.

use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Component, Path, PathBuf};

use hwinject_common::constants::MAX_SYMLINK_HOPS;
use hwinject_common::error::{InjectError, Result};

/// Platform maximum path length, including the terminating NUL.
#[allow(clippy::cast_sign_loss)]
pub const PATH_MAX: usize = libc::PATH_MAX as usize;

fn check_len(path: PathBuf) -> Result<PathBuf> {
    if path.as_os_str().len() >= PATH_MAX {
        return Err(InjectError::PathTooLong { path });
    }
    Ok(path)
}

/// Places `rel` beneath `base`, treating an absolute `rel` as relative.
///
/// `/usr/lib/libfoo.so` under `/rootfs` becomes `/rootfs/usr/lib/libfoo.so`.
///
/// # Errors
///
/// Returns [`InjectError::InvalidPath`] if `rel` contains a `..` component
/// and [`InjectError::PathTooLong`] if the result reaches `PATH_MAX`.
pub fn join_under(base: &Path, rel: &Path) -> Result<PathBuf> {
    let mut out = base.to_path_buf();
    for comp in rel.components() {
        match comp {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                return Err(InjectError::InvalidPath {
                    path: rel.to_path_buf(),
                    reason: "parent directory components are not allowed",
                });
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    check_len(out)
}

/// Returns the final component of `path`.
///
/// # Errors
///
/// Returns [`InjectError::InvalidPath`] when `path` has no file name
/// (for example `/` or a path ending in `..`).
pub fn base_name(path: &Path) -> Result<&OsStr> {
    path.file_name().ok_or_else(|| InjectError::InvalidPath {
        path: path.to_path_buf(),
        reason: "no file name",
    })
}

fn split(path: &Path) -> VecDeque<OsString> {
    path.components()
        .filter_map(|comp| match comp {
            Component::Normal(part) => Some(part.to_os_string()),
            Component::ParentDir => Some(OsString::from("..")),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => None,
        })
        .collect()
}

/// Resolves `path` as seen from inside `rootfs`, following symlinks.
///
/// Absolute link targets restart at `rootfs` and `..` stops at `rootfs`, so
/// the result always lies under `rootfs`. Resolution stops at the first
/// component that does not exist; the remainder is appended verbatim.
///
/// # Errors
///
/// Returns [`InjectError::Resolve`] if a component cannot be inspected or
/// read, or if more than [`MAX_SYMLINK_HOPS`] links are followed, and
/// [`InjectError::PathTooLong`] if any intermediate path overflows.
pub fn resolve_in_root(rootfs: &Path, path: &Path) -> Result<PathBuf> {
    let mut pending = split(path);
    let mut resolved = PathBuf::new();
    let mut hops = 0;
    let mut missing = false;

    while let Some(part) = pending.pop_front() {
        if part == ".." {
            let _ = resolved.pop();
            continue;
        }
        let candidate = resolved.join(&part);
        if missing {
            resolved = candidate;
            continue;
        }

        let host = check_len(rootfs.join(&candidate))?;
        match std::fs::symlink_metadata(&host) {
            Ok(meta) if meta.file_type().is_symlink() => {
                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    return Err(InjectError::Resolve {
                        path: path.to_path_buf(),
                        source: io::Error::from_raw_os_error(libc::ELOOP),
                    });
                }
                let target = std::fs::read_link(&host).map_err(|e| InjectError::Resolve {
                    path: host.clone(),
                    source: e,
                })?;
                if target.is_absolute() {
                    resolved = PathBuf::new();
                }
                let mut next = split(&target);
                next.extend(pending.drain(..));
                pending = next;
            }
            Ok(_) => resolved = candidate,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                missing = true;
                resolved = candidate;
            }
            Err(e) => {
                return Err(InjectError::Resolve {
                    path: host,
                    source: e,
                });
            }
        }
    }

    check_len(rootfs.join(resolved))
}

/// Resolves the directory of `path` inside `rootfs` and appends its base
/// name, leaving the final component itself unresolved.
///
/// # Errors
///
/// Returns [`InjectError::InvalidPath`] if `path` contains `..` or has no
/// base name, plus any error of [`resolve_in_root`].
pub fn resolve_parent_in_root(rootfs: &Path, path: &Path) -> Result<PathBuf> {
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(InjectError::InvalidPath {
            path: path.to_path_buf(),
            reason: "parent directory components are not allowed",
        });
    }
    let name = base_name(path)?;
    let dir = resolve_in_root(rootfs, path.parent().unwrap_or_else(|| Path::new("/")))?;
    join_under(&dir, Path::new(name))
}
