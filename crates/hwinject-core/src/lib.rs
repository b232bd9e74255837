//! # hwinject-core
//!
//! Injects vendor hardware-support files from the host into a container
//! rootfs at container-creation time.
//!
//! This crate provides:
//! - **Path resolution**: placement of each host file inside the container,
//!   remapping the host multiarch library directory when it diverges from
//!   the container's.
//! - **Mounting**: read-only bind mounts of host files with full rollback
//!   when any file fails.
//! - **Symlinks**: recreation of host symlinks pointing at their literal
//!   host targets.
//! - **Manifests**: parsing of vendor `kind, path` host-file lists.
//!
//! Mount syscalls sit behind the [`filesystem::Mounter`] trait; the real
//! implementation wraps `mount(2)` via `nix`.

pub mod filesystem;
pub mod inject;
pub mod manifest;
pub mod path;
pub mod resolver;
pub mod symlink;

pub use filesystem::{Mounter, SyscallMounter};
pub use inject::{FileInjector, MountList};
pub use manifest::{Manifest, load_manifests, parse_manifest};
pub use resolver::{PathResolver, Placement, Resolution};
pub use symlink::project_symlinks;
