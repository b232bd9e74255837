//! Filesystem primitives used while injecting host files.
//!
//! Provides the bind-mount syscall wrapper and node creation/removal
//! inside the container rootfs.

pub mod mount;
pub mod node;

pub use mount::{Mounter, SyscallMounter};
