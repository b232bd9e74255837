//! Bind-mount primitives for injecting host files.
//!
//! A read-only bind is two `mount(2)` calls: the initial bind inherits the
//! source mount's flags, so `MS_RDONLY|MS_NODEV|MS_NOSUID` can only be
//! applied by a second `MS_REMOUNT` of the same target.

use std::path::Path;

use hwinject_common::error::{InjectError, Result};
use hwinject_common::types::MountStage;

/// The mount operations the injection core depends on.
pub trait Mounter {
    /// Bind-mounts `src` onto the existing node `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::Mount`] with [`MountStage::Bind`] on failure.
    fn bind(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Remounts the bind at `dst` read-only, without devices or setuid.
    ///
    /// `src` is only used to report which file failed.
    ///
    /// # Errors
    ///
    /// Returns [`InjectError::Mount`] with [`MountStage::Remount`] on failure.
    fn remount_readonly(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Detaches whatever is mounted at `dst`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unmount syscall fails.
    fn unmount(&self, dst: &Path) -> Result<()>;
}

/// [`Mounter`] backed by the real `mount(2)` and `umount2(2)` syscalls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyscallMounter;

#[cfg(target_os = "linux")]
impl Mounter for SyscallMounter {
    fn bind(&self, src: &Path, dst: &Path) -> Result<()> {
        use nix::mount::{MsFlags, mount};

        mount(Some(src), dst, None::<&str>, MsFlags::MS_BIND, None::<&str>).map_err(|e| {
            InjectError::Mount {
                stage: MountStage::Bind,
                src: src.to_path_buf(),
                target: dst.to_path_buf(),
                source: e.into(),
            }
        })
    }

    fn remount_readonly(&self, src: &Path, dst: &Path) -> Result<()> {
        use nix::mount::{MsFlags, mount};

        let flags = MsFlags::MS_BIND
            | MsFlags::MS_REMOUNT
            | MsFlags::MS_RDONLY
            | MsFlags::MS_NODEV
            | MsFlags::MS_NOSUID;
        mount(None::<&str>, dst, None::<&str>, flags, None::<&str>).map_err(|e| {
            InjectError::Mount {
                stage: MountStage::Remount,
                src: src.to_path_buf(),
                target: dst.to_path_buf(),
                source: e.into(),
            }
        })
    }

    fn unmount(&self, dst: &Path) -> Result<()> {
        nix::mount::umount2(dst, nix::mount::MntFlags::MNT_DETACH)
            .map_err(|e| InjectError::io(dst, e.into()))
    }
}

#[cfg(not(target_os = "linux"))]
impl Mounter for SyscallMounter {
    fn bind(&self, src: &Path, dst: &Path) -> Result<()> {
        Err(unsupported(MountStage::Bind, src, dst))
    }

    fn remount_readonly(&self, src: &Path, dst: &Path) -> Result<()> {
        Err(unsupported(MountStage::Remount, src, dst))
    }

    fn unmount(&self, _dst: &Path) -> Result<()> {
        Err(InjectError::Config {
            message: "Linux required for bind mounts".into(),
        })
    }
}

#[cfg(not(target_os = "linux"))]
fn unsupported(stage: MountStage, src: &Path, dst: &Path) -> InjectError {
    InjectError::Mount {
        stage,
        src: src.to_path_buf(),
        target: dst.to_path_buf(),
        source: std::io::Error::from(std::io::ErrorKind::Unsupported),
    }
}

impl<M: Mounter + ?Sized> Mounter for &M {
    fn bind(&self, src: &Path, dst: &Path) -> Result<()> {
        (**self).bind(src, dst)
    }

    fn remount_readonly(&self, src: &Path, dst: &Path) -> Result<()> {
        (**self).remount_readonly(src, dst)
    }

    fn unmount(&self, dst: &Path) -> Result<()> {
        (**self).unmount(dst)
    }
}
