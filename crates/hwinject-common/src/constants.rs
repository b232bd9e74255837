//! System-wide constants and default paths.

/// Host multiarch library directory used when none is baked in at build time.
pub const DEFAULT_HOST_LIBDIR: &str = "/usr/lib/aarch64-linux-gnu";

/// Returns the host library directory baked in at build time.
///
/// Reads `HWINJECT_HOST_LIBDIR` from the compile environment, falling back
/// to [`DEFAULT_HOST_LIBDIR`].
#[must_use]
pub const fn host_lib_dir() -> &'static str {
    match option_env!("HWINJECT_HOST_LIBDIR") {
        Some(dir) => dir,
        None => DEFAULT_HOST_LIBDIR,
    }
}

/// Base-name prefix identifying shared libraries.
pub const LIBRARY_PREFIX: &str = "lib";

/// Maximum number of symlinks followed while resolving one path.
pub const MAX_SYMLINK_HOPS: usize = 40;

/// Default host root prefix applied to requested paths.
pub const DEFAULT_HOST_ROOT: &str = "/";

/// Directory vendor packages drop host-file manifests into.
pub const DEFAULT_MANIFEST_DIR: &str = "/etc/nvidia-container-runtime/host-files-for-container.d";

/// File extension of host-file manifests.
pub const MANIFEST_EXTENSION: &str = "csv";
