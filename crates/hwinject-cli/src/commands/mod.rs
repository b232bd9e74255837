//! CLI command definitions and dispatch.

pub mod apply;
pub mod mount;
pub mod resolve;
pub mod symlink;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use hwinject_common::config::{ContainerConfig, InjectOptions};
use hwinject_common::constants;
use hwinject_common::types::HostLibDir;
use hwinject_core::PathResolver;

/// hwinject — inject vendor host files into a container rootfs.
#[derive(Parser, Debug)]
#[command(name = "hwinject", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Target container.
    #[command(flatten)]
    pub container: ContainerArgs,

    /// Host root prefixed onto every requested path.
    #[arg(long, global = true, default_value = constants::DEFAULT_HOST_ROOT)]
    pub root: PathBuf,

    /// Host multiarch library directory.
    #[arg(long, global = true, default_value = constants::host_lib_dir())]
    pub host_lib_dir: String,

    /// Preferred container directory for files under the host library directory.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Log at debug level regardless of `RUST_LOG`.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Where the target container's configuration comes from.
#[derive(Args, Debug)]
pub struct ContainerArgs {
    /// JSON file with `rootfs`, `libs_dir`, `uid` and `gid`.
    #[arg(long, global = true, env = "HWINJECT_CONTAINER_CONFIG")]
    pub container_config: Option<PathBuf>,

    /// Container root filesystem.
    #[arg(long, global = true, env = "HWINJECT_ROOTFS")]
    pub rootfs: Option<PathBuf>,

    /// In-container library directory.
    #[arg(long, global = true, default_value = constants::host_lib_dir())]
    pub libs_dir: PathBuf,

    /// Owner of created nodes.
    #[arg(long, global = true, default_value_t = 0)]
    pub uid: u32,

    /// Group of created nodes.
    #[arg(long, global = true, default_value_t = 0)]
    pub gid: u32,
}

impl ContainerArgs {
    /// Builds the container configuration, preferring `--container-config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON file is unusable, or if neither a
    /// config file nor `--rootfs` was given.
    pub fn load(&self) -> anyhow::Result<ContainerConfig> {
        if let Some(path) = &self.container_config {
            return ContainerConfig::from_json_file(path)
                .with_context(|| format!("loading container config {}", path.display()));
        }
        let rootfs = self
            .rootfs
            .clone()
            .context("either --container-config or --rootfs is required")?;
        let config = ContainerConfig {
            rootfs,
            libs_dir: self.libs_dir.clone(),
            uid: self.uid,
            gid: self.gid,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bind-mount host files read-only into the container.
    Mount(mount::MountArgs),
    /// Recreate host symlinks inside the container.
    Symlink(symlink::SymlinkArgs),
    /// Mount files and recreate symlinks listed in host-file manifests.
    Apply(apply::ApplyArgs),
    /// Show where host files would be placed, without mounting.
    Resolve(resolve::ResolveArgs),
}

/// Settings shared by every subcommand.
#[derive(Debug)]
pub struct Context {
    /// Target container.
    pub container: ContainerConfig,
    /// Host root, host library directory, and directory hint.
    pub options: InjectOptions,
}

impl Context {
    /// Returns a resolver for this context's host layout.
    #[must_use]
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.options.host_lib_dir.clone())
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the container configuration is invalid or the
/// command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context {
        container: cli.container.load()?,
        options: InjectOptions {
            root: cli.root,
            host_lib_dir: HostLibDir::new(&cli.host_lib_dir),
            directory_hint: cli.dir,
        },
    };
    tracing::debug!(
        rootfs = %ctx.container.rootfs.display(),
        host_lib_dir = %ctx.options.host_lib_dir,
        "container loaded"
    );

    match cli.command {
        Command::Mount(args) => mount::execute(args, &ctx),
        Command::Symlink(args) => symlink::execute(args, &ctx),
        Command::Apply(args) => apply::execute(args, &ctx),
        Command::Resolve(args) => resolve::execute(args, &ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mount_with_global_container_flags() {
        let cli = Cli::try_parse_from([
            "hwinject",
            "--rootfs",
            "/var/lib/c1/rootfs",
            "--uid",
            "1000",
            "mount",
            "--dir",
            "/usr/lib/aarch64-linux-gnu",
            "/usr/lib/aarch64-linux-gnu/libfoo.so",
        ])
        .expect("parse");

        let config = cli.container.load().expect("config");
        assert_eq!(config.rootfs, PathBuf::from("/var/lib/c1/rootfs"));
        assert_eq!(config.uid, 1000);
        assert_eq!(config.gid, 0);
        assert_eq!(cli.dir, Some(PathBuf::from("/usr/lib/aarch64-linux-gnu")));
        match cli.command {
            Command::Mount(args) => assert_eq!(args.paths.len(), 1),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn mount_requires_at_least_one_path() {
        let result = Cli::try_parse_from(["hwinject", "--rootfs", "/r", "mount"]);
        assert!(result.is_err());
    }

    #[test]
    fn load_without_rootfs_fails() {
        let cli = Cli::try_parse_from(["hwinject", "symlink", "/etc/alternatives/foo"])
            .expect("parse");
        assert!(cli.container.load().is_err());
    }

    #[test]
    fn load_prefers_container_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("c.json");
        std::fs::write(
            &path,
            r#"{"rootfs":"/from/file","libs_dir":"/usr/lib64","uid":7,"gid":8}"#,
        )
        .expect("write");

        let cli = Cli::try_parse_from([
            "hwinject",
            "--container-config",
            path.to_str().expect("utf8"),
            "--rootfs",
            "/ignored",
            "resolve",
            "/etc/vendor.conf",
        ])
        .expect("parse");

        let config = cli.container.load().expect("config");
        assert_eq!(config.rootfs, PathBuf::from("/from/file"));
        assert_eq!(config.libs_dir, PathBuf::from("/usr/lib64"));
        assert_eq!((config.uid, config.gid), (7, 8));
    }

    #[test]
    fn relative_rootfs_is_rejected() {
        let cli = Cli::try_parse_from(["hwinject", "--rootfs", "rootfs", "resolve", "/etc/x"])
            .expect("parse");
        assert!(cli.container.load().is_err());
    }
}
