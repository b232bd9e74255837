//! `hwinject apply` — Inject everything listed in host-file manifests.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use hwinject_common::constants::DEFAULT_MANIFEST_DIR;
use hwinject_core::manifest::{discover_manifests, load_manifests};
use hwinject_core::{FileInjector, SyscallMounter};

use super::Context;

/// Arguments for the `apply` command.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Directory scanned for `.csv` manifests when none are given.
    #[arg(long, default_value = DEFAULT_MANIFEST_DIR)]
    pub manifest_dir: PathBuf,

    /// Manifest files, applied in order.
    pub manifests: Vec<PathBuf>,
}

/// Executes the `apply` command.
///
/// Without `--dir`, library files are remapped into the container's
/// library directory. Files are mounted first so that recreated symlinks
/// point at targets that already exist inside the container.
///
/// # Errors
///
/// Returns an error if a manifest is unreadable or malformed, if mounting
/// fails (nothing stays mounted), or if a symlink cannot be recreated.
pub fn execute(args: ApplyArgs, ctx: &Context) -> anyhow::Result<()> {
    let manifests = if args.manifests.is_empty() {
        discover_manifests(&args.manifest_dir)
            .with_context(|| format!("scanning {}", args.manifest_dir.display()))?
    } else {
        args.manifests
    };
    let manifest = load_manifests(&manifests).context("loading manifests")?;
    if manifest.is_empty() {
        tracing::warn!(manifests = manifests.len(), "nothing to inject");
        return Ok(());
    }

    let hint = ctx
        .options
        .directory_hint
        .as_deref()
        .unwrap_or(ctx.container.libs_dir.as_path());
    let injector = FileInjector::new(SyscallMounter, ctx.resolver());
    let mounts = injector
        .mount_files(&ctx.options.root, &ctx.container, Some(hint), &manifest.files)
        .context("mounting host files")?;
    crate::output::print_paths(&mounts);

    hwinject_core::project_symlinks(&ctx.options.root, &ctx.container, &manifest.symlinks)
        .context("projecting host symlinks")
}
