//! `hwinject symlink` — Recreate host symlinks inside the container.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;

use super::Context;

/// Arguments for the `symlink` command.
#[derive(Args, Debug)]
pub struct SymlinkArgs {
    /// Host paths that are symlinks.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Executes the `symlink` command.
///
/// # Errors
///
/// Returns an error on the first symlink that cannot be recreated.
pub fn execute(args: SymlinkArgs, ctx: &Context) -> anyhow::Result<()> {
    hwinject_core::project_symlinks(&ctx.options.root, &ctx.container, &args.paths)
        .context("projecting host symlinks")
}
