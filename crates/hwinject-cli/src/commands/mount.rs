//! `hwinject mount` — Bind-mount host files read-only into the container.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use hwinject_core::{FileInjector, SyscallMounter};

use super::Context;

/// Arguments for the `mount` command.
#[derive(Args, Debug)]
pub struct MountArgs {
    /// Print the mounted destinations as a JSON array.
    #[arg(long)]
    pub json: bool,

    /// Host paths to mount.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Executes the `mount` command.
///
/// # Errors
///
/// Returns an error if any file fails to mount; nothing stays mounted.
pub fn execute(args: MountArgs, ctx: &Context) -> anyhow::Result<()> {
    let injector = FileInjector::new(SyscallMounter, ctx.resolver());
    let mounts = injector
        .mount_files(
            &ctx.options.root,
            &ctx.container,
            ctx.options.directory_hint.as_deref(),
            &args.paths,
        )
        .context("mounting host files")?;

    if args.json {
        crate::output::print_json(mounts.as_slice())?;
    } else {
        crate::output::print_paths(&mounts);
    }
    Ok(())
}
