//! `hwinject resolve` — Show where host files would land in the container.

use std::path::PathBuf;

use clap::Args;

use super::Context;

/// Arguments for the `resolve` command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Host paths to place.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Executes the `resolve` command.
///
/// # Errors
///
/// Returns an error if a destination cannot be computed.
pub fn execute(args: ResolveArgs, ctx: &Context) -> anyhow::Result<()> {
    let resolver = ctx.resolver();
    let hint = ctx.options.directory_hint.as_deref();
    for path in &args.paths {
        let resolution = resolver.resolve(&ctx.container.rootfs, path, hint)?;
        crate::output::print_line(&crate::output::format_resolution(path, &resolution));
    }
    Ok(())
}
