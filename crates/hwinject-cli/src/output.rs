//! Formatted output helpers for CLI commands.
//!
//! Results go to stdout, one item per line, so they can be piped into
//! whatever later unmounts them. Logs go to stderr.

use std::path::{Path, PathBuf};

use hwinject_core::Resolution;

/// Prints a single line to stdout.
#[allow(clippy::print_stdout)]
pub fn print_line(line: &str) {
    println!("{line}");
}

/// Prints one path per line.
pub fn print_paths<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) {
    for path in paths {
        print_line(&path.display().to_string());
    }
}

/// Prints `paths` as a JSON array of strings.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json(paths: &[PathBuf]) -> anyhow::Result<()> {
    print_line(&serde_json::to_string(paths)?);
    Ok(())
}

/// Formats a placement decision as `<strategy> <host path> -> <destination>`.
#[must_use]
pub fn format_resolution(path: &Path, resolution: &Resolution) -> String {
    format!(
        "{:<14} {} -> {}",
        resolution.placement.to_string(),
        path.display(),
        resolution.destination.display()
    )
}
