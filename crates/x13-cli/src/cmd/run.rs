//! Run command - execute the installed binary

use anyhow::{Context, Result};

/// Run x13as_html with `args`, exiting with its status
pub fn run(args: &[String]) -> Result<()> {
    let bin_path = x13_core::find_x13_bin()?;
    tracing::debug!(path = %bin_path.display(), ?args, "running x13as_html");

    let status = std::process::Command::new(&bin_path)
        .args(args)
        .status()
        .with_context(|| format!("Failed to execute {}", bin_path.display()))?;

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }

    Ok(())
}
