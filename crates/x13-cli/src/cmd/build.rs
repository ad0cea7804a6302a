//! Build command - fetch upstream archives and write wheels

use std::path::PathBuf;

use anyhow::{Context, Result};
use x13_core::io::download;
use x13_core::{BuildOptions, fetch_and_write_wheels};
use x13_schema::{Platform, ReleaseVersion};

use crate::reporter::ConsoleReporter;

/// Build one wheel per selected platform
pub async fn build(
    release: &str,
    base_url: String,
    outdir: PathBuf,
    project_root: PathBuf,
    platforms: Vec<Platform>,
) -> Result<()> {
    let release: ReleaseVersion = release
        .parse()
        .with_context(|| format!("Invalid release '{release}'"))?;

    let options = BuildOptions {
        base_url,
        outdir,
        project_root,
        platforms,
        ..BuildOptions::new(release)
    };

    let client = download::build_client()?;
    fetch_and_write_wheels(&client, &options, &ConsoleReporter)
        .await
        .context("Wheel build failed")?;

    Ok(())
}
