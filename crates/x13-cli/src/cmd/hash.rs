//! Hash command

use anyhow::{Context, Result};
use std::path::PathBuf;
use x13_schema::Sha256Hash;

/// Compute SHA256 hash of files
pub fn hash(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let hash = Sha256Hash::compute_file(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        println!("{hash} {}", file.display());
    }
    Ok(())
}
