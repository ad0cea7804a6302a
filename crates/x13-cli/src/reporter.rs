//! Console reporter: checksum lines on stdout.

use std::path::Path;

use x13_core::Reporter;
use x13_schema::{Platform, Sha256Hash};

/// Prints `<sha256> <url>` per archive and `  <sha256> <wheel>` per wheel.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn platform(&self, platform: Platform) {
        tracing::info!(%platform, "building wheel");
    }

    fn fetched(&self, url: &str, sha256: &Sha256Hash) {
        println!("{sha256} {url}");
    }

    fn built(&self, path: &Path, sha256: &Sha256Hash) {
        println!("  {sha256} {}", path.display());
    }
}
