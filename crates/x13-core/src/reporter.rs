//! Reporter trait for dependency injection
//!
//! Lets the build pipeline publish progress and checksums without knowing
//! whether it is talking to a terminal or a test.

use std::path::Path;

use x13_schema::{Platform, Sha256Hash};

pub trait Reporter: Send + Sync {
    /// A platform's build is starting.
    fn platform(&self, platform: Platform);

    /// An upstream archive was downloaded.
    fn fetched(&self, url: &str, sha256: &Sha256Hash);

    /// A wheel was written to disk.
    fn built(&self, path: &Path, sha256: &Sha256Hash);
}

/// A reporter that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn platform(&self, _platform: Platform) {}
    fn fetched(&self, _url: &str, _sha256: &Sha256Hash) {}
    fn built(&self, _path: &Path, _sha256: &Sha256Hash) {}
}
