//! Finding the installed X-13 executable at run time.
//!
//! A [`Locator`] walks its strategies in priority order and returns the first
//! candidate the [`Probe`] reports as an existing regular file.

pub mod layout;
pub mod strategy;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use layout::{Environment, HostOs, InstallLayout, PythonVersion, UserScheme};
pub use strategy::{Strategy, default_strategies};

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("x13as_html executable not found (expected at {})", expected.display())]
    NotFound { expected: PathBuf },
}

/// Filesystem existence check.
pub trait Probe {
    fn is_file(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsProbe;

impl Probe for OsProbe {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// A fixed set of paths that exist; everything else does not.
impl Probe for HashSet<PathBuf> {
    fn is_file(&self, path: &Path) -> bool {
        self.contains(path)
    }
}

#[derive(Debug)]
pub struct Locator {
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for Locator {
    fn default() -> Self {
        Self::new(default_strategies())
    }
}

impl Locator {
    pub fn new(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Return the first existing candidate.
    ///
    /// # Errors
    ///
    /// [`LocateError::NotFound`] names the default-scheme path when no
    /// strategy produced an existing file.
    pub fn locate(&self, layout: &InstallLayout, probe: &impl Probe) -> Result<PathBuf, LocateError> {
        for strategy in &self.strategies {
            for candidate in strategy.candidates(layout) {
                if probe.is_file(&candidate) {
                    debug!(strategy = strategy.name(), path = %candidate.display(), "found x13as_html");
                    return Ok(candidate);
                }
                debug!(strategy = strategy.name(), path = %candidate.display(), "candidate missing");
            }
        }

        Err(LocateError::NotFound {
            expected: layout.default_binary_path(),
        })
    }
}

/// Locate the executable for the running process.
///
/// The environment is read afresh on every call.
pub fn find_x13_bin() -> Result<PathBuf, LocateError> {
    Locator::default().locate(&InstallLayout::from_env(), &OsProbe)
}
