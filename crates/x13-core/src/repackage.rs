//! Turns one upstream release archive into a wheel descriptor.
//!
//! The wheel carries the Python shim modules and license from the project
//! tree plus the X-13 executables found in the archive. Everything else in
//! the archive (documentation, sample `.spc` specs, stray files) is dropped.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};
use x13_schema::{BINARY_PREFIX, PACKAGE_NAME, ReleaseDescriptor, ReleaseVersion};

use crate::io::archive::{ArchiveError, ArchiveReader};
use crate::wheel::{PackageDescriptor, WheelError};

/// Shim modules copied into the wheel, relative to `<root>/src`.
pub const SHIM_MODULES: [&str; 2] = ["x13binary/__init__.py", "x13binary/__main__.py"];

/// Fixed `METADATA` headers after `Name` and `Version`.
pub const PACKAGE_METADATA: &[(&str, &str)] = &[
    ("Summary", "X13-ARIMA-SEATS installable binary through Python."),
    ("Description-Content-Type", "text/markdown"),
    ("License-Expression", "MIT"),
    ("License-File", "x13binary/LICENSE"),
    ("Classifier", "Development Status :: 4 - Beta"),
    ("Classifier", "Intended Audience :: Developers"),
    ("Classifier", "Programming Language :: Fortran"),
    ("Classifier", "Topic :: Scientific/Engineering :: Mathematics"),
    ("Classifier", "Topic :: Software Development :: Build Tools"),
    (
        "Project-URL",
        "Homepage, https://www.census.gov/data/software/x13as.X-13ARIMA-SEATS.html",
    ),
    (
        "Project-URL",
        "Source Code, https://github.com/bryceclaughton/x13binary-pypi",
    ),
    (
        "Project-URL",
        "Bug Tracker, https://github.com/bryceclaughton/x13binary-pypi/issues",
    ),
    ("Requires-Python", "~=3.5"),
];

#[derive(Error, Debug)]
pub enum RepackageError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Wheel error: {0}")]
    Wheel(#[from] WheelError),
}

/// Where the static inputs live in the project tree.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/LICENSE`
    pub fn license(&self) -> PathBuf {
        self.root.join("LICENSE")
    }

    /// `<root>/README.pypi.md`, the long description
    pub fn readme(&self) -> PathBuf {
        self.root.join("README.pypi.md")
    }

    /// `<root>/src/<module>`
    pub fn shim(&self, module: &str) -> PathBuf {
        self.root.join("src").join(module)
    }
}

/// Static files read once and shared by every platform's wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFiles {
    /// (wheel path, content) for each shim module, in [`SHIM_MODULES`] order
    pub shims: Vec<(String, Vec<u8>)>,
    pub license: Vec<u8>,
    pub description: Vec<u8>,
}

impl StaticFiles {
    /// Read the shim modules, license and description from the project.
    ///
    /// # Errors
    ///
    /// Returns [`RepackageError::Read`] naming the first file that cannot be
    /// read as UTF-8 text.
    pub fn load(layout: &ProjectLayout) -> Result<Self, RepackageError> {
        let shims = SHIM_MODULES
            .iter()
            .map(|module| Ok(((*module).to_string(), read_text(&layout.shim(module))?)))
            .collect::<Result<Vec<_>, RepackageError>>()?;

        Ok(Self {
            shims,
            license: read_text(&layout.license())?,
            description: read_text(&layout.readme())?,
        })
    }
}

/// Read a text file with universal newlines (CRLF and lone CR become LF),
/// so checkouts with any line ending produce the same wheel.
fn read_text(path: &Path) -> Result<Vec<u8>, RepackageError> {
    let text = fs::read_to_string(path).map_err(|source| RepackageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(text.replace("\r\n", "\n").replace('\r', "\n").into_bytes())
}

/// Decide where an archive entry goes in the wheel's scripts directory.
///
/// Strips the archive's top-level directory, then keeps only entries whose
/// remaining path starts with the binary prefix. Empty paths, anything under
/// `docs/` and `.spc` files are dropped.
pub fn script_name(entry_path: &str) -> Option<&str> {
    let (_, rest) = entry_path.split_once('/')?;
    if rest.is_empty() || rest.starts_with("docs/") || rest.ends_with(".spc") {
        return None;
    }
    rest.starts_with(BINARY_PREFIX).then_some(rest)
}

/// Build the wheel descriptor for one platform from its release archive.
///
/// # Errors
///
/// Fails if the archive format is unsupported or unreadable, or if two
/// archive entries would land on the same wheel path.
pub fn repackage(
    files: &StaticFiles,
    release_desc: &ReleaseDescriptor,
    release: &ReleaseVersion,
    archive: &[u8],
) -> Result<PackageDescriptor, RepackageError> {
    let version = release.wheel_version();
    let mut package =
        PackageDescriptor::new(PACKAGE_NAME, &version, release_desc.compatibility_tag());

    for (path, data) in &files.shims {
        package.add(path.as_str(), data.as_slice())?;
    }
    package.add(
        format!("{}/licenses/{PACKAGE_NAME}/LICENSE", package.dist_info()),
        files.license.as_slice(),
    )?;

    let scripts = format!("{}/scripts", package.data_dir());
    let mut reader = ArchiveReader::new(archive)?;
    for entry in reader.entries()? {
        let entry = entry?;
        let Some(name) = script_name(&entry.path) else {
            trace!(path = %entry.path, "dropping archive entry");
            continue;
        };
        debug!(path = %entry.path, mode = format_args!("{:o}", entry.mode), "staging script");
        package.add_with_mode(format!("{scripts}/{name}"), entry.data, entry.mode & 0xFFFF)?;
    }

    for (name, value) in PACKAGE_METADATA {
        package.push_metadata(*name, *value);
    }
    package.set_description(files.description.as_slice());

    Ok(package)
}
