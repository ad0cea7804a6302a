//! Build pipeline: download each platform's release and write its wheel.
//!
//! Platforms are processed one after another. The first failure aborts the
//! run; wheels already written stay on disk.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Client;
use thiserror::Error;
use tracing::info;
use x13_schema::{DEFAULT_BASE_URL, Platform, RELEASES, ReleaseVersion, Sha256Hash, VersionError};

use crate::io::download::{self, DownloadError};
use crate::repackage::{self, ProjectLayout, RepackageError, StaticFiles};
use crate::reporter::Reporter;
use crate::wheel::{self, WheelError};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Repackaging failed: {0}")]
    Repackage(#[from] RepackageError),

    #[error("Wheel error: {0}")]
    Wheel(#[from] WheelError),

    #[error("Invalid release: {0}")]
    Version(#[from] VersionError),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What to build and where.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub release: ReleaseVersion,
    /// Root of the upstream archive tree
    pub base_url: String,
    /// Directory receiving the wheels; created when missing
    pub outdir: PathBuf,
    /// Project holding `LICENSE`, `README.pypi.md` and the shim modules
    pub project_root: PathBuf,
    /// Platforms to build, in order. Empty means every platform.
    pub platforms: Vec<Platform>,
}

impl BuildOptions {
    /// Options for `release` with the upstream base URL, writing to `dist/`.
    pub fn new(release: ReleaseVersion) -> Self {
        Self {
            release,
            base_url: DEFAULT_BASE_URL.to_string(),
            outdir: PathBuf::from("dist"),
            project_root: PathBuf::from("."),
            platforms: Vec::new(),
        }
    }

    fn selected(&self) -> Vec<Platform> {
        if self.platforms.is_empty() {
            RELEASES.iter().map(|d| d.platform).collect()
        } else {
            self.platforms.clone()
        }
    }
}

/// One wheel produced by [`fetch_and_write_wheels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltWheel {
    pub platform: Platform,
    pub archive_url: String,
    pub archive_sha256: Sha256Hash,
    pub path: PathBuf,
    pub sha256: Sha256Hash,
}

/// Download, repackage and write the wheel of every selected platform.
///
/// # Errors
///
/// Stops at the first download, archive, I/O or wheel failure.
pub async fn fetch_and_write_wheels(
    client: &Client,
    options: &BuildOptions,
    reporter: &dyn Reporter,
) -> Result<Vec<BuiltWheel>, BuildError> {
    fs::create_dir_all(&options.outdir).map_err(|source| BuildError::Io {
        path: options.outdir.clone(),
        source,
    })?;
    let files = StaticFiles::load(&ProjectLayout::new(&options.project_root))?;

    let mut built = Vec::new();
    for platform in options.selected() {
        reporter.platform(platform);
        built.push(build_platform(client, options, &files, platform, reporter).await?);
    }

    info!(count = built.len(), outdir = %options.outdir.display(), "build complete");
    Ok(built)
}

async fn build_platform(
    client: &Client,
    options: &BuildOptions,
    files: &StaticFiles,
    platform: Platform,
    reporter: &dyn Reporter,
) -> Result<BuiltWheel, BuildError> {
    let descriptor = platform.descriptor();
    let url = descriptor.download_url(&options.base_url, &options.release);

    let archive = download::fetch(client, &url).await?;
    reporter.fetched(&archive.url, &archive.sha256);

    let package = repackage::repackage(files, descriptor, &options.release, &archive.bytes)?;
    let path = wheel::write_wheel(&package, &options.outdir)?;
    let sha256 = hash_file(&path)?;
    reporter.built(&path, &sha256);

    Ok(BuiltWheel {
        platform,
        archive_url: archive.url,
        archive_sha256: archive.sha256,
        path,
        sha256,
    })
}

fn hash_file(path: &Path) -> Result<Sha256Hash, BuildError> {
    Sha256Hash::compute_file(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}
