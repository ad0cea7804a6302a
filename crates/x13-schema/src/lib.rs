//! Shared types and constants for building x13binary wheels.
//!
//! Everything here is static data: which upstream archives exist, how their
//! release versions are spelled, and the names the wheel and the runtime
//! locator agree on.

pub mod hash;
pub mod platform;
pub mod version;

// Re-exports
pub use hash::Sha256Hash;
pub use platform::{ArchiveFormat, Platform, RELEASES, ReleaseDescriptor};
pub use version::{ReleaseVersion, VersionError};

/// Distribution name of the wheel.
pub const PACKAGE_NAME: &str = "x13binary";

/// File name prefix shared by every X-13 executable in the upstream archives.
pub const BINARY_PREFIX: &str = "x13as_html";

/// Upstream release packaged when no other release is requested.
pub const DEFAULT_RELEASE: &str = "v1-1-b61";

/// Root of the Census Bureau program archive tree.
pub const DEFAULT_BASE_URL: &str = "https://www2.census.gov/software/x-13arima-seats/x13as";

/// Magic bytes opening a gzip stream.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Magic bytes opening a zip local file header (`PK\x03\x04`).
pub const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Executable file name of the X-13 binary on the current platform.
///
/// ```
/// let name = x13_schema::binary_file_name();
/// assert!(name.starts_with("x13as_html"));
/// ```
pub fn binary_file_name() -> String {
    format!("{BINARY_PREFIX}{}", std::env::consts::EXE_SUFFIX)
}
