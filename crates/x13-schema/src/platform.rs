//! Supported upstream platforms and their release archives.
//!
//! The Census Bureau publishes one archive per platform. Each one maps to a
//! single wheel platform tag; the table below is the whole configuration.

use crate::{BINARY_PREFIX, ReleaseVersion};

/// A platform the upstream project ships a pre-built binary for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// 64-bit Windows build, shipped as a zip archive.
    Windows,
    /// 64-bit Linux build, shipped as a gzipped tarball.
    UnixLinux,
}

impl Platform {
    /// Path segment used by the upstream download tree.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::UnixLinux => "unix-linux",
        }
    }

    /// Static release descriptor for this platform.
    pub fn descriptor(&self) -> &'static ReleaseDescriptor {
        match self {
            Self::Windows => &RELEASES[0],
            Self::UnixLinux => &RELEASES[1],
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" | "win" | "win_amd64" => Ok(Self::Windows),
            "unix-linux" | "linux" | "manylinux" => Ok(Self::UnixLinux),
            _ => Err(format!("Unknown platform: {s}")),
        }
    }
}

/// Container format of an upstream release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// PKZIP archive.
    Zip,
    /// Gzip-compressed tarball.
    TarGz,
}

impl ArchiveFormat {
    /// File suffix used by upstream download URLs.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Zip => ".zip",
            Self::TarGz => ".tar.gz",
        }
    }

    /// Detect the container format from leading magic bytes.
    ///
    /// Returns `None` for anything that is neither gzip nor zip, including
    /// inputs shorter than the magic.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&crate::GZIP_MAGIC) {
            Some(Self::TarGz)
        } else if bytes.starts_with(&crate::ZIP_MAGIC) {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Everything needed to fetch one platform's archive and tag its wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Upstream platform.
    pub platform: Platform,
    /// Wheel platform tag (the last component of the compatibility tag).
    pub wheel_platform: &'static str,
    /// Container format upstream publishes for this platform.
    pub format: ArchiveFormat,
}

/// Every supported platform, in build order.
pub static RELEASES: [ReleaseDescriptor; 2] = [
    ReleaseDescriptor {
        platform: Platform::Windows,
        wheel_platform: "win_amd64",
        format: ArchiveFormat::Zip,
    },
    ReleaseDescriptor {
        platform: Platform::UnixLinux,
        wheel_platform: "manylinux_2_12_x86_64.manylinux2010_x86_64",
        format: ArchiveFormat::TarGz,
    },
];

impl ReleaseDescriptor {
    /// Full download URL of the archive for `release`.
    ///
    /// ```
    /// use x13_schema::{Platform, ReleaseVersion};
    ///
    /// let release: ReleaseVersion = "v1-1-b61".parse().unwrap();
    /// let url = Platform::Windows
    ///     .descriptor()
    ///     .download_url("https://example.com/x13as", &release);
    /// assert_eq!(
    ///     url,
    ///     "https://example.com/x13as/windows/program-archives/x13as_html-v1-1-b61.zip"
    /// );
    /// ```
    pub fn download_url(&self, base_url: &str, release: &ReleaseVersion) -> String {
        format!(
            "{}/{}/program-archives/{BINARY_PREFIX}-{}{}",
            base_url.trim_end_matches('/'),
            self.platform,
            release.upstream(),
            self.format.extension(),
        )
    }

    /// Wheel compatibility tag, e.g. `py3-none-win_amd64`.
    pub fn compatibility_tag(&self) -> String {
        format!("py3-none-{}", self.wheel_platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_detects_gzip_and_zip() {
        assert_eq!(
            ArchiveFormat::sniff(&[0x1F, 0x8B, 0x08, 0x00]),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(
            ArchiveFormat::sniff(b"PK\x03\x04rest"),
            Some(ArchiveFormat::Zip)
        );
    }

    #[test]
    fn sniff_rejects_unknown_and_short_input() {
        assert_eq!(ArchiveFormat::sniff(b"BZh91AY"), None);
        assert_eq!(ArchiveFormat::sniff(b"PK\x05\x06"), None);
        assert_eq!(ArchiveFormat::sniff(b"PK"), None);
        assert_eq!(ArchiveFormat::sniff(&[]), None);
    }

    #[test]
    fn linux_url_uses_tarball_suffix() {
        let release: ReleaseVersion = "v1-1-b61".parse().unwrap();
        let url = Platform::UnixLinux
            .descriptor()
            .download_url("https://example.com/x13as/", &release);
        assert_eq!(
            url,
            "https://example.com/x13as/unix-linux/program-archives/x13as_html-v1-1-b61.tar.gz"
        );
    }

    #[test]
    fn descriptors_match_platforms() {
        for desc in &RELEASES {
            assert_eq!(desc.platform.descriptor(), desc);
        }
        assert_eq!(
            Platform::UnixLinux.descriptor().compatibility_tag(),
            "py3-none-manylinux_2_12_x86_64.manylinux2010_x86_64"
        );
    }

    #[test]
    fn platform_from_str() {
        assert_eq!("windows".parse::<Platform>(), Ok(Platform::Windows));
        assert_eq!("Linux".parse::<Platform>(), Ok(Platform::UnixLinux));
        assert!("macos".parse::<Platform>().is_err());
    }
}
