//! Upstream release version format.
//!
//! Census releases are spelled `vMAJOR-MINOR-bBUILD` (e.g. `v1-1-b61`). The
//! published wheel version is the same triple spelled `vMAJOR.MINOR.BUILD`.
//! Only that one input shape is accepted; the conversion is not a general
//! string rewrite and is not meant to be applied twice.

use thiserror::Error;

/// Errors produced when parsing a release version.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The input is not of the form `vMAJOR-MINOR-bBUILD`.
    #[error("Malformed release version '{0}': expected vMAJOR-MINOR-bBUILD")]
    Malformed(String),
}

/// A parsed upstream release version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseVersion {
    major: String,
    minor: String,
    build: String,
}

impl ReleaseVersion {
    /// Upstream spelling, as used in download URLs (`v1-1-b61`).
    pub fn upstream(&self) -> String {
        format!("v{}-{}-b{}", self.major, self.minor, self.build)
    }

    /// Spelling published as the wheel version (`v1.1.61`).
    pub fn wheel_version(&self) -> String {
        format!("v{}.{}.{}", self.major, self.minor, self.build)
    }
}

impl std::fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.upstream())
    }
}

impl std::str::FromStr for ReleaseVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || VersionError::Malformed(s.to_string());
        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

        let rest = s.strip_prefix('v').ok_or_else(malformed)?;
        let mut parts = rest.split('-');
        let (Some(major), Some(minor), Some(build), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let build = build.strip_prefix('b').ok_or_else(malformed)?;

        if !(digits(major) && digits(minor) && digits(build)) {
            return Err(malformed());
        }

        Ok(Self {
            major: major.to_string(),
            minor: minor.to_string(),
            build: build.to_string(),
        })
    }
}
