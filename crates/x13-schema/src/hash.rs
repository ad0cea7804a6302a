//! SHA256 digests printed for operator verification.

use sha2::{Digest, Sha256};

/// Newtype for a SHA256 hash string (64 lowercase hex characters).
///
/// Printed next to every downloaded archive and written wheel so an operator
/// can compare runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Sha256Hash(String);

impl Sha256Hash {
    /// Wrap an already computed hex digest without validation.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Compute the SHA256 digest of `data`.
    pub fn compute(data: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(data)))
    }

    /// Compute the SHA256 digest of a file by reading it entirely into memory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn compute_file(path: &std::path::Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::compute(&data))
    }

    /// Return the inner hex string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Hash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            Sha256Hash::compute(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn compute_file_matches_compute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, b"hello world").unwrap();

        assert_eq!(
            Sha256Hash::compute_file(&path).unwrap(),
            Sha256Hash::compute(b"hello world")
        );
    }
}
