//! Checksums for binary values, written as `"<algorithm>$<hex digest>"`.

use std::fmt;
use std::str::FromStr;

use crate::error::{TypeError, TypeResult};

/// Supported checksum algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChecksumAlgorithm {
    Crc32,
    Blake3,
}

impl ChecksumAlgorithm {
    /// Hex digest of `bytes`.
    pub fn digest(&self, bytes: &[u8]) -> String {
        match self {
            Self::Crc32 => hex::encode(crc32fast::hash(bytes).to_be_bytes()),
            Self::Blake3 => blake3::hash(bytes).to_hex().to_string(),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crc32 => write!(f, "crc32"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crc32" => Ok(Self::Crc32),
            "blake3" => Ok(Self::Blake3),
            other => Err(TypeError::UnsupportedChecksum(other.to_string())),
        }
    }
}

/// Compute a checksum string for `bytes`.
pub fn compute(algorithm: ChecksumAlgorithm, bytes: &[u8]) -> String {
    format!("{algorithm}${}", algorithm.digest(bytes))
}

/// Verify `checksum` (`"<algorithm>$<hex>"`) against `bytes`.
pub fn verify(checksum: &str, bytes: &[u8]) -> TypeResult<bool> {
    let (algorithm, expected) = checksum
        .split_once('$')
        .ok_or_else(|| TypeError::MalformedChecksum(checksum.to_string()))?;
    let algorithm: ChecksumAlgorithm = algorithm.parse()?;
    Ok(algorithm.digest(bytes).eq_ignore_ascii_case(expected.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_matches_known_vector() {
        assert_eq!(compute(ChecksumAlgorithm::Crc32, b"123456789"), "crc32$cbf43926");
    }

    #[test]
    fn verify_detects_corruption() {
        let sum = compute(ChecksumAlgorithm::Blake3, b"data");
        assert!(verify(&sum, b"data").unwrap());
        assert!(!verify(&sum, b"datA").unwrap());
    }

    #[test]
    fn unknown_algorithm_is_an_error() {
        assert_eq!(
            verify("md5$abcd", b""),
            Err(TypeError::UnsupportedChecksum("md5".into()))
        );
        assert!(matches!(verify("abcd", b""), Err(TypeError::MalformedChecksum(_))));
    }
}
