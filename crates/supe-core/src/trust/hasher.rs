//! SHA-256 helpers for preset pack integrity

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hash a file's contents
pub fn hash_file(path: &Path) -> Result<String> {
    let contents = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(sha256_hex(&contents))
}

/// Compare two hex digests ignoring case and surrounding whitespace
pub fn digests_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}

/// Fail with an integrity error unless `bytes` hash to `expected`
pub fn verify_sha256(path: &Path, bytes: &[u8], expected: &str) -> Result<String> {
    let actual = sha256_hex(bytes);
    if !digests_match(expected, &actual) {
        return Err(Error::Integrity {
            path: path.to_path_buf(),
            expected: expected.trim().to_lowercase(),
            actual,
        });
    }
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_compare_is_case_insensitive() {
        let digest = sha256_hex(b"abc");
        assert!(digests_match(&digest.to_uppercase(), &digest));
        assert!(digests_match(&format!("  {}\n", digest), &digest));
        assert!(!digests_match(&sha256_hex(b"abd"), &digest));
    }

    #[test]
    fn test_verify_mismatch_reports_both() {
        let err = verify_sha256(Path::new("p.json"), b"abc", "00ff").unwrap_err();
        match err {
            Error::Integrity {
                expected, actual, ..
            } => {
                assert_eq!(expected, "00ff");
                assert_eq!(actual, sha256_hex(b"abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
