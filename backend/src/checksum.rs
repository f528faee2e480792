//! SHA-256 helpers shared by event identifiers and token verification.

use sha2::{Digest, Sha256};

/// Raw SHA-256 digest of `content`.
pub fn digest(content: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Calculate SHA-256 checksum of `content`.
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &str) -> String {
    hex::encode(digest(content))
}
