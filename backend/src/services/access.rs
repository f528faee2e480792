//! Shared-secret access control for the feed endpoint.

use crate::checksum::digest;
use crate::error::{FeedError, FeedResult};

/// Token value shipped in sample configuration. A deployment still using it
/// is treated as having no token at all.
pub const PLACEHOLDER_TOKEN: &str = "CHANGE_ME_TO_A_RANDOM_STRING";

/// Compare `provided` against `configured` without leaking where they differ.
///
/// Both sides are hashed with SHA-256 first so the comparison always walks
/// 32 bytes regardless of input lengths, and every byte is folded in before
/// the result is inspected. An empty or placeholder `configured` token
/// refuses everything.
pub fn verify(provided: &str, configured: &str) -> bool {
    if !is_configured(configured) {
        return false;
    }
    let expected = digest(configured);
    let actual = digest(provided);
    expected
        .iter()
        .zip(actual.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Whether `token` is usable as a shared secret.
pub fn is_configured(token: &str) -> bool {
    !token.is_empty() && token != PLACEHOLDER_TOKEN
}

/// Gate holding the configured token for the lifetime of the process.
#[derive(Clone)]
pub struct AccessGate {
    token: String,
}

impl AccessGate {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        is_configured(&self.token)
    }

    pub fn verify(&self, provided: &str) -> bool {
        verify(provided, &self.token)
    }

    /// [`verify`](Self::verify) as a `Result`, for `?` in handlers.
    pub fn check(&self, provided: Option<&str>) -> FeedResult<()> {
        match provided {
            Some(token) if self.verify(token) => Ok(()),
            _ => Err(FeedError::InvalidAuthentication),
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}
