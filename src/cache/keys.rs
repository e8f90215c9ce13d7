//! Cache key definitions.
//!
//! Each cache instance has its own key type so entries from different
//! caches can never collide, on top of the caches being physically
//! separate maps.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use plaza_api_types::{ContentKind, ContentRef};

/// Fixed-length key for a verified bearer token.
///
/// Derived from a SHA-256 digest of the full token, truncated to eight
/// bytes: bounded key size, and the raw secret never sits in a map key.
/// Two distinct tokens colliding on the truncated digest is accepted as a
/// vanishingly small risk; a collision observed in testing means the
/// derivation is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenKey([u8; 8]);

impl TokenKey {
    pub fn derive(token: &str) -> Self {
        let digest = Sha256::digest(token.as_bytes());
        let mut key = [0u8; 8];
        key.copy_from_slice(&digest[..8]);
        Self(key)
    }
}

/// Key for one content item's statistics record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatsKey {
    pub kind: ContentKind,
    pub id: Uuid,
}

impl StatsKey {
    pub fn new(kind: ContentKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

impl From<ContentRef> for StatsKey {
    fn from(content: ContentRef) -> Self {
        Self {
            kind: content.kind,
            id: content.id,
        }
    }
}
