//! Miner Identity
//!
//! Opaque 16-byte participant identity. The engine never interprets it;
//! wallets, signatures, and transport-level authentication live outside
//! the core and hand a resolved identity in.

use serde::{Deserialize, Serialize};

/// Unique miner identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct MinerId(pub [u8; 16]);

impl MinerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create a fresh random identity.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl std::fmt::Display for MinerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_uuid_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miner_id_ordering() {
        let id1 = MinerId::new([0; 16]);
        let id2 = MinerId::new([1; 16]);
        let id3 = MinerId::new([0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        assert!(id1 < id2);
        assert!(id1 < id3);
        assert!(id3 < id2);
    }

    #[test]
    fn test_uuid_round_trip() {
        let id = MinerId::new([0xAB; 16]);
        let s = id.to_uuid_string();
        assert_eq!(MinerId::from_uuid_str(&s), Some(id));
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        assert_eq!(MinerId::from_uuid_str("not-a-uuid"), None);
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(MinerId::random(), MinerId::random());
    }
}
