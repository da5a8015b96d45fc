//! Domain-Separated Hashing
//!
//! SHA-256 with fixed domain tags, used for claim commitments and the
//! event journal's audit digest. Update order is part of every format.

use sha2::{Digest, Sha256};

/// Hash output type (256 bits / 32 bytes)
pub type Digest32 = [u8; 32];

/// Deterministic hasher with a domain separator.
pub struct DomainHasher {
    hasher: Sha256,
}

impl DomainHasher {
    /// Create a new hasher with the given domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for ore claim commitments.
    pub fn for_claim_commitment() -> Self {
        Self::new(b"ORE_VAULT_CLAIM_V1")
    }

    /// Create hasher for the event journal digest chain.
    pub fn for_event_journal() -> Self {
        Self::new(b"ORE_VAULT_JOURNAL_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Update with a 16-byte identity.
    #[inline]
    pub fn update_id(&mut self, id: &[u8; 16]) {
        self.hasher.update(id);
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> Digest32 {
        self.hasher.finalize().into()
    }
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}
