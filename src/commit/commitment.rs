//! Ore Claim Commitments
//!
//! Commit to mined ore quantities before settlement.
//! Reveal and verify at settlement time to prevent manipulation.

use serde::{Deserialize, Serialize};

use crate::core::hash::{Digest32, DomainHasher};
use crate::core::ore::{OreAmounts, OreKind};

/// Blinding nonce carried by every reveal.
///
/// Without it the commitment over small bounded amounts would be
/// brute-forceable; callers pick it from their own randomness source.
pub type RevealNonce = [u8; 32];

/// Pre-image data for a claim commitment (kept secret until reveal).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealPayload {
    /// Per-kind ore quantities.
    pub amounts: OreAmounts,

    /// Claimed total value. Honest payloads satisfy
    /// `total_value == amounts.value()`; the verifier enforces it.
    pub total_value: u32,

    /// Blinding nonce.
    pub nonce: RevealNonce,
}

impl RevealPayload {
    /// Build an honest payload whose total value is derived from the
    /// amounts.
    pub fn for_amounts(amounts: OreAmounts, nonce: RevealNonce) -> Self {
        Self {
            amounts,
            total_value: amounts.value(),
            nonce,
        }
    }
}

/// Binding-but-hiding commitment to a claim's ore quantities.
///
/// Published (stored in the claim registry) before the plaintext exists
/// anywhere in the engine. Cannot be changed after creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OreCommitment {
    /// Commitment hash.
    pub hash: Digest32,
}

impl OreCommitment {
    /// Create commitment from a payload.
    pub fn bind(payload: &RevealPayload) -> Self {
        Self {
            hash: compute_commitment_hash(payload),
        }
    }

    /// Verify that a payload matches this commitment.
    pub fn matches(&self, payload: &RevealPayload) -> bool {
        compute_commitment_hash(payload) == self.hash
    }

    /// Raw commitment bytes.
    pub fn as_bytes(&self) -> &Digest32 {
        &self.hash
    }
}

/// Compute commitment hash from a payload.
fn compute_commitment_hash(payload: &RevealPayload) -> Digest32 {
    let mut hasher = DomainHasher::for_claim_commitment();

    for kind in OreKind::ALL {
        hasher.update_u8(payload.amounts.get(kind));
    }
    hasher.update_u32(payload.total_value);
    hasher.update_bytes(&payload.nonce);

    hasher.finalize()
}
