//! Reveal Verification Seam
//!
//! The engine is agnostic to how a reveal is checked: a cryptographic
//! proof checker, a signature scheme, or plain deterministic
//! recomputation all fit behind [`ClaimVerifier`]. Adapter failures and
//! timeouts surface as a `false` verdict; the engine maps that to a
//! rejected reveal with no side effects.

use crate::commit::commitment::{OreCommitment, RevealPayload};

/// Capability that checks a revealed payload against a stored
/// commitment.
pub trait ClaimVerifier: Send + Sync {
    /// Return `true` only if the payload is consistent with the
    /// commitment and its claimed total value is well-formed.
    fn verify(&self, commitment: &OreCommitment, payload: &RevealPayload) -> bool;
}

/// Default verifier: deterministic recomputation.
///
/// Accepts a reveal when the commitment hash matches and the claimed
/// total value equals the fixed-weight sum of the revealed amounts.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashRevealVerifier;

impl ClaimVerifier for HashRevealVerifier {
    fn verify(&self, commitment: &OreCommitment, payload: &RevealPayload) -> bool {
        payload.total_value == payload.amounts.value() && commitment.matches(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ore::OreAmounts;

    #[test]
    fn test_honest_reveal_accepted() {
        let payload = RevealPayload::for_amounts(OreAmounts::new(2, 0, 3, 1, 1), [9; 32]);
        let commitment = OreCommitment::bind(&payload);

        assert!(HashRevealVerifier.verify(&commitment, &payload));
    }

    #[test]
    fn test_wrong_nonce_rejected() {
        let payload = RevealPayload::for_amounts(OreAmounts::new(2, 0, 3, 1, 1), [9; 32]);
        let commitment = OreCommitment::bind(&payload);

        let mut wrong = payload;
        wrong.nonce = [0; 32];

        assert!(!HashRevealVerifier.verify(&commitment, &wrong));
    }

    #[test]
    fn test_dishonest_total_rejected_even_when_committed() {
        // Commit over a payload whose claimed total already disagrees
        // with its amounts: the hash matches, the total function does not.
        let dishonest = RevealPayload {
            amounts: OreAmounts::new(1, 0, 0, 0, 0),
            total_value: 999,
            nonce: [3; 32],
        };
        let commitment = OreCommitment::bind(&dishonest);

        assert!(commitment.matches(&dishonest));
        assert!(!HashRevealVerifier.verify(&commitment, &dishonest));
    }
}
