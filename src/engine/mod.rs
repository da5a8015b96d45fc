//! Lifecycle Engine
//!
//! The facade every external collaborator talks to. It resolves nothing
//! about transport or signatures; callers hand in an already-resolved
//! [`MinerId`] and the engine enforces ordering, ownership, and the
//! commit-reveal contract:
//!
//! ```text
//! NoSession --start--> Active --mine*--> Active --end--> Ended
//! Ended --create_claim--> Ended(claimed, hidden)
//! Ended(claimed, hidden) --reveal ok--> Settled            (terminal)
//! Ended(claimed, hidden) --reveal err--> Ended(claimed, hidden)
//! ```
//!
//! Every session and claim sits behind its own lock: at most one
//! mutation is in flight per entity, reads see consistent snapshots, and
//! the verifier call during a reveal blocks only the claim being
//! revealed and its owning session. Each successful mutation appends
//! exactly one event to the durable journal.

pub mod claim;
pub mod events;
pub mod session;
pub mod stats;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::commit::commitment::{OreCommitment, RevealNonce, RevealPayload};
use crate::commit::verifier::{ClaimVerifier, HashRevealVerifier};
use crate::core::hash::Digest32;
use crate::core::miner::MinerId;
use crate::core::ore::{OreAmounts, OreKind};

use claim::{ClaimId, ClaimRegistry, ClaimView, RevealedOre};
use events::{EngineEvent, EngineEventData, EventJournal};
use session::{SessionId, SessionStore, SessionView};
use stats::{MinerStats, StatsLedger};

/// Engine errors, reported synchronously to the caller that triggered
/// them. State-machine violations and authorization failures are caller
/// errors; `VerificationFailed` is a rejected (possibly adversarial)
/// reveal that leaves state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Unknown session or claim id.
    #[error("unknown session or claim")]
    NotFound,

    /// Caller is not the owning miner (or is gated out by the
    /// verified-miner policy).
    #[error("caller is not authorized for this operation")]
    Unauthorized,

    /// Miner already has an active session.
    #[error("miner already has an active session")]
    AlreadyActive,

    /// Session already has a claim.
    #[error("session already has a claim")]
    AlreadyClaimed,

    /// Claim was already revealed.
    #[error("claim was already revealed")]
    AlreadyRevealed,

    /// Session is not active.
    #[error("session is not active")]
    NotActive,

    /// Settlement attempted before the session ended.
    #[error("session is still active")]
    SessionStillActive,

    /// Ore amount outside the allowed range.
    #[error("ore amount outside the allowed range")]
    InvalidAmount,

    /// Reveal did not match the stored commitment or its total value.
    #[error("reveal did not match the stored commitment")]
    VerificationFailed,
}

/// Policy configuration for an engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Permit a miner to run several sessions at once.
    pub allow_concurrent_sessions: bool,
    /// Permit claim creation before the session has ended. Settling such
    /// a claim closes the session.
    pub allow_claim_before_end: bool,
    /// Require the out-of-band verified flag before starting sessions.
    pub require_verified_miners: bool,
    /// Live event broadcast buffer size.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_concurrent_sessions: false,
            allow_claim_before_end: false,
            require_verified_miners: false,
            event_capacity: 256,
        }
    }
}

/// The session and claim lifecycle engine.
///
/// Owns all registries; independent instances share nothing, so several
/// engines can coexist in one process.
pub struct MiningEngine {
    config: EngineConfig,
    verifier: Arc<dyn ClaimVerifier>,
    sessions: SessionStore,
    claims: ClaimRegistry,
    stats: StatsLedger,
    journal: EventJournal,
}

impl MiningEngine {
    /// Create an engine with the default recomputation verifier.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_verifier(config, Arc::new(HashRevealVerifier))
    }

    /// Create an engine with a custom verifier adapter.
    pub fn with_verifier(config: EngineConfig, verifier: Arc<dyn ClaimVerifier>) -> Self {
        let journal = EventJournal::new(config.event_capacity);
        Self {
            config,
            verifier,
            sessions: SessionStore::new(),
            claims: ClaimRegistry::new(),
            stats: StatsLedger::new(),
            journal,
        }
    }

    /// Start a mining session for `miner`.
    pub async fn start_session(&self, miner: MinerId) -> Result<SessionId, EngineError> {
        if self.config.require_verified_miners && !self.stats.is_verified(miner).await {
            return Err(EngineError::Unauthorized);
        }

        let now = Utc::now();
        let session_id = self
            .sessions
            .start(miner, self.config.allow_concurrent_sessions, now)
            .await?;

        self.stats.on_session_started(miner).await;
        self.journal
            .record(now, EngineEventData::SessionStarted { session_id, miner })
            .await;

        info!(session = %session_id, miner = %miner, "mining session started");
        Ok(session_id)
    }

    /// Accrue mined ore into an active session.
    ///
    /// The per-kind amount is an accrual signal only; it is never stored
    /// per kind. The hidden per-kind totals exist solely inside the
    /// claim commitment the miner submits later.
    pub async fn record_mining_event(
        &self,
        session_id: SessionId,
        kind: OreKind,
        amount: u32,
    ) -> Result<(), EngineError> {
        let total_mined = self.sessions.record_ore(session_id, amount).await?;

        self.journal
            .record(
                Utc::now(),
                EngineEventData::OreMined {
                    session_id,
                    kind,
                    amount: amount as u8,
                    total_mined,
                },
            )
            .await;

        debug!(session = %session_id, ?kind, amount, total_mined, "ore mined");
        Ok(())
    }

    /// End a session on behalf of `caller`.
    pub async fn end_session(
        &self,
        session_id: SessionId,
        caller: MinerId,
    ) -> Result<(), EngineError> {
        let now = Utc::now();
        let miner = self.sessions.end(session_id, caller, now).await?;

        self.journal
            .record(now, EngineEventData::SessionEnded { session_id, miner })
            .await;

        info!(session = %session_id, miner = %miner, "mining session ended");
        Ok(())
    }

    /// Create a hidden claim for a session.
    ///
    /// The engine stores only the commitment; plaintext amounts do not
    /// exist anywhere in the engine until a reveal passes verification.
    pub async fn create_claim(
        &self,
        session_id: SessionId,
        caller: MinerId,
        commitment: OreCommitment,
    ) -> Result<ClaimId, EngineError> {
        let entry = self.sessions.entry(session_id).await?;
        {
            let session = entry.read().await;
            if session.miner != caller {
                return Err(EngineError::Unauthorized);
            }
            if session.is_active() && !self.config.allow_claim_before_end {
                return Err(EngineError::SessionStillActive);
            }
        }

        let now = Utc::now();
        let claim_id = self.claims.create(session_id, caller, commitment, now).await?;

        self.journal
            .record(
                now,
                EngineEventData::ClaimCreated {
                    claim_id,
                    session_id,
                    claimer: caller,
                },
            )
            .await;

        info!(
            claim = %claim_id,
            session = %session_id,
            commitment = %hex::encode(commitment.as_bytes()),
            "ore claim created"
        );
        Ok(claim_id)
    }

    /// Reveal a claim and settle it.
    ///
    /// `amounts` are the five quantities in canonical kind order;
    /// `total_value` is the claimed total the verifier holds against the
    /// fixed weight function. All-or-nothing: a rejected reveal leaves
    /// the claim, its session, stats, and the journal untouched.
    pub async fn reveal_claim(
        &self,
        claim_id: ClaimId,
        caller: MinerId,
        amounts: [u32; 5],
        total_value: u32,
        nonce: RevealNonce,
    ) -> Result<(), EngineError> {
        let amounts = OreAmounts::checked(amounts).ok_or(EngineError::InvalidAmount)?;
        let payload = RevealPayload {
            amounts,
            total_value,
            nonce,
        };

        let claim_entry = self.claims.entry(claim_id).await?;
        let mut claim = claim_entry.write().await;

        if claim.claimer != caller {
            return Err(EngineError::Unauthorized);
        }
        if claim.is_revealed() {
            return Err(EngineError::AlreadyRevealed);
        }

        // The adapter may be slow or externally mediated; only this
        // claim is blocked while it runs.
        if !self.verifier.verify(&claim.commitment, &payload) {
            warn!(claim = %claim_id, claimer = %caller, "reveal rejected by verifier");
            return Err(EngineError::VerificationFailed);
        }

        let session_id = claim.session;
        let session_entry = self.sessions.entry(session_id).await?;
        let mut session = session_entry.write().await;

        let now = Utc::now();
        let closed_by_settlement = session.is_active();
        if closed_by_settlement {
            session.close(now);
        }
        session.is_settled = true;
        claim.settle(RevealedOre {
            amounts,
            total_value,
        });

        drop(session);
        drop(claim);

        if closed_by_settlement {
            self.sessions.release_active(caller, session_id).await;
        }

        self.stats.on_claim_settled(caller, amounts.count()).await;
        self.journal
            .record(
                now,
                EngineEventData::ClaimRevealed {
                    claim_id,
                    session_id,
                    claimer: caller,
                    amounts,
                    total_value,
                },
            )
            .await;

        info!(
            claim = %claim_id,
            session = %session_id,
            ore_count = amounts.count(),
            total_value,
            "ore claim revealed and settled"
        );
        Ok(())
    }

    /// Read-only projection of a session.
    pub async fn get_session(&self, session_id: SessionId) -> Result<SessionView, EngineError> {
        self.sessions.view(session_id).await
    }

    /// Read-only projection of a claim. Amounts stay hidden until the
    /// claim is revealed.
    pub async fn get_claim(&self, claim_id: ClaimId) -> Result<ClaimView, EngineError> {
        self.claims.view(claim_id).await
    }

    /// Stats for a miner; zeroed defaults for one the engine has never
    /// seen.
    pub async fn get_stats(&self, miner: MinerId) -> MinerStats {
        self.stats.get(miner).await
    }

    /// Out-of-band authority hook for the verified-miner flag.
    pub async fn set_miner_verified(&self, miner: MinerId, verified: bool) {
        self.stats.set_verified(miner, verified).await;
        info!(miner = %miner, verified, "miner verification flag updated");
    }

    /// All journal events recorded so far, in order.
    pub async fn events(&self) -> Vec<EngineEvent> {
        self.journal.snapshot().await
    }

    /// Subscribe to live journal events.
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<EngineEvent> {
        self.journal.subscribe()
    }

    /// Chained digest over the journal history.
    pub async fn journal_digest(&self) -> Digest32 {
        self.journal.digest().await
    }

    /// Serialized journal history (bincode).
    pub async fn journal_bytes(&self) -> Vec<u8> {
        self.journal.to_bytes().await
    }

    /// Decode a journal history previously produced by
    /// [`MiningEngine::journal_bytes`].
    pub fn decode_journal(data: &[u8]) -> Result<Vec<EngineEvent>, events::JournalError> {
        EventJournal::decode(data)
    }
}
