//! Ore Claim Registry
//!
//! Claims are born hidden: the registry stores an opaque commitment and
//! nothing else until a reveal passes verification. The plaintext field
//! is an `Option` set exactly once, so hidden quantities cannot be read
//! early and revealed quantities cannot be rewritten.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::commit::commitment::OreCommitment;
use crate::core::miner::MinerId;
use crate::core::ore::OreAmounts;
use crate::engine::session::SessionId;
use crate::engine::EngineError;

/// Unique claim identifier, assigned monotonically starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClaimId(u64);

impl ClaimId {
    /// Wrap a raw identifier.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ClaimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plaintext ore quantities, present only after a successful reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedOre {
    /// Per-kind quantities
    pub amounts: OreAmounts,
    /// Total value as checked by the verifier
    pub total_value: u32,
}

/// A hidden-then-revealed record of one session's ore output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OreClaim {
    /// Unique claim ID
    pub id: ClaimId,

    /// Owning session (at most one claim per session)
    pub session: SessionId,

    /// Identity that created the claim; equals the session's miner
    pub claimer: MinerId,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// The opaque commitment, the only pre-reveal representation of the
    /// amounts
    pub commitment: OreCommitment,

    revealed: Option<RevealedOre>,
}

impl OreClaim {
    fn new(
        id: ClaimId,
        session: SessionId,
        claimer: MinerId,
        commitment: OreCommitment,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session,
            claimer,
            created_at: now,
            commitment,
            revealed: None,
        }
    }

    /// Has this claim been revealed?
    #[inline]
    pub fn is_revealed(&self) -> bool {
        self.revealed.is_some()
    }

    /// The plaintext quantities, if revealed.
    pub fn revealed(&self) -> Option<&RevealedOre> {
        self.revealed.as_ref()
    }

    /// Store the verified plaintext. Callers check `is_revealed` first
    /// under the claim's write lock.
    pub(crate) fn settle(&mut self, ore: RevealedOre) {
        debug_assert!(self.revealed.is_none());
        self.revealed = Some(ore);
    }

    /// Read-only projection with hidden placeholders until revealed.
    pub fn view(&self) -> ClaimView {
        ClaimView {
            id: self.id,
            session: self.session,
            claimer: self.claimer,
            created_at: self.created_at,
            is_revealed: self.is_revealed(),
            amounts: self.revealed.map(|r| r.amounts),
            total_value: self.revealed.map(|r| r.total_value),
        }
    }
}

/// Read-only claim projection handed to external callers.
///
/// `amounts` and `total_value` stay `None` for everyone until the claim
/// is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimView {
    /// Claim ID
    pub id: ClaimId,
    /// Owning session
    pub session: SessionId,
    /// Claim creator
    pub claimer: MinerId,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Revealed yet?
    pub is_revealed: bool,
    /// Per-kind quantities once revealed
    pub amounts: Option<OreAmounts>,
    /// Total value once revealed
    pub total_value: Option<u32>,
}

#[derive(Default)]
struct ClaimRegistryInner {
    claims: BTreeMap<ClaimId, Arc<RwLock<OreClaim>>>,
    by_session: BTreeMap<SessionId, ClaimId>,
    next_id: u64,
}

/// Registry owning all claims and the session-to-claim index.
pub(crate) struct ClaimRegistry {
    inner: RwLock<ClaimRegistryInner>,
}

impl ClaimRegistry {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(ClaimRegistryInner::default()),
        }
    }

    /// Create a hidden claim for a session.
    ///
    /// The session-to-claim index is checked and updated under one lock,
    /// so concurrent creates for the same session resolve to exactly one
    /// winner.
    pub(crate) async fn create(
        &self,
        session: SessionId,
        claimer: MinerId,
        commitment: OreCommitment,
        now: DateTime<Utc>,
    ) -> Result<ClaimId, EngineError> {
        let mut inner = self.inner.write().await;

        if inner.by_session.contains_key(&session) {
            return Err(EngineError::AlreadyClaimed);
        }

        inner.next_id += 1;
        let id = ClaimId(inner.next_id);
        let claim = OreClaim::new(id, session, claimer, commitment, now);
        inner.claims.insert(id, Arc::new(RwLock::new(claim)));
        inner.by_session.insert(session, id);

        Ok(id)
    }

    /// Fetch the shared handle for a claim.
    ///
    /// The registry lock is released before the caller touches the
    /// entity lock.
    pub(crate) async fn entry(&self, id: ClaimId) -> Result<Arc<RwLock<OreClaim>>, EngineError> {
        let inner = self.inner.read().await;
        inner.claims.get(&id).cloned().ok_or(EngineError::NotFound)
    }

    /// Read-only projection of a claim.
    pub(crate) async fn view(&self, id: ClaimId) -> Result<ClaimView, EngineError> {
        let entry = self.entry(id).await?;
        let claim = entry.read().await;
        Ok(claim.view())
    }
}
