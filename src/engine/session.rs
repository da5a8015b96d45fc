//! Mining Session Store
//!
//! Owns the lifecycle of mining sessions from start to end, plus the
//! miner-to-active-session index behind the single-active-session
//! policy. Registry maps use BTreeMap for deterministic iteration; each
//! session lives behind its own lock so unrelated sessions never block
//! each other.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::miner::MinerId;
use crate::core::ore::MAX_ORE_AMOUNT;
use crate::engine::EngineError;

/// Unique session identifier, assigned monotonically starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Wrap a raw identifier.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a single mining session.
///
/// `ended_at` doubles as the activity flag: a session is active exactly
/// while it is `None`, so "end time set iff inactive" cannot be violated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MiningSession {
    /// Unique session ID
    pub id: SessionId,

    /// Owning miner
    pub miner: MinerId,

    /// When the session was started
    pub started_at: DateTime<Utc>,

    /// When the session was ended (unset while active)
    pub ended_at: Option<DateTime<Utc>>,

    /// Has the session's claim been revealed successfully?
    pub is_settled: bool,

    /// Opaque accrual counter, 0-255, never decreasing
    pub total_mined: u8,
}

impl MiningSession {
    fn new(id: SessionId, miner: MinerId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            miner,
            started_at: now,
            ended_at: None,
            is_settled: false,
            total_mined: 0,
        }
    }

    /// Is the session still accepting mining events?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Accrue mined ore into the running counter.
    ///
    /// Rejects a zero amount, an amount past the per-event bound, and an
    /// increment that would push the counter past its bound. Returns the
    /// new counter value.
    fn accrue(&mut self, amount: u32) -> Result<u8, EngineError> {
        if amount == 0 || amount > MAX_ORE_AMOUNT {
            return Err(EngineError::InvalidAmount);
        }
        let new_total = self.total_mined as u32 + amount;
        if new_total > MAX_ORE_AMOUNT {
            return Err(EngineError::InvalidAmount);
        }
        self.total_mined = new_total as u8;
        Ok(self.total_mined)
    }

    /// Close the session.
    pub(crate) fn close(&mut self, now: DateTime<Utc>) {
        self.ended_at = Some(now);
    }

    /// Read-only projection.
    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            miner: self.miner,
            total_mined: self.total_mined,
            is_active: self.is_active(),
            is_settled: self.is_settled,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}

/// Read-only session projection handed to external callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    /// Session ID
    pub id: SessionId,
    /// Owning miner
    pub miner: MinerId,
    /// Accrued ore counter
    pub total_mined: u8,
    /// Still accepting mining events?
    pub is_active: bool,
    /// Settled by a successful reveal?
    pub is_settled: bool,
    /// Start timestamp
    pub started_at: DateTime<Utc>,
    /// End timestamp (unset while active)
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct SessionStoreInner {
    sessions: BTreeMap<SessionId, Arc<RwLock<MiningSession>>>,
    active: BTreeMap<MinerId, SessionId>,
    next_id: u64,
}

/// Store owning all sessions and the active-session index.
pub(crate) struct SessionStore {
    inner: RwLock<SessionStoreInner>,
}

impl SessionStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(SessionStoreInner::default()),
        }
    }

    /// Start a new session for `miner`.
    pub(crate) async fn start(
        &self,
        miner: MinerId,
        allow_concurrent: bool,
        now: DateTime<Utc>,
    ) -> Result<SessionId, EngineError> {
        let mut inner = self.inner.write().await;

        if !allow_concurrent && inner.active.contains_key(&miner) {
            return Err(EngineError::AlreadyActive);
        }

        inner.next_id += 1;
        let id = SessionId(inner.next_id);
        let session = MiningSession::new(id, miner, now);
        inner.sessions.insert(id, Arc::new(RwLock::new(session)));
        inner.active.insert(miner, id);

        Ok(id)
    }

    /// Fetch the shared handle for a session.
    ///
    /// The registry lock is released before the caller touches the
    /// entity lock.
    pub(crate) async fn entry(
        &self,
        id: SessionId,
    ) -> Result<Arc<RwLock<MiningSession>>, EngineError> {
        let inner = self.inner.read().await;
        inner.sessions.get(&id).cloned().ok_or(EngineError::NotFound)
    }

    /// Accrue ore into an active session. Returns the new counter value.
    pub(crate) async fn record_ore(&self, id: SessionId, amount: u32) -> Result<u8, EngineError> {
        let entry = self.entry(id).await?;
        let mut session = entry.write().await;

        if !session.is_active() {
            return Err(EngineError::NotActive);
        }
        session.accrue(amount)
    }

    /// End a session on behalf of `caller`. Returns the owning miner.
    pub(crate) async fn end(
        &self,
        id: SessionId,
        caller: MinerId,
        now: DateTime<Utc>,
    ) -> Result<MinerId, EngineError> {
        let entry = self.entry(id).await?;
        {
            let mut session = entry.write().await;

            if session.miner != caller {
                return Err(EngineError::Unauthorized);
            }
            if !session.is_active() {
                return Err(EngineError::NotActive);
            }
            session.close(now);
        }

        self.release_active(caller, id).await;
        Ok(caller)
    }

    /// Drop the miner's active-session index entry if it still points at
    /// `id`.
    pub(crate) async fn release_active(&self, miner: MinerId, id: SessionId) {
        let mut inner = self.inner.write().await;
        if inner.active.get(&miner) == Some(&id) {
            inner.active.remove(&miner);
        }
    }

    /// Read-only projection of a session.
    pub(crate) async fn view(&self, id: SessionId) -> Result<SessionView, EngineError> {
        let entry = self.entry(id).await?;
        let session = entry.read().await;
        Ok(session.view())
    }
}
