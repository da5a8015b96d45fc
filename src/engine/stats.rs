//! Miner Stats Ledger
//!
//! Per-miner aggregate counters, created lazily and updated only as a
//! side effect of session starts and successful settlements. Pending or
//! failed reveals never touch the ledger.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::miner::MinerId;

/// Aggregate counters for one miner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerStats {
    /// Sessions ever started
    pub total_sessions: u32,

    /// Cumulative ore count across settled claims only
    pub total_ores_mined: u32,

    /// Monotonic reputation score
    pub reputation: u32,

    /// Set by an out-of-band authority; never mutated by settlement
    pub is_verified: bool,
}

/// Ledger owning all per-miner stats.
pub(crate) struct StatsLedger {
    inner: RwLock<BTreeMap<MinerId, MinerStats>>,
}

impl StatsLedger {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    /// Count a newly started session.
    pub(crate) async fn on_session_started(&self, miner: MinerId) {
        let mut inner = self.inner.write().await;
        let stats = inner.entry(miner).or_default();
        stats.total_sessions += 1;
    }

    /// Credit a settled claim.
    ///
    /// Reputation grows by one point per settlement plus one more per
    /// ten ores settled.
    pub(crate) async fn on_claim_settled(&self, miner: MinerId, ore_count: u32) {
        let mut inner = self.inner.write().await;
        let stats = inner.entry(miner).or_default();
        stats.total_ores_mined += ore_count;
        stats.reputation += 1 + ore_count / 10;
    }

    /// Stats for a miner; zeroed defaults for one the ledger has never
    /// seen.
    pub(crate) async fn get(&self, miner: MinerId) -> MinerStats {
        let inner = self.inner.read().await;
        inner.get(&miner).copied().unwrap_or_default()
    }

    /// Out-of-band authority hook.
    pub(crate) async fn set_verified(&self, miner: MinerId, verified: bool) {
        let mut inner = self.inner.write().await;
        let stats = inner.entry(miner).or_default();
        stats.is_verified = verified;
    }

    pub(crate) async fn is_verified(&self, miner: MinerId) -> bool {
        self.get(miner).await.is_verified
    }
}
