//! Engine Event Journal
//!
//! One durable, ordered event per successful state transition, for
//! observability and audit. The journal is append-only, carries a
//! chained digest over its history, and fans events out to live
//! subscribers over a broadcast channel. Failed operations never reach
//! it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::core::hash::{Digest32, DomainHasher};
use crate::core::miner::MinerId;
use crate::core::ore::{OreAmounts, OreKind};
use crate::engine::claim::ClaimId;
use crate::engine::session::SessionId;

/// Event payload for each successful state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEventData {
    /// A mining session was started
    SessionStarted {
        /// New session
        session_id: SessionId,
        /// Owning miner
        miner: MinerId,
    },

    /// Ore accrued into an active session
    OreMined {
        /// Target session
        session_id: SessionId,
        /// Kind of ore mined
        kind: OreKind,
        /// Amount accrued by this event
        amount: u8,
        /// Session counter after accrual
        total_mined: u8,
    },

    /// A mining session was ended
    SessionEnded {
        /// Ended session
        session_id: SessionId,
        /// Owning miner
        miner: MinerId,
    },

    /// A hidden claim was created
    ClaimCreated {
        /// New claim
        claim_id: ClaimId,
        /// Owning session
        session_id: SessionId,
        /// Claim creator
        claimer: MinerId,
    },

    /// A claim was revealed and settled; carries the now-plaintext
    /// breakdown
    ClaimRevealed {
        /// Settled claim
        claim_id: ClaimId,
        /// Owning session
        session_id: SessionId,
        /// Claim creator
        claimer: MinerId,
        /// Revealed per-kind quantities
        amounts: OreAmounts,
        /// Verified total value
        total_value: u32,
    },
}

/// A journal entry: sequence number, wall-clock time, payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvent {
    /// Position in the journal, dense and starting at 0
    pub seq: u64,

    /// When the transition was applied
    pub at: DateTime<Utc>,

    /// What happened
    pub data: EngineEventData,
}

/// Journal decoding errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JournalError {
    /// Serialized journal bytes could not be decoded.
    #[error("journal deserialization failed: {0}")]
    DeserializationFailed(String),
}

struct JournalInner {
    events: Vec<EngineEvent>,
    digest: Digest32,
}

/// Append-only, digest-chained event log.
pub(crate) struct EventJournal {
    inner: RwLock<JournalInner>,
    tx: broadcast::Sender<EngineEvent>,
}

impl EventJournal {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: RwLock::new(JournalInner {
                events: Vec::new(),
                digest: [0; 32],
            }),
            tx,
        }
    }

    /// Append one event, extend the digest chain, and notify
    /// subscribers.
    pub(crate) async fn record(&self, at: DateTime<Utc>, data: EngineEventData) -> EngineEvent {
        let mut inner = self.inner.write().await;

        let event = EngineEvent {
            seq: inner.events.len() as u64,
            at,
            data,
        };

        let bytes = bincode::serialize(&event).expect("Event serialization should not fail");
        let mut hasher = DomainHasher::for_event_journal();
        hasher.update_bytes(&inner.digest);
        hasher.update_u64(event.seq);
        hasher.update_bytes(&bytes);
        inner.digest = hasher.finalize();

        inner.events.push(event.clone());
        let _ = self.tx.send(event.clone());

        event
    }

    /// All events recorded so far, in order.
    pub(crate) async fn snapshot(&self) -> Vec<EngineEvent> {
        self.inner.read().await.events.clone()
    }

    /// Chained digest over the full history.
    pub(crate) async fn digest(&self) -> Digest32 {
        self.inner.read().await.digest
    }

    /// Subscribe to live events.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Serialize the full history using bincode.
    pub(crate) async fn to_bytes(&self) -> Vec<u8> {
        let inner = self.inner.read().await;
        bincode::serialize(&inner.events).expect("Journal serialization should not fail")
    }

    /// Decode a serialized history.
    pub(crate) fn decode(data: &[u8]) -> Result<Vec<EngineEvent>, JournalError> {
        bincode::deserialize(data).map_err(|e| JournalError::DeserializationFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miner(n: u8) -> MinerId {
        MinerId::new([n; 16])
    }

    fn started(n: u64) -> EngineEventData {
        EngineEventData::SessionStarted {
            session_id: SessionId::from_raw(n),
            miner: miner(1),
        }
    }

    #[tokio::test]
    async fn test_sequence_is_dense_and_ordered() {
        let journal = EventJournal::new(16);

        for n in 1..=3 {
            journal.record(Utc::now(), started(n)).await;
        }

        let events = journal.snapshot().await;
        assert_eq!(events.len(), 3);
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.seq, i as u64);
        }
    }

    #[tokio::test]
    async fn test_digest_changes_per_event() {
        let journal = EventJournal::new(16);
        let empty = journal.digest().await;
        assert_eq!(empty, [0; 32]);

        journal.record(Utc::now(), started(1)).await;
        let one = journal.digest().await;
        assert_ne!(one, empty);

        journal.record(Utc::now(), started(2)).await;
        assert_ne!(journal.digest().await, one);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let journal = EventJournal::new(16);
        journal.record(Utc::now(), started(1)).await;
        journal
            .record(
                Utc::now(),
                EngineEventData::OreMined {
                    session_id: SessionId::from_raw(1),
                    kind: OreKind::Ruby,
                    amount: 3,
                    total_mined: 3,
                },
            )
            .await;

        let bytes = journal.to_bytes().await;
        let decoded = EventJournal::decode(&bytes).unwrap();
        assert_eq!(decoded, journal.snapshot().await);
    }

    #[tokio::test]
    async fn test_decode_garbage_fails() {
        assert!(matches!(
            EventJournal::decode(&[0xFF, 0x00, 0x01]),
            Err(JournalError::DeserializationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let journal = EventJournal::new(16);
        let mut rx = journal.subscribe();

        journal.record(Utc::now(), started(1)).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received.seq, 0);
        assert!(matches!(
            received.data,
            EngineEventData::SessionStarted { .. }
        ));
    }
}
