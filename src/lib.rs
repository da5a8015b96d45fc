//! # Ore Vault Engine
//!
//! Commit-reveal settlement engine for hidden ore mining sessions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORE VAULT ENGINE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── miner.rs    - Miner identity (16-byte, totally ordered) │
//! │  ├── ore.rs      - Ore kinds, bounded amounts, value weights │
//! │  └── hash.rs     - Domain-separated hashing                  │
//! │                                                              │
//! │  commit/         - Commit-reveal protocol                    │
//! │  ├── commitment.rs - Binding-but-hiding ore commitments      │
//! │  └── verifier.rs - Pluggable reveal verification seam        │
//! │                                                              │
//! │  engine/         - Lifecycle engine                          │
//! │  ├── session.rs  - Mining session store                      │
//! │  ├── claim.rs    - Ore claim registry                        │
//! │  ├── stats.rs    - Per-miner stats ledger                    │
//! │  ├── events.rs   - Durable ordered event journal             │
//! │  └── mod.rs      - Engine facade, errors, configuration      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fairness Guarantee
//!
//! Ore quantities produced by a session exist only inside an opaque
//! commitment until the miner settles. The engine stores no plaintext
//! amounts before a reveal passes the verifier, so neither the miner nor
//! any observer can react to mining output ahead of settlement, and a
//! reveal that disagrees with its commitment is rejected with no side
//! effects.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod commit;
pub mod core;
pub mod engine;

// Re-export commonly used types
pub use commit::{ClaimVerifier, HashRevealVerifier, OreCommitment, RevealNonce, RevealPayload};
pub use core::hash::Digest32;
pub use core::miner::MinerId;
pub use core::ore::{OreAmounts, OreKind, MAX_ORE_AMOUNT};
pub use engine::claim::{ClaimId, ClaimView, RevealedOre};
pub use engine::events::{EngineEvent, EngineEventData, JournalError};
pub use engine::session::{SessionId, SessionView};
pub use engine::stats::MinerStats;
pub use engine::{EngineConfig, EngineError, MiningEngine};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of fixed ore categories
pub const ORE_KIND_COUNT: usize = 5;
