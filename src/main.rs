//! Ore Vault Demo Driver
//!
//! Runs one full mining lifecycle against the engine: start a session,
//! accrue ore, end, commit, attempt a forged reveal, then settle
//! honestly and dump the journal.

use anyhow::Result;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ore_vault::{
    EngineConfig, EngineError, MinerId, MiningEngine, OreAmounts, OreCommitment, OreKind,
    RevealPayload, ORE_KIND_COUNT, VERSION,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Ore Vault Engine v{}", VERSION);

    demo_lifecycle().await
}

/// Demo function driving a complete commit-reveal settlement.
async fn demo_lifecycle() -> Result<()> {
    info!("=== Starting Demo Session ===");

    let engine = MiningEngine::new(EngineConfig::default());
    let miner = MinerId::new([1; 16]);

    let session_id = engine.start_session(miner).await?;
    info!("Session {} started for miner {}", session_id, miner);

    // Simulate mining pulses with a deterministic yield pattern,
    // one to five ore per pulse.
    let mut tally = [0u32; ORE_KIND_COUNT];
    for t in 0u32..12 {
        let kind = OreKind::from_index((t * 3 % 5) as u8).expect("index in range");
        let amount = t * 7 % 5 + 1;
        engine.record_mining_event(session_id, kind, amount).await?;
        tally[kind as usize] += amount;
    }

    engine.end_session(session_id, miner).await?;
    let session = engine.get_session(session_id).await?;
    info!(
        "Session ended: total_mined={} active={}",
        session.total_mined, session.is_active
    );

    // Commit to the mined amounts; the engine sees only the hash.
    let amounts = OreAmounts::checked(tally).expect("demo yields stay in range");
    let nonce = [42u8; 32];
    let payload = RevealPayload::for_amounts(amounts, nonce);
    let commitment = OreCommitment::bind(&payload);

    let claim_id = engine.create_claim(session_id, miner, commitment).await?;
    let hidden = engine.get_claim(claim_id).await?;
    info!(
        "Claim {} created, amounts visible: {}",
        claim_id,
        hidden.amounts.is_some()
    );

    // A forged reveal (inflated gold) bounces off the verifier.
    let mut forged = tally;
    forged[OreKind::Gold as usize] += 10;
    let forged_total = OreAmounts::checked(forged).expect("still in range").value();
    match engine
        .reveal_claim(claim_id, miner, forged, forged_total, nonce)
        .await
    {
        Err(EngineError::VerificationFailed) => {
            warn!("Forged reveal rejected, claim still hidden")
        }
        other => anyhow::bail!("expected verification failure, got {other:?}"),
    }

    // The honest reveal settles the claim.
    engine
        .reveal_claim(claim_id, miner, tally, payload.total_value, nonce)
        .await?;

    info!("=== Settlement Results ===");
    let claim = engine.get_claim(claim_id).await?;
    for kind in OreKind::ALL {
        let amount = claim.amounts.map(|a| a.get(kind)).unwrap_or(0);
        info!("{:?}: {}", kind, amount);
    }
    info!("Total value: {:?}", claim.total_value);

    let stats = engine.get_stats(miner).await;
    info!(
        "Miner stats: sessions={} ores={} reputation={}",
        stats.total_sessions, stats.total_ores_mined, stats.reputation
    );

    let events = engine.events().await;
    info!("Journal: {} events", events.len());
    println!("{}", serde_json::to_string_pretty(&events)?);
    info!("Journal digest: {}", hex::encode(engine.journal_digest().await));

    Ok(())
}
