//! Offline replay tool for the analytics engine
//!
//! Loads a captured market snapshot (option chain, trade prints, VWAP
//! context) from JSON, runs the full analytics pipeline over it, and
//! prints the verdict. Useful for reproducing a dashboard reading from a
//! capture file without any vendor connectivity.

use analytics_engine::{EngineConfig, SignalEngine, StaticProvider};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use services_common::{OptionQuoteSnapshot, TradePrint, VwapContext};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "analytics-engine",
    about = "Replay a captured options snapshot through the analytics engine"
)]
struct Args {
    /// Path to a captured snapshot file (JSON)
    #[arg(long)]
    snapshot: PathBuf,

    /// Underlying ticker to analyze
    #[arg(long)]
    underlying: String,

    /// Optional engine config overrides (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also run the unusual-trade scan and print ranked candidates
    #[arg(long)]
    scan: bool,
}

/// On-disk capture format consumed by the replay tool
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    /// Option chain snapshot
    chain: Vec<OptionQuoteSnapshot>,
    /// Recent trade prints keyed by contract symbol
    #[serde(default)]
    trades: HashMap<String, Vec<TradePrint>>,
    /// Externally computed VWAP context
    vwap: VwapContext,
    /// Spot override; defaults to the chain's capture-time underlying price
    #[serde(default)]
    spot: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("analytics_engine=debug,info")
        .init();

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("reading snapshot {}", args.snapshot.display()))?;
    let snapshot: SnapshotFile =
        serde_json::from_str(&raw).context("parsing snapshot JSON")?;

    let config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw).context("parsing config JSON")?
        }
        None => EngineConfig::default(),
    };

    info!(
        underlying = %args.underlying,
        contracts = snapshot.chain.len(),
        trade_lists = snapshot.trades.len(),
        "replaying captured snapshot"
    );

    let mut provider = StaticProvider::new()
        .with_chain(&args.underlying, snapshot.chain)
        .with_context(&args.underlying, snapshot.vwap);
    for (contract, prints) in snapshot.trades {
        provider = provider.with_trades(&contract, prints);
    }
    if let Some(spot) = snapshot.spot {
        provider = provider.with_spot(&args.underlying, spot);
    }

    let engine = SignalEngine::new(Arc::new(provider), config);

    let verdict = engine.evaluate(&args.underlying).await?;
    println!("{}", serde_json::to_string_pretty(&verdict)?);

    if args.scan {
        let candidates = engine.scan(&args.underlying).await?;
        info!(count = candidates.len(), "unusual-trade scan complete");
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    }

    Ok(())
}
