//! Trade-print flow aggregation
//!
//! Samples recent prints for the most active contracts in a chain,
//! classifies each print's aggressor side against the snapshot quote,
//! accumulates notional pressure into call/put and ATM buckets, and
//! detects short notional bursts. Rebuilt from scratch on every request;
//! the only persistent piece is the short-lived per-contract trade cache.

use crate::config::FlowConfig;
use crate::provider::MarketDataProvider;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use services_common::{ExpiringCache, OptionQuoteSnapshot, OptionType, TradePrint, TradeSide};
use tracing::warn;

/// Per-contract trade print cache, keyed by contract symbol
pub type TradeCache = ExpiringCache<String, Vec<TradePrint>>;

/// A concentrated run of prints in one contract
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowBurst {
    /// Contract the burst printed in
    pub contract_symbol: String,
    /// Strike of the contract
    pub strike: f64,
    /// Call or put
    pub option_type: OptionType,
    /// Combined USD notional inside the burst window
    pub notional_usd: f64,
    /// Timestamp of the latest print in the burst
    pub timestamp: DateTime<Utc>,
}

/// Accumulated notional pressure for one underlying
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FlowAggregates {
    /// Buyer-initiated call notional
    pub call_ask_notional: f64,
    /// Seller-initiated call notional
    pub call_bid_notional: f64,
    /// Buyer-initiated put notional
    pub put_ask_notional: f64,
    /// Seller-initiated put notional
    pub put_bid_notional: f64,
    /// Buyer-initiated call notional at the money
    pub atm_call_ask_notional: f64,
    /// Buyer-initiated put notional at the money
    pub atm_put_ask_notional: f64,
    /// Ask-side call/put imbalance in [-1, 1], 0 when no ask-side flow
    pub overall_imbalance: f64,
    /// ATM ask-side call/put imbalance in [-1, 1]
    pub atm_imbalance: f64,
    /// Detected bursts, ranked by notional
    pub bursts: Vec<FlowBurst>,
    /// Chain volume over open interest per hundred contracts
    pub relative_volume: f64,
    /// Contracts whose prints were sampled
    pub contracts_sampled: usize,
}

/// Classify a print's aggressor side against the prevailing quote
///
/// At or through the ask is buyer-initiated, at or through the bid is
/// seller-initiated; in between, the midpoint decides, and an exact
/// midpoint print stays unclassified.
#[must_use]
pub fn classify_side(price: f64, bid: f64, ask: f64) -> TradeSide {
    if price >= ask {
        return TradeSide::Ask;
    }
    if price <= bid {
        return TradeSide::Bid;
    }
    let midpoint = (bid + ask) / 2.0;
    if price > midpoint {
        TradeSide::Ask
    } else if price < midpoint {
        TradeSide::Bid
    } else {
        TradeSide::Mid
    }
}

fn normalized_imbalance(call_notional: f64, put_notional: f64) -> f64 {
    let total = call_notional + put_notional;
    if total > 0.0 {
        (call_notional - put_notional) / total
    } else {
        0.0
    }
}

/// Most active contracts by a volume-times-strike notional proxy
fn select_active_contracts<'a>(
    chain: &'a [OptionQuoteSnapshot],
    cfg: &FlowConfig,
) -> Vec<&'a OptionQuoteSnapshot> {
    let mut active: Vec<&OptionQuoteSnapshot> = chain
        .iter()
        .filter(|c| !c.is_stale() && c.day_volume > 0)
        .collect();
    active.sort_by(|a, b| {
        let a_proxy = a.day_volume as f64 * a.strike;
        let b_proxy = b.day_volume as f64 * b.strike;
        b_proxy.total_cmp(&a_proxy)
    });
    active.truncate(cfg.max_contracts);
    active
}

fn detect_burst(
    contract: &OptionQuoteSnapshot,
    prints: &[TradePrint],
    now: DateTime<Utc>,
    cfg: &FlowConfig,
) -> Option<FlowBurst> {
    let cutoff = now - Duration::seconds(cfg.burst_window_secs);
    let window: Vec<&TradePrint> = prints.iter().filter(|p| p.timestamp >= cutoff).collect();
    if window.len() < cfg.burst_min_prints {
        return None;
    }
    let notional: f64 = window.iter().map(|p| p.notional()).sum();
    if notional < cfg.burst_min_notional_usd {
        return None;
    }
    let latest = window.iter().map(|p| p.timestamp).max()?;
    Some(FlowBurst {
        contract_symbol: contract.contract_symbol.clone(),
        strike: contract.strike,
        option_type: contract.option_type,
        notional_usd: notional,
        timestamp: latest,
    })
}

/// Aggregate recent trade flow for one underlying's chain
///
/// Trade prints for the selected contracts are fetched in parallel; a
/// failed fetch degrades to an empty print list for that contract. The
/// per-contract cache keeps rapid successive requests from refetching.
pub async fn aggregate_flow(
    provider: &dyn MarketDataProvider,
    cache: &TradeCache,
    chain: &[OptionQuoteSnapshot],
    spot: f64,
    now: DateTime<Utc>,
    cfg: &FlowConfig,
) -> FlowAggregates {
    let selected = select_active_contracts(chain, cfg);

    // Resolve prints from cache first, then fan out for the misses
    let mut prints_by_contract: Vec<Option<Vec<TradePrint>>> = selected
        .iter()
        .map(|c| cache.get(&c.contract_symbol, now))
        .collect();

    let misses: Vec<usize> = prints_by_contract
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.is_none().then_some(i))
        .collect();
    let fetches = misses
        .iter()
        .map(|&i| provider.recent_trades(&selected[i].contract_symbol));
    let fetched = join_all(fetches).await;

    for (&i, result) in misses.iter().zip(fetched) {
        let symbol = &selected[i].contract_symbol;
        let prints = match result {
            Ok(prints) => prints,
            Err(e) => {
                warn!(contract = %symbol, error = %e, "trade fetch failed; treating as no prints");
                Vec::new()
            }
        };
        cache.insert(symbol.clone(), prints.clone(), now);
        prints_by_contract[i] = Some(prints);
    }

    let mut aggregates = FlowAggregates {
        contracts_sampled: selected.len(),
        ..FlowAggregates::default()
    };
    let atm_band = spot * cfg.atm_band_pct / 100.0;
    let mut bursts = Vec::new();

    for (contract, prints) in selected.iter().zip(&prints_by_contract) {
        let prints = prints.as_deref().unwrap_or(&[]);
        let is_atm = (contract.strike - spot).abs() <= atm_band;

        for print in prints {
            let notional = print.notional();
            let side = classify_side(print.price, contract.bid, contract.ask);
            match (contract.option_type, side) {
                (OptionType::Call, TradeSide::Ask) => {
                    aggregates.call_ask_notional += notional;
                    if is_atm {
                        aggregates.atm_call_ask_notional += notional;
                    }
                }
                (OptionType::Call, TradeSide::Bid) => {
                    aggregates.call_bid_notional += notional;
                }
                (OptionType::Put, TradeSide::Ask) => {
                    aggregates.put_ask_notional += notional;
                    if is_atm {
                        aggregates.atm_put_ask_notional += notional;
                    }
                }
                (OptionType::Put, TradeSide::Bid) => {
                    aggregates.put_bid_notional += notional;
                }
                // Exact-midpoint prints carry no directional information
                (_, TradeSide::Mid) => {}
            }
        }

        if let Some(burst) = detect_burst(contract, prints, now, cfg) {
            bursts.push(burst);
        }
    }

    bursts.sort_by(|a, b| b.notional_usd.total_cmp(&a.notional_usd));
    bursts.truncate(cfg.max_bursts);
    aggregates.bursts = bursts;

    aggregates.overall_imbalance =
        normalized_imbalance(aggregates.call_ask_notional, aggregates.put_ask_notional);
    aggregates.atm_imbalance = normalized_imbalance(
        aggregates.atm_call_ask_notional,
        aggregates.atm_put_ask_notional,
    );

    // Whole-chain relative volume, an auxiliary context value
    let total_volume: u64 = chain.iter().map(|c| c.day_volume).sum();
    let total_oi: u64 = chain.iter().map(|c| c.open_interest).sum();
    aggregates.relative_volume = if total_oi > 0 {
        total_volume as f64 / (total_oi as f64 / 100.0)
    } else {
        0.0
    };

    aggregates
}
