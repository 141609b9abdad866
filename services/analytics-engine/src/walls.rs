//! Dealer gamma-exposure walls
//!
//! Aggregates signed gamma exposure per strike across an option chain and
//! picks out the strikes dealers are most heavily hedged around: the call
//! wall (expected resistance) and the put wall (expected support).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use services_common::{OptionQuoteSnapshot, OptionType, CONTRACT_MULTIPLIER};

/// Strikes are bucketed at cent precision for aggregation
const STRIKE_KEY_SCALE: f64 = 100.0;

/// Call/put wall strikes and the spot's distance to each
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct WallSet {
    /// Strike with the maximum positive aggregate gamma exposure
    pub call_wall: Option<f64>,
    /// Strike with the most negative aggregate gamma exposure
    pub put_wall: Option<f64>,
    /// Reserved; max-pain is not computed by this engine
    pub max_pain: Option<f64>,
    /// Percent distance from spot to the call wall (above = positive)
    pub dist_to_call_wall_pct: Option<f64>,
    /// Percent distance from spot to the put wall
    pub dist_to_put_wall_pct: Option<f64>,
}

fn strike_key(strike: f64) -> i64 {
    (strike * STRIKE_KEY_SCALE).round() as i64
}

fn key_strike(key: i64) -> f64 {
    key as f64 / STRIKE_KEY_SCALE
}

/// Aggregate per-strike dealer gamma exposure into walls
///
/// Signed exposure per contract is `gamma * OI * 100 * spot`, negated for
/// puts. Returns `None` walls when the chain is empty or one-sided; never
/// fails.
#[must_use]
pub fn compute_walls(contracts: &[OptionQuoteSnapshot], spot: f64) -> WallSet {
    let mut exposure_by_strike: FxHashMap<i64, f64> = FxHashMap::default();

    for contract in contracts {
        if contract.is_stale() {
            continue;
        }
        let gamma = contract.gamma.unwrap_or(0.0);
        let mut exposure =
            gamma * contract.open_interest as f64 * CONTRACT_MULTIPLIER * spot;
        if contract.option_type == OptionType::Put {
            exposure = -exposure;
        }
        *exposure_by_strike
            .entry(strike_key(contract.strike))
            .or_insert(0.0) += exposure;
    }

    let mut call_wall: Option<(f64, f64)> = None; // (strike, exposure)
    let mut put_wall: Option<(f64, f64)> = None;
    for (&key, &exposure) in &exposure_by_strike {
        let strike = key_strike(key);
        if exposure > 0.0 && call_wall.is_none_or(|(_, best)| exposure > best) {
            call_wall = Some((strike, exposure));
        }
        if exposure < 0.0 && put_wall.is_none_or(|(_, best)| exposure < best) {
            put_wall = Some((strike, exposure));
        }
    }

    let dist_pct = |wall: f64| {
        if spot > 0.0 {
            Some((wall - spot) / spot * 100.0)
        } else {
            None
        }
    };

    WallSet {
        call_wall: call_wall.map(|(strike, _)| strike),
        put_wall: put_wall.map(|(strike, _)| strike),
        max_pain: None,
        dist_to_call_wall_pct: call_wall.and_then(|(strike, _)| dist_pct(strike)),
        dist_to_put_wall_pct: put_wall.and_then(|(strike, _)| dist_pct(strike)),
    }
}
