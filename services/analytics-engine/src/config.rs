//! Analytics engine configuration
//!
//! Single source of truth for every threshold the engines apply. All
//! sub-configs are serde types so deployments can override them from a
//! JSON file without recompiling.

use serde::{Deserialize, Serialize};
use services_common::SECS_PER_MIN;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Unusual-trade scorer thresholds
    pub scorer: ScorerConfig,
    /// Gamma regime thresholds
    pub regime: RegimeConfig,
    /// Flow aggregation thresholds
    pub flow: FlowConfig,
    /// Bias classification weights
    pub bias: BiasConfig,
}

/// Candidate scorer thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Hard rejection bound on bid-ask spread as a fraction of midpoint
    pub max_spread_fraction: f64,
    /// Soft liquidity gate: minimum trade size in contracts
    pub min_trade_size: f64,
    /// Soft liquidity gate: minimum USD premium
    pub min_premium_usd: f64,
    /// Soft liquidity gate: minimum option price
    pub min_price: f64,
    /// Points subtracted per violated soft gate
    pub gate_penalty: f64,
    /// Price must be within this of the ask to count as at-ask
    pub at_ask_tolerance: f64,
    /// Conviction boost for at-ask prints
    pub at_ask_boost: f64,
    /// Days-to-expiry bound for the near-term boost and flag
    pub near_term_days: i64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            max_spread_fraction: 0.40, // catastrophically illiquid beyond this
            min_trade_size: 10.0,
            min_premium_usd: 25_000.0,
            min_price: 0.10,
            gate_penalty: 15.0,
            at_ask_tolerance: 0.01,
            at_ask_boost: 10.0,
            near_term_days: 14,
        }
    }
}

/// Gamma regime thresholds, all in USD of dealer gamma exposure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeConfig {
    /// Net gamma above this is a long-gamma (pinning) regime
    pub long_gamma_usd: f64,
    /// Net gamma below this is a short-gamma (destabilized) regime
    pub short_gamma_usd: f64,
    /// Magnitude a sample must reach to count as a flip extreme
    pub flip_extreme_usd: f64,
    /// Rolling history horizon in seconds
    pub history_window_secs: i64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            long_gamma_usd: 300_000_000.0,
            short_gamma_usd: -100_000_000.0,
            flip_extreme_usd: 100_000_000.0,
            history_window_secs: 15 * SECS_PER_MIN,
        }
    }
}

/// Flow aggregation thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Number of most-active contracts to sample trade prints for
    pub max_contracts: usize,
    /// Per-contract trade print cache TTL in seconds
    pub trade_cache_ttl_secs: i64,
    /// Strike within this percent of spot counts as at-the-money
    pub atm_band_pct: f64,
    /// Trailing window for burst detection in seconds
    pub burst_window_secs: i64,
    /// Minimum prints inside the window for a burst
    pub burst_min_prints: usize,
    /// Minimum combined USD notional inside the window for a burst
    pub burst_min_notional_usd: f64,
    /// Bursts retained, ranked by notional
    pub max_bursts: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_contracts: 10, // bounds the trade-fetch fan-out
            trade_cache_ttl_secs: 15,
            atm_band_pct: 0.3,
            burst_window_secs: SECS_PER_MIN,
            burst_min_prints: 3,
            burst_min_notional_usd: 500_000.0,
            max_bursts: 3,
        }
    }
}

/// Bias classification weights and hysteresis bands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasConfig {
    /// Long-gamma magnitude that arms the pinning penalty
    pub pin_gamma_usd: f64,
    /// VWAP distance band (percent, absolute) for the pinning penalty
    pub pin_vwap_band_pct: f64,
    /// Points subtracted from both sides when pinned
    pub pin_penalty: f64,
    /// ATM imbalance magnitude that fires the dominant flow signal
    pub atm_imbalance_threshold: f64,
    /// Points for the ATM flow signal
    pub atm_imbalance_points: f64,
    /// Overall imbalance magnitude for the confirmation signal
    pub overall_imbalance_threshold: f64,
    /// Points for the overall flow confirmation
    pub overall_imbalance_points: f64,
    /// Points for short-gamma momentum continuation
    pub momentum_points: f64,
    /// VWAP distance (percent) past which long gamma implies reversion
    pub reversion_threshold_pct: f64,
    /// Points for the long-gamma reversion signal
    pub reversion_points: f64,
    /// Points for the weak long-gamma support/pressure signal
    pub weak_regime_points: f64,
    /// Points per burst side
    pub burst_points: f64,
    /// Wall proximity band in percent of spot
    pub wall_proximity_pct: f64,
    /// Points for wall proximity
    pub wall_points: f64,
    /// Net-score band inside which an established bias will not flip
    pub flip_band: f64,
    /// Net-score magnitude required to promote out of no-trade
    pub promote_band: f64,
    /// Max-score floor required to promote out of no-trade
    pub promote_floor: f64,
    /// Absolute max-score floor below which the verdict is no-trade
    pub no_trade_floor: f64,
    /// Seconds a prior verdict stays valid for hysteresis
    pub history_validity_secs: i64,
    /// Reasons reported per verdict
    pub max_reasons: usize,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self {
            pin_gamma_usd: 200_000_000.0,
            pin_vwap_band_pct: 0.25,
            pin_penalty: 20.0,
            atm_imbalance_threshold: 0.2,
            atm_imbalance_points: 25.0, // immediate intent dominates
            overall_imbalance_threshold: 0.15,
            overall_imbalance_points: 10.0,
            momentum_points: 20.0,
            reversion_threshold_pct: 0.5,
            reversion_points: 15.0,
            weak_regime_points: 5.0,
            burst_points: 15.0,
            wall_proximity_pct: 0.3,
            wall_points: 10.0,
            flip_band: 10.0,
            promote_band: 15.0,
            promote_floor: 45.0,
            no_trade_floor: 40.0,
            history_validity_secs: SECS_PER_MIN,
            max_reasons: 3,
        }
    }
}
