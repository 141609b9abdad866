//! Directional bias classification with temporal hysteresis
//!
//! Combines the gamma regime, walls, flow aggregates, and VWAP context
//! into a single bullish/bearish/no-trade verdict through a weighted point
//! system. A per-underlying record of the previous verdict damps
//! noise-driven reversals: an established bias only flips when the new
//! evaluation lands firmly on the opposite side.

use crate::config::BiasConfig;
use crate::flow::FlowAggregates;
use crate::regime::{GammaRegime, Regime};
use crate::walls::WallSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use services_common::{ExpiringCache, OptionType, PriceVsVwap, VwapContext};
use tracing::debug;

/// Directional verdict
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Bias {
    /// Evidence favors upside
    Bullish,
    /// Evidence favors downside
    Bearish,
    /// Evidence too weak or conflicted to act on
    NoTrade,
}

/// Bull/bear point totals for one evaluation
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Bullish points
    pub bull: f64,
    /// Bearish points
    pub bear: f64,
    /// `bull - bear`
    pub net: f64,
}

/// Prior verdict retained for hysteresis
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BiasRecord {
    /// Verdict of the prior evaluation
    pub bias: Bias,
    /// Net score of the prior evaluation
    pub net_score: f64,
    /// When the prior evaluation ran
    pub at: DateTime<Utc>,
}

/// Per-underlying verdict history, invalidated by TTL
pub type BiasHistory = ExpiringCache<String, BiasRecord>;

/// Full verdict for one underlying and one request cycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BiasResponse {
    /// Underlying ticker
    pub underlying: String,
    /// Directional verdict
    pub bias: Bias,
    /// Confidence in [0, 100]; always 0 for no-trade
    pub confidence: f64,
    /// Up to three reasons in evaluation order
    pub reasons: Vec<String>,
    /// Gamma regime input
    pub regime: GammaRegime,
    /// Flow aggregates input
    pub flow: FlowAggregates,
    /// VWAP context input
    pub context: VwapContext,
    /// Point totals
    pub score: ScoreBreakdown,
    /// Gamma walls input
    pub walls: WallSet,
    /// When this verdict was produced
    pub evaluated_at: DateTime<Utc>,
}

/// Classify an underlying's directional bias
///
/// The previous verdict (when recorded within the validity window) damps
/// reversals; the absolute no-trade floor overrides everything. The new
/// verdict is written back to the history unconditionally, no-trade
/// included.
#[allow(clippy::too_many_arguments)]
pub fn classify_bias(
    underlying: &str,
    context: VwapContext,
    regime: GammaRegime,
    flow: FlowAggregates,
    walls: WallSet,
    history: &BiasHistory,
    now: DateTime<Utc>,
    cfg: &BiasConfig,
) -> BiasResponse {
    let mut bull = 0.0;
    let mut bear = 0.0;
    let mut reasons = Vec::new();

    // Pinning: heavy long gamma near VWAP suppresses both directions and
    // supersedes the VWAP/regime interaction for this evaluation
    let pinned = regime.regime == Regime::LongGamma
        && regime.net_gamma_usd >= cfg.pin_gamma_usd
        && context.vwap_distance_pct.abs() <= cfg.pin_vwap_band_pct;
    if pinned {
        bull -= cfg.pin_penalty;
        bear -= cfg.pin_penalty;
        reasons.push(format!(
            "Pinned near VWAP in heavy long gamma (net ${:.0}M)",
            regime.net_gamma_usd / 1_000_000.0
        ));
    }

    // ATM flow imbalance: the dominant weight
    if flow.atm_imbalance > cfg.atm_imbalance_threshold {
        bull += cfg.atm_imbalance_points;
        reasons.push(format!(
            "ATM call buying dominates (imbalance {:+.2})",
            flow.atm_imbalance
        ));
    } else if flow.atm_imbalance < -cfg.atm_imbalance_threshold {
        bear += cfg.atm_imbalance_points;
        reasons.push(format!(
            "ATM put buying dominates (imbalance {:+.2})",
            flow.atm_imbalance
        ));
    }

    // Overall flow confirmation
    if flow.overall_imbalance > cfg.overall_imbalance_threshold {
        bull += cfg.overall_imbalance_points;
        reasons.push("Broad call flow confirms".to_string());
    } else if flow.overall_imbalance < -cfg.overall_imbalance_threshold {
        bear += cfg.overall_imbalance_points;
        reasons.push("Broad put flow confirms".to_string());
    }

    // VWAP/regime interaction, skipped while pinned
    if !pinned {
        match (regime.regime, context.price_vs_vwap) {
            (Regime::ShortGamma, PriceVsVwap::Above) => {
                bull += cfg.momentum_points;
                reasons.push("Short gamma above VWAP: momentum continuation".to_string());
            }
            (Regime::ShortGamma, PriceVsVwap::Below) => {
                bear += cfg.momentum_points;
                reasons.push("Short gamma below VWAP: momentum continuation".to_string());
            }
            (Regime::LongGamma, PriceVsVwap::Above) => {
                if context.vwap_distance_pct > cfg.reversion_threshold_pct {
                    bear += cfg.reversion_points;
                    reasons.push("Stretched above VWAP in long gamma: reversion risk".to_string());
                } else {
                    bull += cfg.weak_regime_points;
                    reasons.push("Holding above VWAP in long gamma".to_string());
                }
            }
            (Regime::LongGamma, PriceVsVwap::Below) => {
                if context.vwap_distance_pct < -cfg.reversion_threshold_pct {
                    bull += cfg.reversion_points;
                    reasons.push("Oversold below VWAP in long gamma: reversion".to_string());
                } else {
                    bear += cfg.weak_regime_points;
                    reasons.push("Sagging below VWAP in long gamma".to_string());
                }
            }
            _ => {}
        }
    }

    // Bursts: both sides can fire in the same evaluation
    if flow
        .bursts
        .iter()
        .any(|b| b.option_type == OptionType::Call)
    {
        bull += cfg.burst_points;
        reasons.push("Call-side notional burst".to_string());
    }
    if flow.bursts.iter().any(|b| b.option_type == OptionType::Put) {
        bear += cfg.burst_points;
        reasons.push("Put-side notional burst".to_string());
    }

    // Wall proximity
    if let Some(dist) = walls.dist_to_call_wall_pct {
        if (0.0..=cfg.wall_proximity_pct).contains(&dist) {
            bear += cfg.wall_points;
            reasons.push("Approaching call wall resistance".to_string());
        }
    }
    if let Some(dist) = walls.dist_to_put_wall_pct {
        if (-cfg.wall_proximity_pct..=0.0).contains(&dist) {
            bull += cfg.wall_points;
            reasons.push("Holding above put wall support".to_string());
        }
    }

    let net = bull - bear;
    let max_score = bull.max(bear);

    // Hysteresis against the prior verdict, when still valid
    let prior = history.get(&underlying.to_string(), now);
    let mut bias = match prior {
        Some(record) => match record.bias {
            Bias::Bullish => {
                if net < -cfg.flip_band {
                    Bias::Bearish
                } else {
                    Bias::Bullish
                }
            }
            Bias::Bearish => {
                if net > cfg.flip_band {
                    Bias::Bullish
                } else {
                    Bias::Bearish
                }
            }
            Bias::NoTrade => {
                if net > cfg.promote_band && max_score > cfg.promote_floor {
                    Bias::Bullish
                } else if net < -cfg.promote_band && max_score > cfg.promote_floor {
                    Bias::Bearish
                } else {
                    Bias::NoTrade
                }
            }
        },
        None => {
            if net > cfg.flip_band {
                Bias::Bullish
            } else if net < -cfg.flip_band {
                Bias::Bearish
            } else {
                Bias::NoTrade
            }
        }
    };

    // Absolute floor: weak evidence is never actionable
    if max_score < cfg.no_trade_floor {
        bias = Bias::NoTrade;
    }

    // A held-over verdict on a weak evaluation is labeled as such
    if let Some(record) = prior {
        if bias != Bias::NoTrade && record.bias == bias && net.abs() < cfg.flip_band {
            reasons.insert(0, "(Holding Trend)".to_string());
        }
    }

    reasons.truncate(cfg.max_reasons);

    let confidence = if bias == Bias::NoTrade {
        0.0
    } else {
        (net.abs() + 50.0).min(100.0)
    };

    history.insert(
        underlying.to_string(),
        BiasRecord {
            bias,
            net_score: net,
            at: now,
        },
        now,
    );

    debug!(
        underlying,
        ?bias,
        bull,
        bear,
        net,
        confidence,
        "bias evaluation complete"
    );

    BiasResponse {
        underlying: underlying.to_string(),
        bias,
        confidence,
        reasons,
        regime,
        flow,
        context,
        score: ScoreBreakdown { bull, bear, net },
        walls,
        evaluated_at: now,
    }
}
