//! 0DTE gamma regime engine
//!
//! Sums signed gamma and delta exposure across a chain snapshot, keeps a
//! rolling history of net gamma per underlying, and classifies the market
//! into a dealer-positioning regime. The long/short thresholds are
//! asymmetric: short-gamma destabilization is treated as actionable at a
//! third of the magnitude that long-gamma pinning requires.

use crate::config::RegimeConfig;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use services_common::{OptionQuoteSnapshot, OptionType, TimeWindow, CONTRACT_MULTIPLIER};
use tracing::debug;

/// Dealer gamma positioning regime
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Regime {
    /// Dealers long gamma; hedging dampens moves toward pinning
    LongGamma,
    /// Dealers short gamma; hedging amplifies moves
    ShortGamma,
    /// No dominant positioning
    Neutral,
}

/// Net chain exposure and regime classification
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GammaRegime {
    /// Regime classification
    pub regime: Regime,
    /// Net signed gamma exposure in USD
    pub net_gamma_usd: f64,
    /// Net signed delta exposure in contracts-equivalent
    pub net_delta: f64,
    /// Net gamma crossed a material extreme inside the history window
    pub gamma_flip: bool,
}

/// Rolling net-gamma history for one underlying
#[derive(Debug, Clone)]
pub struct GammaHistory {
    window: TimeWindow<f64>,
}

impl GammaHistory {
    /// Create a history spanning `window_secs` of samples
    #[must_use]
    pub fn new(window_secs: i64) -> Self {
        Self {
            window: TimeWindow::new(Duration::seconds(window_secs)),
        }
    }

    fn record(&mut self, at: DateTime<Utc>, net_gamma_usd: f64) {
        self.window.push(at, net_gamma_usd);
    }

    fn has_sample_at_least(&self, floor: f64) -> bool {
        self.window.iter().any(|(_, g)| *g >= floor)
    }

    fn has_sample_at_most(&self, ceiling: f64) -> bool {
        self.window.iter().any(|(_, g)| *g <= ceiling)
    }

    /// Number of retained samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

/// Compute the chain's net exposure, update the history, and classify
///
/// The current sample is recorded before flip detection, so a single
/// request observing an extreme counts toward its own flip check.
pub fn compute_regime(
    contracts: &[OptionQuoteSnapshot],
    spot: f64,
    history: &mut GammaHistory,
    now: DateTime<Utc>,
    cfg: &RegimeConfig,
) -> GammaRegime {
    let mut net_gamma_usd = 0.0;
    let mut net_delta = 0.0;

    for contract in contracts {
        if contract.is_stale() {
            continue;
        }
        let oi = contract.open_interest as f64;
        let gamma_exposure =
            contract.gamma.unwrap_or(0.0) * oi * CONTRACT_MULTIPLIER * spot;
        net_gamma_usd += match contract.option_type {
            OptionType::Call => gamma_exposure,
            OptionType::Put => -gamma_exposure,
        };
        // Delta carries its own sign per contract type already
        net_delta += contract.delta.unwrap_or(0.0) * oi * CONTRACT_MULTIPLIER;
    }

    history.record(now, net_gamma_usd);

    // Flip: the current sample sits at one ±extreme while the window holds
    // the opposite extreme
    let gamma_flip = if net_gamma_usd >= cfg.flip_extreme_usd {
        history.has_sample_at_most(-cfg.flip_extreme_usd)
    } else if net_gamma_usd <= -cfg.flip_extreme_usd {
        history.has_sample_at_least(cfg.flip_extreme_usd)
    } else {
        false
    };

    let regime = if net_gamma_usd > cfg.long_gamma_usd {
        Regime::LongGamma
    } else if net_gamma_usd < cfg.short_gamma_usd {
        Regime::ShortGamma
    } else {
        Regime::Neutral
    };

    if gamma_flip {
        debug!(net_gamma_usd, "gamma flip detected inside history window");
    }

    GammaRegime {
        regime,
        net_gamma_usd,
        net_delta,
        gamma_flip,
    }
}
