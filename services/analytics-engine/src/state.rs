//! Shared engine state, keyed per underlying
//!
//! All cross-request state lives here as explicit, injectable objects
//! rather than module-level globals: concurrent requests for different
//! tickers each get their own history entry and cannot corrupt another
//! ticker's hysteresis or gamma window.

use crate::bias::BiasHistory;
use crate::config::EngineConfig;
use crate::flow::TradeCache;
use crate::regime::GammaHistory;
use chrono::Duration;
use dashmap::DashMap;
use services_common::ExpiringCache;

/// Mutable state shared across request cycles
#[derive(Debug)]
pub struct EngineState {
    /// Rolling net-gamma windows, one per underlying
    pub gamma_history: DashMap<String, GammaHistory>,
    /// Prior bias verdicts, one per underlying
    pub bias_history: BiasHistory,
    /// Recent trade prints, one entry per contract symbol
    pub trade_cache: TradeCache,
}

impl EngineState {
    /// Create empty state with TTLs taken from the config
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            gamma_history: DashMap::new(),
            bias_history: ExpiringCache::new(Duration::seconds(
                config.bias.history_validity_secs,
            )),
            trade_cache: ExpiringCache::new(Duration::seconds(
                config.flow.trade_cache_ttl_secs,
            )),
        }
    }
}
