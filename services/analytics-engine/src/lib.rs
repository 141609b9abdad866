//! FlowDesk options analytics engine
//!
//! The deterministic analytics core behind the dashboard:
//! - Rule-based unusual-options-trade scoring over chain snapshots
//! - Per-strike dealer gamma walls (resistance/support levels)
//! - 0DTE gamma regime classification with flip detection
//! - Aggressor-side flow aggregation with notional burst detection
//! - Hysteresis-damped bullish/bearish/no-trade classification
//!
//! Market data arrives through the [`provider::MarketDataProvider`] seam;
//! vendor adapters and the HTTP layer live outside this crate.

pub mod bias;
pub mod config;
pub mod flow;
pub mod provider;
pub mod regime;
pub mod scorer;
pub mod state;
pub mod walls;

pub use bias::{Bias, BiasRecord, BiasResponse, ScoreBreakdown};
pub use config::EngineConfig;
pub use flow::{FlowAggregates, FlowBurst};
pub use provider::{MarketDataProvider, StaticProvider};
pub use regime::{GammaRegime, Regime};
pub use scorer::{CandidateFlag, TradeIntent, UnusualTradeCandidate};
pub use walls::WallSet;

use crate::regime::GammaHistory;
use crate::state::EngineState;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Request-cycle orchestrator over the analytics engines
///
/// One chain snapshot per request is shared by the wall, regime, and flow
/// engines so all three agree on which contracts are active.
pub struct SignalEngine {
    provider: Arc<dyn MarketDataProvider>,
    config: EngineConfig,
    state: EngineState,
}

impl SignalEngine {
    /// Create an engine over a market data provider
    #[must_use]
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: EngineConfig) -> Self {
        let state = EngineState::new(&config);
        Self {
            provider,
            config,
            state,
        }
    }

    /// Engine configuration in effect
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate an underlying's directional bias at the current time
    pub async fn evaluate(&self, underlying: &str) -> Result<BiasResponse> {
        self.evaluate_at(underlying, Utc::now()).await
    }

    /// Evaluate an underlying's directional bias as of `now`
    pub async fn evaluate_at(
        &self,
        underlying: &str,
        now: DateTime<Utc>,
    ) -> Result<BiasResponse> {
        let chain = self
            .provider
            .option_chain(underlying)
            .await
            .with_context(|| format!("option chain fetch for {underlying}"))?;
        let spot = self
            .provider
            .spot_price(underlying)
            .await
            .with_context(|| format!("spot price fetch for {underlying}"))?;
        let context = self
            .provider
            .vwap_context(underlying)
            .await
            .with_context(|| format!("VWAP context fetch for {underlying}"))?;

        let walls = walls::compute_walls(&chain, spot);

        let regime = {
            let mut history = self
                .state
                .gamma_history
                .entry(underlying.to_string())
                .or_insert_with(|| {
                    GammaHistory::new(self.config.regime.history_window_secs)
                });
            regime::compute_regime(&chain, spot, history.value_mut(), now, &self.config.regime)
        };

        let flow = flow::aggregate_flow(
            self.provider.as_ref(),
            &self.state.trade_cache,
            &chain,
            spot,
            now,
            &self.config.flow,
        )
        .await;

        let response = bias::classify_bias(
            underlying,
            context,
            regime,
            flow,
            walls,
            &self.state.bias_history,
            now,
            &self.config.bias,
        );

        info!(
            underlying,
            bias = ?response.bias,
            confidence = response.confidence,
            "bias evaluated"
        );
        Ok(response)
    }

    /// Scan an underlying's chain for unusual trades at the current time
    pub async fn scan(&self, underlying: &str) -> Result<Vec<UnusualTradeCandidate>> {
        self.scan_at(underlying, Utc::now()).await
    }

    /// Scan an underlying's chain for unusual trades as of `now`
    pub async fn scan_at(
        &self,
        underlying: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<UnusualTradeCandidate>> {
        let chain = self
            .provider
            .option_chain(underlying)
            .await
            .with_context(|| format!("option chain fetch for {underlying}"))?;
        Ok(scorer::scan_chain(&chain, now, &self.config.scorer))
    }
}
