//! Market data provider seam
//!
//! The engines never talk to a vendor API directly; everything flows
//! through this trait. Live adapters (quote vendors, chain snapshot APIs)
//! live outside this crate. [`StaticProvider`] is the in-memory
//! implementation used by the replay CLI and the test suites.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use services_common::{OptionQuoteSnapshot, ServiceError, TradePrint, VwapContext};

/// Read-only market data source for one request cycle
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Option chain snapshot for an underlying
    async fn option_chain(
        &self,
        underlying: &str,
    ) -> Result<Vec<OptionQuoteSnapshot>, ServiceError>;

    /// Recent trade prints for one contract
    async fn recent_trades(
        &self,
        contract_symbol: &str,
    ) -> Result<Vec<TradePrint>, ServiceError>;

    /// Intraday VWAP context for an underlying
    async fn vwap_context(&self, underlying: &str) -> Result<VwapContext, ServiceError>;

    /// Last/close price of an underlying
    async fn spot_price(&self, underlying: &str) -> Result<f64, ServiceError>;
}

/// In-memory provider backed by preloaded data
///
/// Missing chains and trade lists resolve to empty collections (the
/// engines treat "no data" as empty input); missing spot or VWAP context
/// is an error because nothing downstream can substitute for them.
#[derive(Debug, Default)]
pub struct StaticProvider {
    chains: FxHashMap<String, Vec<OptionQuoteSnapshot>>,
    trades: FxHashMap<String, Vec<TradePrint>>,
    contexts: FxHashMap<String, VwapContext>,
    spots: FxHashMap<String, f64>,
}

impl StaticProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a chain snapshot for an underlying
    #[must_use]
    pub fn with_chain(mut self, underlying: &str, chain: Vec<OptionQuoteSnapshot>) -> Self {
        self.chains.insert(underlying.to_string(), chain);
        self
    }

    /// Preload trade prints for a contract
    #[must_use]
    pub fn with_trades(mut self, contract_symbol: &str, trades: Vec<TradePrint>) -> Self {
        self.trades.insert(contract_symbol.to_string(), trades);
        self
    }

    /// Preload a VWAP context for an underlying
    #[must_use]
    pub fn with_context(mut self, underlying: &str, context: VwapContext) -> Self {
        self.contexts.insert(underlying.to_string(), context);
        self
    }

    /// Preload a spot price for an underlying
    #[must_use]
    pub fn with_spot(mut self, underlying: &str, spot: f64) -> Self {
        self.spots.insert(underlying.to_string(), spot);
        self
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    async fn option_chain(
        &self,
        underlying: &str,
    ) -> Result<Vec<OptionQuoteSnapshot>, ServiceError> {
        Ok(self.chains.get(underlying).cloned().unwrap_or_default())
    }

    async fn recent_trades(
        &self,
        contract_symbol: &str,
    ) -> Result<Vec<TradePrint>, ServiceError> {
        Ok(self.trades.get(contract_symbol).cloned().unwrap_or_default())
    }

    async fn vwap_context(&self, underlying: &str) -> Result<VwapContext, ServiceError> {
        self.contexts.get(underlying).copied().ok_or_else(|| {
            ServiceError::ServiceUnavailable(format!("no VWAP context for {underlying}"))
        })
    }

    async fn spot_price(&self, underlying: &str) -> Result<f64, ServiceError> {
        if let Some(spot) = self.spots.get(underlying) {
            return Ok(*spot);
        }
        // Fall back to the capture-time underlying price in the chain
        self.chains
            .get(underlying)
            .and_then(|chain| chain.first())
            .map(|c| c.underlying_price)
            .ok_or_else(|| {
                ServiceError::ServiceUnavailable(format!("no spot price for {underlying}"))
            })
    }
}
