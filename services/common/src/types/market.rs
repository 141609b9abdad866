//! Canonical market data types for option chain analytics

use crate::constants::CONTRACT_MULTIPLIER;
use crate::errors::ServiceError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Option contract right
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Call option - right to buy the underlying at strike
    Call,
    /// Put option - right to sell the underlying at strike
    Put,
}

/// Aggressor side of a trade print relative to the prevailing quote
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    /// Printed at or through the ask (buyer-initiated)
    Ask,
    /// Printed at or through the bid (seller-initiated)
    Bid,
    /// Printed exactly at the midpoint
    Mid,
}

/// Position of the last price relative to the session VWAP
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PriceVsVwap {
    /// Trading above VWAP
    Above,
    /// Trading below VWAP
    Below,
    /// Trading at VWAP
    At,
}

/// One contract's point-in-time market state
///
/// Immutable once captured. Greeks and IV are optional because snapshot
/// providers routinely omit them after hours; `None` means "not supplied",
/// which the engines treat as a zero contribution rather than an error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptionQuoteSnapshot {
    /// OCC-style contract symbol, e.g. `SPY240621C00450000`
    pub contract_symbol: String,
    /// Underlying ticker
    pub underlying_symbol: String,
    /// Strike price
    pub strike: f64,
    /// Call or put
    pub option_type: OptionType,
    /// Expiration trading date (UTC)
    pub expiration_date: NaiveDate,
    /// Best bid
    pub bid: f64,
    /// Best ask
    pub ask: f64,
    /// Last trade price
    pub last_trade_price: f64,
    /// Last trade size in contracts
    pub last_trade_size: f64,
    /// Session volume in contracts
    pub day_volume: u64,
    /// Open interest in contracts
    pub open_interest: u64,
    /// Delta, if the provider supplied Greeks
    pub delta: Option<f64>,
    /// Gamma, if the provider supplied Greeks
    pub gamma: Option<f64>,
    /// Theta, if the provider supplied Greeks
    pub theta: Option<f64>,
    /// Vega, if the provider supplied Greeks
    pub vega: Option<f64>,
    /// Implied volatility, if the provider supplied it
    pub implied_volatility: Option<f64>,
    /// Underlying last price at capture time
    pub underlying_price: f64,
}

impl OptionQuoteSnapshot {
    /// Quote midpoint
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Bid-ask spread as a fraction of the midpoint, `None` when the
    /// midpoint is not positive
    #[must_use]
    pub fn spread_fraction(&self) -> Option<f64> {
        let mid = self.midpoint();
        if mid > 0.0 {
            Some((self.ask - self.bid) / mid)
        } else {
            None
        }
    }

    /// A crossed or negative quote marks the snapshot stale; stale
    /// snapshots are skipped by every engine
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.ask < self.bid || self.bid < 0.0
    }
}

/// A single trade print for one contract
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TradePrint {
    /// Trade price
    pub price: f64,
    /// Trade size in contracts
    pub size: f64,
    /// Exchange timestamp
    pub timestamp: DateTime<Utc>,
}

impl TradePrint {
    /// USD notional of the print
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.price * CONTRACT_MULTIPLIER * self.size
    }
}

/// Intraday VWAP context computed externally from minute bars
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VwapContext {
    /// Session volume-weighted average price
    pub vwap: f64,
    /// Whether the last price sits above or below VWAP
    pub price_vs_vwap: PriceVsVwap,
    /// Signed distance from VWAP in percent (above = positive)
    pub vwap_distance_pct: f64,
}

/// Components parsed out of an OCC-style contract symbol
#[derive(Clone, Debug, PartialEq)]
pub struct OccSymbol {
    /// Underlying root, e.g. `SPY`
    pub underlying: String,
    /// Expiration date encoded in the symbol
    pub expiration: NaiveDate,
    /// Call or put flag
    pub option_type: OptionType,
    /// Strike price
    pub strike: f64,
}

/// Parse an OCC-style option symbol: root + YYMMDD + C|P + strike*1000
///
/// Accepts an optional `O:` prefix as emitted by some snapshot providers.
pub fn parse_occ_symbol(symbol: &str) -> Result<OccSymbol, ServiceError> {
    let body = symbol.strip_prefix("O:").unwrap_or(symbol);
    if !body.is_ascii() {
        return Err(ServiceError::SymbolParse(format!(
            "non-ascii symbol: {symbol}"
        )));
    }
    if body.len() < 16 {
        return Err(ServiceError::SymbolParse(format!(
            "symbol too short: {symbol}"
        )));
    }

    let (root, tail) = body.split_at(body.len() - 15);
    if root.is_empty() {
        return Err(ServiceError::SymbolParse(format!(
            "missing underlying root: {symbol}"
        )));
    }

    let expiration = NaiveDate::parse_from_str(&tail[..6], "%y%m%d")
        .map_err(|e| ServiceError::SymbolParse(format!("bad expiry in {symbol}: {e}")))?;

    let option_type = match &tail[6..7] {
        "C" => OptionType::Call,
        "P" => OptionType::Put,
        other => {
            return Err(ServiceError::SymbolParse(format!(
                "bad call/put flag '{other}' in {symbol}"
            )));
        }
    };

    let strike_milli: u64 = tail[7..]
        .parse()
        .map_err(|e| ServiceError::SymbolParse(format!("bad strike in {symbol}: {e}")))?;

    Ok(OccSymbol {
        underlying: root.to_string(),
        expiration,
        option_type,
        strike: strike_milli as f64 / 1000.0,
    })
}
