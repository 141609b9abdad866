//! Rule-based unusual-options-trade scorer
//!
//! Pure and deterministic: one (trade, quote, contract) observation in, one
//! scored candidate (or a rejection) out. The only hard rejection is a
//! catastrophically wide spread; every other liquidity gate subtracts
//! points instead, so marginal candidates stay visible for downstream
//! filtering.

use crate::config::ScorerConfig;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use services_common::{
    parse_occ_symbol, OptionQuoteSnapshot, OptionType, CONTRACT_MULTIPLIER,
};
use tracing::debug;

/// Directional intent implied by aggressor side and contract type
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TradeIntent {
    /// Call bought at or above the midpoint
    BullishBuy,
    /// Put bought at or above the midpoint
    BearishBuy,
    /// Put sold below the midpoint
    BullishSell,
    /// Call sold below the midpoint
    BearishSell,
    /// No directional read
    Neutral,
}

/// Qualitative flags attached to a candidate
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum CandidateFlag {
    /// Expires the same trading day
    ZeroDte,
    /// Expires within the near-term window
    NearTerm,
    /// Day volume more than five times open interest
    HighVolOi,
    /// Spread wider than ten percent of midpoint
    WideSpread,
}

/// The observed trade print being scored
#[derive(Clone, Copy, Debug)]
pub struct TradeFill {
    /// Trade price
    pub price: f64,
    /// Trade size in contracts
    pub size: f64,
}

/// Prevailing quote at the time of the trade
#[derive(Clone, Copy, Debug)]
pub struct QuoteState {
    /// Best bid
    pub bid: f64,
    /// Best ask
    pub ask: f64,
    /// Implied volatility, if supplied
    pub implied_volatility: Option<f64>,
    /// Delta, if supplied
    pub delta: Option<f64>,
}

/// Contract reference data for the scored trade
#[derive(Clone, Debug)]
pub struct ContractDetails {
    /// OCC-style contract symbol (carries the call/put flag)
    pub contract_symbol: String,
    /// Strike price
    pub strike: f64,
    /// Expiration trading date (UTC)
    pub expiration: NaiveDate,
    /// Open interest in contracts
    pub open_interest: u64,
    /// Session volume in contracts
    pub day_volume: u64,
}

/// Scored, classified unusual-trade candidate
///
/// Created per scan pass and never mutated; a later scan supersedes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnusualTradeCandidate {
    /// Underlying ticker
    pub underlying: String,
    /// Contract symbol
    pub contract_symbol: String,
    /// Call or put
    pub option_type: OptionType,
    /// Strike price
    pub strike: f64,
    /// Expiration date
    pub expiration: NaiveDate,
    /// Days to expiry at capture time (UTC date difference)
    pub dte: i64,
    /// USD notional of the trade
    pub premium_usd: f64,
    /// Trade size in contracts
    pub size: f64,
    /// Day volume over open interest (0 when OI is unknown)
    pub vol_oi_ratio: f64,
    /// Bid-ask spread as a fraction of midpoint
    pub spread_fraction: f64,
    /// Directional intent classification
    pub intent: TradeIntent,
    /// Qualitative flags
    pub flags: Vec<CandidateFlag>,
    /// Composite score in [0, 100]
    pub score: f64,
    /// Underlying last price at capture time
    pub underlying_price: f64,
    /// Capture timestamp
    pub captured_at: DateTime<Utc>,
}

/// Days to expiry with both endpoints truncated to their UTC date
///
/// Truncating first keeps the result stable across the trading day; an
/// option expiring "today" is 0 DTE at 09:31 and at 15:59 alike.
#[must_use]
pub fn days_to_expiry(expiration: NaiveDate, now: DateTime<Utc>) -> i64 {
    (expiration - now.date_naive()).num_days()
}

/// Score one trade observation into a candidate, or reject it
///
/// Returns `None` only for invalid quotes (crossed, negative, or no
/// market) and for spreads beyond the hard rejection bound; spreads at
/// exactly the bound pass.
pub fn score_candidate(
    trade: &TradeFill,
    quote: &QuoteState,
    details: &ContractDetails,
    underlying_price: f64,
    now: DateTime<Utc>,
    cfg: &ScorerConfig,
) -> Option<UnusualTradeCandidate> {
    if quote.ask < quote.bid || quote.bid < 0.0 {
        return None;
    }
    let midpoint = (quote.bid + quote.ask) / 2.0;
    if midpoint <= 0.0 {
        return None;
    }
    let spread = (quote.ask - quote.bid) / midpoint;
    if spread > cfg.max_spread_fraction {
        return None;
    }

    let occ = match parse_occ_symbol(&details.contract_symbol) {
        Ok(occ) => occ,
        Err(e) => {
            debug!(symbol = %details.contract_symbol, error = %e, "skipping unparseable contract");
            return None;
        }
    };

    let premium = trade.price * trade.size * CONTRACT_MULTIPLIER;
    let dte = days_to_expiry(details.expiration, now);
    let vol_oi_ratio = if details.open_interest > 0 {
        details.day_volume as f64 / details.open_interest as f64
    } else {
        0.0
    };

    let is_buy = trade.price >= midpoint;
    let intent = match (is_buy, occ.option_type) {
        (true, OptionType::Call) => TradeIntent::BullishBuy,
        (true, OptionType::Put) => TradeIntent::BearishBuy,
        (false, OptionType::Call) => TradeIntent::BearishSell,
        (false, OptionType::Put) => TradeIntent::BullishSell,
    };

    // Soft liquidity gates: each violation costs points, none rejects
    let mut penalties = 0.0;
    if trade.size < cfg.min_trade_size {
        penalties += cfg.gate_penalty;
    }
    if premium < cfg.min_premium_usd {
        penalties += cfg.gate_penalty;
    }
    if trade.price < cfg.min_price {
        penalties += cfg.gate_penalty;
    }

    let mut score = 50.0 - penalties;

    // Premium tiers
    if premium >= 50_000.0 {
        score += 5.0;
    }
    if premium >= 100_000.0 {
        score += 10.0;
    }
    if premium >= 500_000.0 {
        score += 10.0;
    }

    // Spread quality
    if spread < 0.01 {
        score += 10.0;
    } else if spread < 0.05 {
        score += 5.0;
    }

    // Fresh-positioning tiers
    if vol_oi_ratio > 1.5 {
        score += 5.0;
    }
    if vol_oi_ratio > 3.0 {
        score += 10.0;
    }
    if vol_oi_ratio > 5.0 {
        score += 5.0;
    }

    // At-ask conviction
    if quote.ask - trade.price <= cfg.at_ask_tolerance {
        score += cfg.at_ask_boost;
    }

    // Near-term expiry boost; 0DTE is flagged but not boosted
    if dte > 0 && dte <= cfg.near_term_days {
        score += 5.0;
    }

    let mut flags = Vec::new();
    if dte == 0 {
        flags.push(CandidateFlag::ZeroDte);
    }
    if (0..=cfg.near_term_days).contains(&dte) {
        flags.push(CandidateFlag::NearTerm);
    }
    if vol_oi_ratio > 5.0 {
        flags.push(CandidateFlag::HighVolOi);
    }
    if spread > 0.10 {
        flags.push(CandidateFlag::WideSpread);
    }

    Some(UnusualTradeCandidate {
        underlying: occ.underlying,
        contract_symbol: details.contract_symbol.clone(),
        option_type: occ.option_type,
        strike: details.strike,
        expiration: details.expiration,
        dte,
        premium_usd: premium,
        size: trade.size,
        vol_oi_ratio,
        spread_fraction: spread,
        intent,
        flags,
        score: score.clamp(0.0, 100.0),
        underlying_price,
        captured_at: now,
    })
}

/// Score every snapshot in a chain with a usable last trade
///
/// Returns candidates ranked by descending score, ties broken by premium.
/// Stale quotes and contracts with no prints are skipped silently.
pub fn scan_chain(
    contracts: &[OptionQuoteSnapshot],
    now: DateTime<Utc>,
    cfg: &ScorerConfig,
) -> Vec<UnusualTradeCandidate> {
    let mut candidates: Vec<UnusualTradeCandidate> = contracts
        .iter()
        .filter(|c| !c.is_stale() && c.last_trade_price > 0.0 && c.last_trade_size > 0.0)
        .filter_map(|c| {
            let trade = TradeFill {
                price: c.last_trade_price,
                size: c.last_trade_size,
            };
            let quote = QuoteState {
                bid: c.bid,
                ask: c.ask,
                implied_volatility: c.implied_volatility,
                delta: c.delta,
            };
            let details = ContractDetails {
                contract_symbol: c.contract_symbol.clone(),
                strike: c.strike,
                expiration: c.expiration_date,
                open_interest: c.open_interest,
                day_volume: c.day_volume,
            };
            score_candidate(&trade, &quote, &details, c.underlying_price, now, cfg)
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(b.premium_usd.total_cmp(&a.premium_usd))
    });
    candidates
}
