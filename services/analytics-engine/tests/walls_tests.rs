use analytics_engine::walls::compute_walls;
use approx::assert_relative_eq;
use chrono::NaiveDate;
use services_common::{OptionQuoteSnapshot, OptionType};

fn contract(
    option_type: OptionType,
    strike: f64,
    gamma: Option<f64>,
    open_interest: u64,
) -> OptionQuoteSnapshot {
    OptionQuoteSnapshot {
        contract_symbol: format!(
            "SPY240628{}{:08}",
            if option_type == OptionType::Call { "C" } else { "P" },
            (strike * 1000.0) as u64
        ),
        underlying_symbol: "SPY".to_string(),
        strike,
        option_type,
        expiration_date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
        bid: 1.0,
        ask: 1.1,
        last_trade_price: 1.05,
        last_trade_size: 1.0,
        day_volume: 100,
        open_interest,
        delta: None,
        gamma,
        theta: None,
        vega: None,
        implied_volatility: None,
        underlying_price: 95.0,
    }
}

#[test]
fn single_call_and_put_chain_selects_both_walls() {
    let chain = vec![
        contract(OptionType::Call, 100.0, Some(0.05), 1_000),
        contract(OptionType::Put, 90.0, Some(0.04), 1_000),
    ];

    let walls = compute_walls(&chain, 95.0);
    assert_eq!(walls.call_wall, Some(100.0));
    assert_eq!(walls.put_wall, Some(90.0));
    assert_relative_eq!(
        walls.dist_to_call_wall_pct.unwrap(),
        (100.0 - 95.0) / 95.0 * 100.0
    );
    assert_relative_eq!(
        walls.dist_to_put_wall_pct.unwrap(),
        (90.0 - 95.0) / 95.0 * 100.0
    );
    assert_eq!(walls.max_pain, None);
}

#[test]
fn empty_chain_yields_no_walls() {
    let walls = compute_walls(&[], 95.0);
    assert_eq!(walls.call_wall, None);
    assert_eq!(walls.put_wall, None);
    assert_eq!(walls.dist_to_call_wall_pct, None);
    assert_eq!(walls.dist_to_put_wall_pct, None);
}

#[test]
fn put_only_chain_has_no_call_wall() {
    let chain = vec![
        contract(OptionType::Put, 90.0, Some(0.04), 1_000),
        contract(OptionType::Put, 85.0, Some(0.02), 500),
    ];

    let walls = compute_walls(&chain, 95.0);
    assert_eq!(walls.call_wall, None);
    assert_eq!(walls.put_wall, Some(90.0));
}

#[test]
fn exposure_aggregates_per_strike_before_selection() {
    // Calls at 100 split across two snapshots outweigh the single larger
    // call at 105 only when summed
    let chain = vec![
        contract(OptionType::Call, 100.0, Some(0.03), 1_000),
        contract(OptionType::Call, 100.0, Some(0.03), 1_000),
        contract(OptionType::Call, 105.0, Some(0.05), 1_000),
    ];

    let walls = compute_walls(&chain, 95.0);
    assert_eq!(walls.call_wall, Some(100.0));
}

#[test]
fn put_exposure_dominating_a_strike_makes_it_the_put_wall() {
    // Net exposure at 100 is negative once the put side is counted
    let chain = vec![
        contract(OptionType::Call, 100.0, Some(0.02), 1_000),
        contract(OptionType::Put, 100.0, Some(0.05), 1_000),
        contract(OptionType::Call, 105.0, Some(0.01), 1_000),
    ];

    let walls = compute_walls(&chain, 95.0);
    assert_eq!(walls.put_wall, Some(100.0));
    assert_eq!(walls.call_wall, Some(105.0));
}

#[test]
fn missing_gamma_contributes_nothing() {
    let chain = vec![
        contract(OptionType::Call, 100.0, None, 1_000_000),
        contract(OptionType::Call, 105.0, Some(0.001), 10),
    ];

    let walls = compute_walls(&chain, 95.0);
    assert_eq!(walls.call_wall, Some(105.0));
}

#[test]
fn stale_quotes_are_skipped() {
    let mut crossed = contract(OptionType::Call, 100.0, Some(0.5), 1_000_000);
    crossed.bid = 2.0;
    crossed.ask = 1.0;
    let chain = vec![crossed, contract(OptionType::Call, 105.0, Some(0.001), 10)];

    let walls = compute_walls(&chain, 95.0);
    assert_eq!(walls.call_wall, Some(105.0));
}
