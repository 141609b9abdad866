use analytics_engine::config::RegimeConfig;
use analytics_engine::regime::{compute_regime, GammaHistory};
use analytics_engine::Regime;
use approx::assert_relative_eq;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rstest::*;
use services_common::{OptionQuoteSnapshot, OptionType};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_719_000_000 + secs, 0).unwrap()
}

/// One contract whose signed gamma exposure at spot=1.0 is exactly
/// `gamma * 100` USD
fn contract(option_type: OptionType, gamma: f64, delta: Option<f64>) -> OptionQuoteSnapshot {
    OptionQuoteSnapshot {
        contract_symbol: "SPY240628C00450000".to_string(),
        underlying_symbol: "SPY".to_string(),
        strike: 450.0,
        option_type,
        expiration_date: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
        bid: 1.0,
        ask: 1.1,
        last_trade_price: 1.05,
        last_trade_size: 1.0,
        day_volume: 100,
        open_interest: 1,
        delta,
        gamma: Some(gamma),
        theta: None,
        vega: None,
        implied_volatility: None,
        underlying_price: 1.0,
    }
}

/// Chain whose net gamma exposure at spot=1.0 equals `target` USD
fn chain_with_net_gamma(target: f64) -> Vec<OptionQuoteSnapshot> {
    vec![contract(OptionType::Call, target / 100.0, None)]
}

#[fixture]
fn config() -> RegimeConfig {
    RegimeConfig::default()
}

mod classification {
    use super::*;

    #[rstest]
    #[case(300_000_001.0, Regime::LongGamma)]
    #[case(300_000_000.0, Regime::Neutral)]
    #[case(0.0, Regime::Neutral)]
    #[case(-100_000_000.0, Regime::Neutral)]
    #[case(-100_000_001.0, Regime::ShortGamma)]
    fn thresholds_are_strict(
        config: RegimeConfig,
        #[case] net_gamma: f64,
        #[case] expected: Regime,
    ) {
        let mut history = GammaHistory::new(config.history_window_secs);
        let regime = compute_regime(&chain_with_net_gamma(net_gamma), 1.0, &mut history, at(0), &config);

        assert_eq!(regime.regime, expected);
        assert_relative_eq!(regime.net_gamma_usd, net_gamma, epsilon = 1e-3);
    }

    #[rstest]
    fn put_gamma_counts_negative(config: RegimeConfig) {
        let chain = vec![
            contract(OptionType::Call, 2_000_000.0, None),
            contract(OptionType::Put, 3_500_000.0, None),
        ];
        let mut history = GammaHistory::new(config.history_window_secs);
        let regime = compute_regime(&chain, 1.0, &mut history, at(0), &config);

        // 200M - 350M = -150M
        assert_relative_eq!(regime.net_gamma_usd, -150_000_000.0, epsilon = 1e-3);
        assert_eq!(regime.regime, Regime::ShortGamma);
    }

    #[rstest]
    fn delta_sign_is_preserved_per_contract(config: RegimeConfig) {
        let chain = vec![
            contract(OptionType::Call, 0.0, Some(0.6)),
            contract(OptionType::Put, 0.0, Some(-0.4)),
        ];
        let mut history = GammaHistory::new(config.history_window_secs);
        let regime = compute_regime(&chain, 1.0, &mut history, at(0), &config);

        // (0.6 - 0.4) * 1 * 100
        assert_relative_eq!(regime.net_delta, 20.0, epsilon = 1e-9);
    }

    #[rstest]
    fn empty_chain_is_neutral(config: RegimeConfig) {
        let mut history = GammaHistory::new(config.history_window_secs);
        let regime = compute_regime(&[], 1.0, &mut history, at(0), &config);

        assert_eq!(regime.regime, Regime::Neutral);
        assert_relative_eq!(regime.net_gamma_usd, 0.0);
        assert!(!regime.gamma_flip);
    }
}

mod flip_detection {
    use super::*;

    #[rstest]
    fn crossing_both_extremes_inside_window_flags_a_flip(config: RegimeConfig) {
        let mut history = GammaHistory::new(config.history_window_secs);

        let first = compute_regime(
            &chain_with_net_gamma(150_000_000.0),
            1.0,
            &mut history,
            at(0),
            &config,
        );
        assert!(!first.gamma_flip);

        let second = compute_regime(
            &chain_with_net_gamma(-150_000_000.0),
            1.0,
            &mut history,
            at(60),
            &config,
        );
        assert!(second.gamma_flip);
    }

    #[rstest]
    fn settling_back_to_neutral_clears_the_flip(config: RegimeConfig) {
        let mut history = GammaHistory::new(config.history_window_secs);

        compute_regime(&chain_with_net_gamma(150_000_000.0), 1.0, &mut history, at(0), &config);
        compute_regime(&chain_with_net_gamma(-150_000_000.0), 1.0, &mut history, at(60), &config);
        let third = compute_regime(
            &chain_with_net_gamma(-50_000.0),
            1.0,
            &mut history,
            at(120),
            &config,
        );

        // Current sample is at neither extreme
        assert!(!third.gamma_flip);
    }

    #[rstest]
    fn extremes_older_than_the_window_are_forgotten(config: RegimeConfig) {
        let mut history = GammaHistory::new(config.history_window_secs);

        compute_regime(&chain_with_net_gamma(150_000_000.0), 1.0, &mut history, at(0), &config);
        // Sixteen minutes later the positive extreme has aged out
        let later = compute_regime(
            &chain_with_net_gamma(-150_000_000.0),
            1.0,
            &mut history,
            at(16 * 60),
            &config,
        );

        assert!(!later.gamma_flip);
        assert_eq!(history.len(), 1);
    }

    #[rstest]
    fn oscillation_in_the_noise_band_never_flips(config: RegimeConfig) {
        let mut history = GammaHistory::new(config.history_window_secs);

        for (i, net) in [50_000_000.0, -50_000_000.0, 80_000_000.0, -90_000_000.0]
            .iter()
            .enumerate()
        {
            let regime = compute_regime(
                &chain_with_net_gamma(*net),
                1.0,
                &mut history,
                at(i as i64 * 60),
                &config,
            );
            assert!(!regime.gamma_flip);
        }
    }

    #[rstest]
    fn window_retains_samples_within_fifteen_minutes(config: RegimeConfig) {
        let mut history = GammaHistory::new(config.history_window_secs);

        compute_regime(&chain_with_net_gamma(1.0), 1.0, &mut history, at(0), &config);
        compute_regime(&chain_with_net_gamma(2.0), 1.0, &mut history, at(Duration::minutes(10).num_seconds()), &config);
        compute_regime(&chain_with_net_gamma(3.0), 1.0, &mut history, at(Duration::minutes(14).num_seconds()), &config);

        assert_eq!(history.len(), 3);
    }
}
