//! Property tests for generator and estimator invariants.
//!
//! Uses proptest to verify:
//! 1. Generated histories are contiguous, non-negative and in cents
//! 2. A fixed seed always reproduces the same history
//! 3. OLS recovers an exact linear trend
//! 4. Prediction is pure and rejects dates on or before the series start

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use material_trends::config::GeneratorConfig;
use material_trends::data::generate_series;
use material_trends::domain::{Material, parse_target_date};
use material_trends::error::EstimateError;
use material_trends::models::{ModelSet, TrendModel};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_config() -> impl Strategy<Value = GeneratorConfig> {
    (any::<u64>(), 2usize..250).prop_map(|(seed, days)| GeneratorConfig {
        seed: Some(seed),
        days,
        ..GeneratorConfig::default()
    })
}

fn is_cents(v: f64) -> bool {
    ((v * 100.0).round() - v * 100.0).abs() < 1e-6
}

// ── 1-2. Generator ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_rows_are_well_formed(config in arb_config()) {
        let series = generate_series(&config).unwrap().series;

        prop_assert_eq!(series.len(), config.days);
        prop_assert_eq!(series.start(), config.start);
        for (i, point) in series.points().iter().enumerate() {
            prop_assert_eq!(point.date, config.start + Duration::days(i as i64));
            for (_, price) in point.prices.iter() {
                prop_assert!(price >= 0.0);
                prop_assert!(is_cents(price), "{} is not in cents", price);
            }
        }
    }

    #[test]
    fn same_seed_same_history(config in arb_config()) {
        let a = generate_series(&config).unwrap();
        let b = generate_series(&config).unwrap();
        prop_assert_eq!(a.seed, b.seed);
        prop_assert_eq!(a.series, b.series);
    }
}

// ── 3. Linear recovery ───────────────────────────────────────────────

proptest! {
    #[test]
    fn ols_recovers_exact_line(
        slope in -50.0..50.0_f64,
        intercept in 1.0..10_000.0_f64,
        n in 2usize..300,
    ) {
        let pairs: Vec<(f64, f64)> = (0..n)
            .map(|i| (i as f64, slope * i as f64 + intercept))
            .collect();
        let model = TrendModel::fit(&pairs).unwrap();

        let scale = intercept.abs().max(1.0);
        prop_assert!((model.slope - slope).abs() < 1e-6 * scale, "slope {} vs {}", model.slope, slope);
        prop_assert!((model.intercept - intercept).abs() < 1e-6 * scale);
        prop_assert!(model.quality.rmse < 1e-6 * scale);
    }
}

// ── 4. Prediction ────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prediction_is_pure_and_after_epoch(config in arb_config(), offset in -400i64..4000) {
        let series = generate_series(&config).unwrap().series;
        let models = ModelSet::fit(&series).unwrap();
        let target = series.start() + Duration::days(offset);

        let first = models.predict(target);
        let second = models.predict(target);
        prop_assert_eq!(&first, &second);

        if offset <= 0 {
            prop_assert_eq!(
                first,
                Err(EstimateError::NonFutureDate { date: target, epoch: series.start() })
            );
        } else {
            let p = first.unwrap();
            prop_assert_eq!(p.elapsed_days, offset);
            prop_assert_eq!(p.within_history, offset < config.days as i64);
            for m in Material::ALL {
                prop_assert!(is_cents(p.prices.get(m)));
            }
        }
    }

    #[test]
    fn iso_dates_parse_back(days in 0i64..40_000) {
        let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + Duration::days(days);
        prop_assert_eq!(parse_target_date(&date.to_string()), Ok(date));
    }
}
