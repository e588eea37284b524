//! Synthetic daily price history generation.
//!
//! Each material follows a straight baseline from `base_low` on day 0 to
//! `base_high` on the last day, with independent Gaussian noise added per day.
//! Values are rounded to cents.

use chrono::Duration;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::config::GeneratorConfig;
use crate::domain::{Material, MaterialPrices, PricePoint, Series, round2};
use crate::error::EstimateError;

/// A generated series together with the seed that produced it.
#[derive(Debug, Clone)]
pub struct GeneratedSeries {
    pub series: Series,
    pub seed: u64,
}

/// Generate a series, seeding from `config.seed` or from OS entropy.
///
/// The seed actually used is logged and returned so any run can be replayed
/// with `--seed`.
pub fn generate_series(config: &GeneratorConfig) -> Result<GeneratedSeries, EstimateError> {
    let seed = config.seed.unwrap_or_else(|| StdRng::from_entropy().next_u64());
    let mut rng = StdRng::seed_from_u64(seed);
    let series = generate_series_with_rng(config, &mut rng)?;

    tracing::info!(
        seed,
        days = series.len(),
        start = %series.start(),
        end = %series.end(),
        "generated synthetic price series"
    );

    Ok(GeneratedSeries { series, seed })
}

/// Generate a series drawing noise from the given random source.
pub fn generate_series_with_rng<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Series, EstimateError> {
    config.validate()?;

    let mut noise = Vec::with_capacity(Material::ALL.len());
    for m in Material::ALL {
        let sd = config.profiles.get(m).noise_sd;
        let normal = Normal::new(0.0, sd)
            .map_err(|e| EstimateError::InvalidSeries(format!("{} noise distribution: {e}", m.display_name())))?;
        noise.push(normal);
    }

    let mut points = Vec::new();
    for i in 0..config.days {
        let date = config
            .start
            .checked_add_signed(Duration::days(i as i64))
            .ok_or_else(|| EstimateError::InvalidSeries("series runs past the last representable date".to_string()))?;

        // Materials are sampled in column order so a seed always yields the same rows.
        let mut values = [0.0; 4];
        for (slot, (m, normal)) in values.iter_mut().zip(Material::ALL.iter().zip(&noise)) {
            let profile = config.profiles.get(*m);
            let base = linspace_at(profile.base_low, profile.base_high, config.days, i);
            *slot = non_negative(round2(base + normal.sample(rng)));
        }

        points.push(PricePoint {
            date,
            prices: MaterialPrices {
                cement: values[0],
                steel: values[1],
                brick: values[2],
                sand: values[3],
            },
        });
    }

    Series::new(points)
}

fn non_negative(v: f64) -> f64 {
    if v > 0.0 { v } else { 0.0 }
}

/// Value `i` of `n` evenly spaced samples from `low` to `high` inclusive.
fn linspace_at(low: f64, high: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        return low;
    }
    let u = i as f64 / (n - 1) as f64;
    low + u * (high - low)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::config::MaterialProfile;

    fn is_cents(v: f64) -> bool {
        ((v * 100.0).round() - v * 100.0).abs() < 1e-6
    }

    #[test]
    fn default_series_has_expected_shape() {
        let config = GeneratorConfig {
            seed: Some(42),
            ..GeneratorConfig::default()
        };
        let generated = generate_series(&config).unwrap();
        let series = generated.series;

        assert_eq!(generated.seed, 42);
        assert_eq!(series.len(), 2000);
        assert_eq!(series.start(), NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
        for (idx, p) in series.points().iter().enumerate() {
            assert_eq!(series.elapsed_days(p.date), idx as i64);
            for (_, v) in p.prices.iter() {
                assert!(is_cents(v), "{v} is not rounded to cents");
                assert!(v >= 0.0);
            }
        }
    }

    #[test]
    fn noiseless_series_follows_linspace() {
        let config = GeneratorConfig::default().noiseless();
        let series = generate_series_with_rng(&config, &mut StdRng::seed_from_u64(1)).unwrap();

        let first = series.points()[0].prices;
        let last = series.points()[1999].prices;
        assert_eq!(first.cement, 300.0);
        assert_eq!(last.cement, 500.0);
        assert_eq!(first.steel, 50_000.0);
        assert_eq!(last.steel, 65_000.0);
        assert_eq!(first.brick, 6.5);
        assert_eq!(last.brick, 9.5);
        // Day 1 cement: 300 + 200/1999 = 300.1000...
        assert_eq!(series.points()[1].prices.cement, 300.1);
    }

    #[test]
    fn same_seed_same_series_different_seed_differs() {
        let config = GeneratorConfig {
            days: 50,
            ..GeneratorConfig::default()
        };
        let a = generate_series_with_rng(&config, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate_series_with_rng(&config, &mut StdRng::seed_from_u64(7)).unwrap();
        let c = generate_series_with_rng(&config, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn single_day_series_uses_low_baseline() {
        let mut config = GeneratorConfig::default().noiseless();
        config.days = 1;
        let series = generate_series_with_rng(&config, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].prices.sand, 800.0);
    }

    #[test]
    fn prices_are_floored_at_zero() {
        let mut config = GeneratorConfig::default();
        config.days = 200;
        config.profiles.brick = MaterialProfile::new(0.0, 0.0, 5.0);
        let series = generate_series_with_rng(&config, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(series.points().iter().all(|p| p.prices.brick >= 0.0));
    }

    #[test]
    fn zero_days_is_rejected() {
        let mut config = GeneratorConfig::default();
        config.days = 0;
        let err = generate_series_with_rng(&config, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, EstimateError::InvalidSeries(_)));
    }

    #[test]
    fn oversized_day_count_is_rejected() {
        let config = GeneratorConfig {
            seed: Some(1),
            days: 1usize << 40,
            ..GeneratorConfig::default()
        };
        let err = generate_series(&config).unwrap_err();
        assert!(matches!(err, EstimateError::InvalidSeries(_)), "{err}");
    }
}
