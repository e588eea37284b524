//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot-style tests)

use crate::domain::{Material, Prediction, Series};
use crate::models::ModelSet;

/// Format a prediction as a small table.
pub fn format_prediction(prediction: &Prediction) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Prediction for {} (day {} since series start)\n",
        prediction.date, prediction.elapsed_days
    ));
    for (m, price) in prediction.prices.iter() {
        out.push_str(&format!("  {:<8} {:>14.2}\n", m.display_name(), price));
    }
    if prediction.within_history {
        out.push_str("  note: date is inside the historical window; values are the fitted trend, not a forecast\n");
    }

    out
}

/// Format per-material trend coefficients and diagnostics.
pub fn format_models(models: &ModelSet) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Trend models (epoch {}, history through {})\n",
        models.epoch(),
        models.last_date()
    ));
    out.push_str(&format!(
        "  {:<8} {:>12} {:>14} {:>12} {:>8} {:>6}\n",
        "material", "slope/day", "intercept", "rmse", "r2", "n"
    ));
    for (m, model) in models.iter() {
        out.push_str(&format!(
            "  {:<8} {:>12.6} {:>14.4} {:>12.4} {:>8.4} {:>6}\n",
            m.display_name(),
            model.slope,
            model.intercept,
            model.quality.rmse,
            model.quality.r_squared,
            model.quality.n
        ));
    }

    out
}

/// Summarize the series window and per-material ranges.
pub fn format_series_summary(series: &Series, seed: Option<u64>) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Series: {} days | {} .. {}",
        series.len(),
        series.start(),
        series.end()
    ));
    if let Some(seed) = seed {
        out.push_str(&format!(" | seed={seed}"));
    }
    out.push('\n');

    let first = series.points()[0].prices;
    let last = series.points()[series.len() - 1].prices;
    for m in Material::ALL {
        let (lo, hi) = series
            .points()
            .iter()
            .map(|p| p.prices.get(m))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        out.push_str(&format!(
            "  {:<8} first={:.2} last={:.2} min={:.2} max={:.2}\n",
            m.display_name(),
            first.get(m),
            last.get(m),
            lo,
            hi
        ));
    }

    out
}

/// Format the first `n` rows in the export column layout.
pub fn format_head(series: &Series, n: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", crate::io::series_header().join(",")));
    for (idx, p) in series.points().iter().take(n).enumerate() {
        let prices: Vec<String> = p.prices.iter().map(|(_, v)| format!("{v:.2}")).collect();
        out.push_str(&format!("{},{},{}\n", p.date, prices.join(","), idx));
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::GeneratorConfig;
    use crate::data::generate_series_with_rng;
    use crate::domain::MaterialPrices;

    fn series() -> Series {
        let config = GeneratorConfig {
            days: 10,
            ..GeneratorConfig::default()
        }
        .noiseless();
        generate_series_with_rng(&config, &mut StdRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn prediction_table_lists_all_materials() {
        let p = Prediction {
            date: NaiveDate::from_ymd_opt(2019, 1, 5).unwrap(),
            elapsed_days: 4,
            within_history: true,
            prices: MaterialPrices::from_fn(|_| 1.5),
        };
        let text = format_prediction(&p);
        for m in Material::ALL {
            assert!(text.contains(m.display_name()));
        }
        assert!(text.contains("day 4"));
        assert!(text.contains("note:"));
    }

    #[test]
    fn summary_and_head_reflect_series() {
        let s = series();
        let summary = format_series_summary(&s, Some(9));
        assert!(summary.contains("10 days"));
        assert!(summary.contains("seed=9"));
        assert!(summary.contains("first=300.00 last=500.00"));

        let head = format_head(&s, 2);
        let lines: Vec<&str> = head.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2019-01-01,300.00,50000.00,6.50,800.00,0");
    }

    #[test]
    fn model_table_has_one_row_per_material() {
        let models = ModelSet::fit(&series()).unwrap();
        let text = format_models(&models);
        assert_eq!(text.lines().count(), 2 + Material::ALL.len());
    }
}
