//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and prediction
//! - exported to CSV/JSON
//! - reloaded later for charting or comparisons

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::EstimateError;

/// A construction material with a tracked unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Cement,
    Steel,
    Brick,
    Sand,
}

impl Material {
    /// All materials in column order.
    pub const ALL: [Material; 4] = [Material::Cement, Material::Steel, Material::Brick, Material::Sand];

    /// Column name used in the tabular export and the prediction response.
    pub fn column_name(self) -> &'static str {
        match self {
            Material::Cement => "Cement_Price",
            Material::Steel => "Steel_Price",
            Material::Brick => "Brick_Price",
            Material::Sand => "Sand_Price",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Material::Cement => "Cement",
            Material::Steel => "Steel",
            Material::Brick => "Brick",
            Material::Sand => "Sand",
        }
    }

    fn index(self) -> usize {
        match self {
            Material::Cement => 0,
            Material::Steel => 1,
            Material::Brick => 2,
            Material::Sand => 3,
        }
    }

    pub fn next(self) -> Self {
        Material::ALL[(self.index() + 1) % Material::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Material::ALL[(self.index() + Material::ALL.len() - 1) % Material::ALL.len()]
    }
}

/// One value per material.
///
/// Serialized with the tabular column names so a `{date, ...prices}` response
/// reads the same as a CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialPrices {
    #[serde(rename = "Cement_Price")]
    pub cement: f64,
    #[serde(rename = "Steel_Price")]
    pub steel: f64,
    #[serde(rename = "Brick_Price")]
    pub brick: f64,
    #[serde(rename = "Sand_Price")]
    pub sand: f64,
}

impl MaterialPrices {
    /// Build from a per-material function.
    pub fn from_fn(mut f: impl FnMut(Material) -> f64) -> Self {
        Self {
            cement: f(Material::Cement),
            steel: f(Material::Steel),
            brick: f(Material::Brick),
            sand: f(Material::Sand),
        }
    }

    pub fn get(&self, material: Material) -> f64 {
        match material {
            Material::Cement => self.cement,
            Material::Steel => self.steel,
            Material::Brick => self.brick,
            Material::Sand => self.sand,
        }
    }

    /// Iterate `(material, value)` in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Material, f64)> + '_ {
        Material::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

/// One row of the daily price history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub prices: MaterialPrices,
}

/// Result of a successful prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Target date echoed back.
    pub date: NaiveDate,
    /// Whole days from the series start to `date` (always > 0).
    #[serde(skip)]
    pub elapsed_days: i64,
    /// `true` when `date` is not after the last historical date.
    #[serde(skip)]
    pub within_history: bool,
    #[serde(flatten)]
    pub prices: MaterialPrices,
}

/// Round to two fractional digits (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a user-supplied target date.
///
/// Date-time inputs are accepted and their time of day is dropped.
pub fn parse_target_date(input: &str) -> Result<NaiveDate, EstimateError> {
    let trimmed = input.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt.date());
        }
    }

    Err(EstimateError::UnparseableDate {
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_and_datetime_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(parse_target_date("2024-03-09").unwrap(), expected);
        assert_eq!(parse_target_date(" 2024/03/09 ").unwrap(), expected);
        assert_eq!(parse_target_date("2024-03-09T23:59:59").unwrap(), expected);
        assert_eq!(parse_target_date("2024-03-09 00:00:01").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage_dates() {
        for bad in ["", "tomorrow", "2024-13-01", "2024-02-30", "09-03-2024"] {
            match parse_target_date(bad) {
                Err(EstimateError::UnparseableDate { input }) => assert_eq!(input, bad),
                other => panic!("expected UnparseableDate for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(315.107_55), 315.11);
        assert_eq!(round2(-1.234), -1.23);
        assert_eq!(round2(6.5), 6.5);
    }

    #[test]
    fn material_cycle_wraps() {
        assert_eq!(Material::Sand.next(), Material::Cement);
        assert_eq!(Material::Cement.prev(), Material::Sand);
        for m in Material::ALL {
            assert_eq!(m.next().prev(), m);
        }
    }

    #[test]
    fn prediction_serializes_with_column_names() {
        let p = Prediction {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            elapsed_days: 10,
            within_history: false,
            prices: MaterialPrices {
                cement: 1.0,
                steel: 2.0,
                brick: 3.0,
                sand: 4.0,
            },
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["date"], "2025-01-01");
        assert_eq!(json["Cement_Price"], 1.0);
        assert_eq!(json["Sand_Price"], 4.0);
        assert!(json.get("elapsed_days").is_none());
    }
}
