//! The daily price history.

use chrono::{Duration, NaiveDate};

use crate::domain::{Material, PricePoint};
use crate::error::EstimateError;

/// An ordered, gap-free daily price history.
///
/// Construction validates that dates are strictly increasing by exactly one
/// day, so the elapsed-days value of a point always equals its index.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    points: Vec<PricePoint>,
}

impl Series {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, EstimateError> {
        if points.is_empty() {
            return Err(EstimateError::InvalidSeries("series has no rows".to_string()));
        }

        for (idx, w) in points.windows(2).enumerate() {
            let step = (w[1].date - w[0].date).num_days();
            if step != 1 {
                let what = if step <= 0 { "out of order or duplicated" } else { "not contiguous" };
                return Err(EstimateError::InvalidSeries(format!(
                    "dates {} and {} (rows {} and {}) are {what}",
                    w[0].date,
                    w[1].date,
                    idx,
                    idx + 1
                )));
            }
        }

        for p in &points {
            for (material, value) in p.prices.iter() {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(EstimateError::InvalidSeries(format!(
                        "{} on {} must be a finite, nonnegative price (got {value})",
                        material.column_name(),
                        p.date
                    )));
                }
            }
        }

        Ok(Self { points })
    }

    /// First date of the series (elapsed day 0).
    pub fn start(&self) -> NaiveDate {
        self.points[0].date
    }

    /// Last historical date.
    pub fn end(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; an empty series cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Whole days from the series start to `date` (negative before the start).
    pub fn elapsed_days(&self, date: NaiveDate) -> i64 {
        (date - self.start()).num_days()
    }

    /// Date at a given elapsed-day offset.
    pub fn date_at(&self, elapsed_days: i64) -> Option<NaiveDate> {
        self.start().checked_add_signed(Duration::days(elapsed_days))
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// `(date, price)` pairs for one material, in order.
    pub fn column(&self, material: Material) -> Vec<(NaiveDate, f64)> {
        self.points.iter().map(|p| (p.date, p.prices.get(material))).collect()
    }

    /// `(elapsed_days, price)` pairs for one material, ready for regression.
    pub fn regression_pairs(&self, material: Material) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(idx, p)| (idx as f64, p.prices.get(material)))
            .collect()
    }
}
