//! Per-material linear trend models.
//!
//! The estimator relies on two primitive operations:
//! - fit `(slope, intercept)` for one material against elapsed days
//! - predict every material's price for a target date
//!
//! A `ModelSet` is derived once from a `Series` and is immutable afterwards;
//! prediction is a pure function of `(ModelSet, date)`.

use chrono::NaiveDate;

use crate::domain::{Material, MaterialPrices, Prediction, Series, round2};
use crate::error::EstimateError;
use crate::math::{LineFit, fit_line};

/// Goodness-of-fit diagnostics for one trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitQuality {
    pub n: usize,
    pub sse: f64,
    pub rmse: f64,
    /// Coefficient of determination; `1.0` when the data has no variance.
    pub r_squared: f64,
}

/// A fitted linear trend `price = slope * elapsed_days + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendModel {
    pub slope: f64,
    pub intercept: f64,
    pub quality: FitQuality,
}

impl TrendModel {
    /// Fit by OLS over `(elapsed_days, price)` pairs.
    pub fn fit(pairs: &[(f64, f64)]) -> Result<Self, EstimateError> {
        let line = fit_line(pairs)?;
        Ok(Self {
            slope: line.slope,
            intercept: line.intercept,
            quality: quality(pairs, line),
        })
    }

    /// Unrounded trend value at `elapsed_days`.
    pub fn value_at(&self, elapsed_days: f64) -> f64 {
        self.slope * elapsed_days + self.intercept
    }
}

fn quality(pairs: &[(f64, f64)], line: LineFit) -> FitQuality {
    let n = pairs.len();
    let mean = pairs.iter().map(|&(_, y)| y).sum::<f64>() / n as f64;

    let sse: f64 = pairs.iter().map(|&(x, y)| (y - line.eval(x)).powi(2)).sum();
    let sst: f64 = pairs.iter().map(|&(_, y)| (y - mean).powi(2)).sum();

    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 1.0 };

    FitQuality {
        n,
        sse,
        rmse: (sse / n as f64).sqrt(),
        r_squared,
    }
}

/// One trend per material, all sharing the series epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSet {
    epoch: NaiveDate,
    last_date: NaiveDate,
    cement: TrendModel,
    steel: TrendModel,
    brick: TrendModel,
    sand: TrendModel,
}

impl ModelSet {
    /// Fit every material independently against elapsed days.
    pub fn fit(series: &Series) -> Result<Self, EstimateError> {
        let fit = |m: Material| -> Result<TrendModel, EstimateError> {
            let model = TrendModel::fit(&series.regression_pairs(m))?;
            tracing::debug!(
                material = m.display_name(),
                slope = model.slope,
                intercept = model.intercept,
                r_squared = model.quality.r_squared,
                "fitted trend"
            );
            Ok(model)
        };

        Ok(Self {
            epoch: series.start(),
            last_date: series.end(),
            cement: fit(Material::Cement)?,
            steel: fit(Material::Steel)?,
            brick: fit(Material::Brick)?,
            sand: fit(Material::Sand)?,
        })
    }

    /// First date of the series the models were fit on.
    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    /// Last historical date of that series.
    pub fn last_date(&self) -> NaiveDate {
        self.last_date
    }

    pub fn get(&self, material: Material) -> &TrendModel {
        match material {
            Material::Cement => &self.cement,
            Material::Steel => &self.steel,
            Material::Brick => &self.brick,
            Material::Sand => &self.sand,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Material, &TrendModel)> + '_ {
        Material::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    /// Predict every material's price on `date`.
    ///
    /// Only dates strictly after the epoch are accepted. Dates inside the
    /// historical window pass this check and are marked `within_history`.
    /// Extrapolation is unbounded.
    pub fn predict(&self, date: NaiveDate) -> Result<Prediction, EstimateError> {
        let elapsed_days = (date - self.epoch).num_days();
        if elapsed_days <= 0 {
            return Err(EstimateError::NonFutureDate {
                date,
                epoch: self.epoch,
            });
        }

        let x = elapsed_days as f64;
        let prices = MaterialPrices::from_fn(|m| round2(self.get(m).value_at(x)));

        Ok(Prediction {
            date,
            elapsed_days,
            within_history: date <= self.last_date,
            prices,
        })
    }
}
