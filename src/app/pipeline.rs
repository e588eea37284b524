//! Shared "load + fit" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! series source -> Series -> ModelSet -> PriceContext
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::GeneratorConfig;
use crate::data::generate_series;
use crate::domain::{Prediction, Series};
use crate::error::{AppError, EstimateError};
use crate::models::ModelSet;

/// Where the price history comes from.
#[derive(Debug, Clone)]
pub enum SeriesSource {
    /// A CSV previously written by `mtrend generate`.
    Csv(PathBuf),
    /// Synthetic data generated in memory.
    Generated(GeneratorConfig),
}

/// The immutable series + fitted models every query runs against.
///
/// Built once at startup; all fields are plain data, so the context can be
/// shared across threads behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct PriceContext {
    series: Series,
    models: ModelSet,
    /// Seed used when the series was generated in memory.
    seed: Option<u64>,
}

impl PriceContext {
    /// Load (or generate) the series and fit the models.
    pub fn load(source: &SeriesSource) -> Result<Self, AppError> {
        let (series, seed) = match source {
            SeriesSource::Csv(path) => (crate::io::read_series_csv(path)?, None),
            SeriesSource::Generated(config) => {
                let generated = generate_series(config)?;
                (generated.series, Some(generated.seed))
            }
        };
        Ok(Self::from_series(series)?.with_seed(seed))
    }

    /// Fit models for an existing series.
    pub fn from_series(series: Series) -> Result<Self, EstimateError> {
        let models = ModelSet::fit(&series)?;
        tracing::info!(
            rows = series.len(),
            epoch = %models.epoch(),
            last = %models.last_date(),
            "fitted trend models"
        );
        Ok(Self {
            series,
            models,
            seed: None,
        })
    }

    fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Predict all material prices for `date`.
    pub fn predict(&self, date: NaiveDate) -> Result<Prediction, EstimateError> {
        let prediction = self.models.predict(date)?;
        if prediction.within_history {
            tracing::warn!(
                date = %date,
                last = %self.models.last_date(),
                "target date lies inside the historical window; reporting the fitted trend value"
            );
        }
        Ok(prediction)
    }

    /// Parse a raw date string and predict.
    pub fn predict_str(&self, input: &str) -> Result<Prediction, EstimateError> {
        let date = crate::domain::parse_target_date(input)?;
        self.predict(date)
    }
}
