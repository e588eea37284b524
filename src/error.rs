use chrono::NaiveDate;
use thiserror::Error;

/// Process-boundary error: a message plus the exit code `mtrend` returns.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Typed failures of the series/estimator core.
///
/// None of these mutate state: a failed fit produces no models and a failed
/// prediction produces no prices.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// Fewer than two distinct elapsed-day values to regress on.
    #[error("insufficient data: need at least 2 distinct elapsed-day values to fit a trend")]
    InsufficientData,

    /// The target date is on or before the series start.
    #[error("please enter a future date: {date} is not after the series start {epoch}")]
    NonFutureDate { date: NaiveDate, epoch: NaiveDate },

    /// The input could not be read as a calendar date.
    #[error("could not parse '{input}' as a date (expected YYYY-MM-DD)")]
    UnparseableDate { input: String },

    /// A series violates its shape invariants (gaps, duplicates, bad values).
    #[error("invalid series: {0}")]
    InvalidSeries(String),
}

impl EstimateError {
    /// Exit code used when this error reaches `main`.
    pub fn exit_code(&self) -> u8 {
        match self {
            EstimateError::NonFutureDate { .. } | EstimateError::UnparseableDate { .. } => 2,
            EstimateError::InsufficientData | EstimateError::InvalidSeries(_) => 3,
        }
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_errors_map_to_exit_codes() {
        let epoch = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let non_future: AppError = EstimateError::NonFutureDate { date: epoch, epoch }.into();
        assert_eq!(non_future.exit_code(), 2);
        assert!(non_future.message().contains("2019-01-01"));

        let insufficient: AppError = EstimateError::InsufficientData.into();
        assert_eq!(insufficient.exit_code(), 3);
    }
}
