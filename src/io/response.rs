//! JSON rendering of prediction responses.
//!
//! A request either yields `{date, Cement_Price, Steel_Price, Brick_Price,
//! Sand_Price}` or `{error}`; scripts consuming `mtrend predict --json` only
//! need to check for the `error` key.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::Prediction;
use crate::error::{AppError, EstimateError};

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Response<'a> {
    Ok(&'a Prediction),
    Err { error: String },
}

impl<'a> From<&'a Result<Prediction, EstimateError>> for Response<'a> {
    fn from(result: &'a Result<Prediction, EstimateError>) -> Self {
        match result {
            Ok(p) => Response::Ok(p),
            Err(e) => Response::Err { error: e.to_string() },
        }
    }
}

/// Render a prediction outcome as pretty JSON.
pub fn render_response_json(result: &Result<Prediction, EstimateError>) -> Result<String, AppError> {
    serde_json::to_string_pretty(&Response::from(result))
        .map_err(|e| AppError::new(4, format!("Failed to serialize prediction: {e}")))
}

/// Write a prediction outcome to a JSON file.
pub fn write_response_json(path: &Path, result: &Result<Prediction, EstimateError>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create prediction JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &Response::from(result))
        .map_err(|e| AppError::new(2, format!("Failed to write prediction JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::MaterialPrices;

    #[test]
    fn success_response_is_flat() {
        let result = Ok(Prediction {
            date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            elapsed_days: 2312,
            within_history: false,
            prices: MaterialPrices {
                cement: 531.25,
                steel: 67_345.1,
                brick: 9.97,
                sand: 1262.5,
            },
        });
        let json: serde_json::Value = serde_json::from_str(&render_response_json(&result).unwrap()).unwrap();
        assert_eq!(json["date"], "2025-05-01");
        assert_eq!(json["Brick_Price"], 9.97);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_response_carries_message() {
        let result = Err(EstimateError::UnparseableDate {
            input: "soon".to_string(),
        });
        let json: serde_json::Value = serde_json::from_str(&render_response_json(&result).unwrap()).unwrap();
        assert!(json["error"].as_str().unwrap().contains("soon"));
    }

    #[test]
    fn writes_response_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prediction.json");
        let result = Err(EstimateError::InsufficientData);
        write_response_json(&path, &result).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("insufficient data"));
    }
}
