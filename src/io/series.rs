//! CSV read/write for the daily price series.
//!
//! Format (one row per day):
//!
//! ```text
//! Date,Cement_Price,Steel_Price,Brick_Price,Sand_Price,Days_Since_Start
//! 2019-01-01,300.00,50000.00,6.50,800.00,0
//! ```
//!
//! Writes go to a sibling temporary file that is renamed into place, so a
//! failed export never leaves a truncated file at the target path.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Material, MaterialPrices, PricePoint, Series};
use crate::error::{AppError, EstimateError};

const DATE_COLUMN: &str = "Date";
const DAYS_COLUMN: &str = "Days_Since_Start";

/// Header row of the exported file.
pub fn series_header() -> [&'static str; 6] {
    [
        DATE_COLUMN,
        Material::Cement.column_name(),
        Material::Steel.column_name(),
        Material::Brick.column_name(),
        Material::Sand.column_name(),
        DAYS_COLUMN,
    ]
}

/// Write the series to `path`, replacing any existing file.
pub fn write_series_csv(path: &Path, series: &Series) -> Result<(), AppError> {
    let tmp = temp_path(path);

    if let Err(err) = write_rows(&tmp, series) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AppError::new(2, format!("Failed to move export into place at '{}': {e}", path.display()))
    })?;

    tracing::info!(path = %path.display(), rows = series.len(), "wrote price series");
    Ok(())
}

fn write_rows(path: &Path, series: &Series) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(series_header())
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (idx, p) in series.points().iter().enumerate() {
        let mut row = Vec::with_capacity(6);
        row.push(p.date.format("%Y-%m-%d").to_string());
        for (_, v) in p.prices.iter() {
            row.push(format!("{v:.2}"));
        }
        row.push(idx.to_string());
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "series.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read a series previously written by [`write_series_csv`].
pub fn read_series_csv(path: &Path) -> Result<Series, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open series CSV '{}': {e}", path.display())))?;
    let series = parse_series(file).map_err(|e| {
        AppError::new(e.exit_code(), format!("{} ('{}')", e, path.display()))
    })?;
    tracing::info!(path = %path.display(), rows = series.len(), start = %series.start(), "loaded price series");
    Ok(series)
}

/// Parse series CSV from any reader.
pub fn parse_series<R: std::io::Read>(reader: R) -> Result<Series, EstimateError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| EstimateError::InvalidSeries(format!("failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = required_column(&header_map, DATE_COLUMN)?;
    let mut price_idx = [0usize; 4];
    for (slot, m) in price_idx.iter_mut().zip(Material::ALL) {
        *slot = required_column(&header_map, m.column_name())?;
    }
    let days_idx = header_map.get(DAYS_COLUMN).copied();

    let mut points = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and records are 0-based.
        let line = idx + 2;
        let record = result.map_err(|e| EstimateError::InvalidSeries(format!("line {line}: CSV parse error: {e}")))?;

        let date = parse_date(field(&record, date_idx))
            .map_err(|e| EstimateError::InvalidSeries(format!("line {line}: {e}")))?;

        let mut values = [0.0; 4];
        for ((slot, m), col) in values.iter_mut().zip(Material::ALL).zip(price_idx) {
            *slot = parse_price(field(&record, col))
                .map_err(|e| EstimateError::InvalidSeries(format!("line {line}: {}: {e}", m.column_name())))?;
        }

        if let Some(col) = days_idx {
            let raw = field(&record, col);
            let days: usize = raw.parse().map_err(|_| {
                EstimateError::InvalidSeries(format!("line {line}: {DAYS_COLUMN} '{raw}' is not a whole number"))
            })?;
            if days != idx {
                return Err(EstimateError::InvalidSeries(format!(
                    "line {line}: {DAYS_COLUMN} is {days}, expected {idx}"
                )));
            }
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

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().trim_start_matches('\u{feff}').to_string(), idx))
        .collect()
}

fn required_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, EstimateError> {
    header_map
        .get(name)
        .copied()
        .ok_or_else(|| EstimateError::InvalidSeries(format!("missing required column '{name}'")))
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

fn parse_price(s: &str) -> Result<f64, String> {
    let v = s.parse::<f64>().map_err(|e| format!("invalid price '{s}': {e}"))?;
    // Prices are stored in whole cents.
    if v.is_finite() && ((v * 100.0).round() - v * 100.0).abs() > 1e-6 {
        return Err(format!("price '{s}' has more than two decimal places"));
    }
    Ok(v)
}
