//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the material set and per-material price records (`Material`, `MaterialPrices`)
//! - the validated daily history (`Series`)
//! - prediction outputs (`Prediction`) and target-date parsing

pub mod series;
pub mod types;

pub use series::*;
pub use types::*;
