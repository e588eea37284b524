//! Reporting utilities: prediction tables, model diagnostics, series summaries.

pub mod format;

pub use format::*;
