//! Trend models fit per material.
//!
//! Models are small immutable values so the query surfaces can share them
//! freely once fitted.

pub mod trend;

pub use trend::*;
