//! `material-trends` library crate.
//!
//! The binary (`mtrend`) is a thin wrapper around this library so that:
//!
//! - the generator and estimator are testable without spawning processes
//! - a fitted [`app::pipeline::PriceContext`] can be shared by any front-end

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
