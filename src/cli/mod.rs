//! Command-line parsing for the material price trend estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::Material;

/// Default export path for `mtrend generate`.
pub const DEFAULT_EXPORT_PATH: &str = "construction_material_prices.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mtrend", version, about = "Construction material price trends and estimates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic daily price history and export it as CSV.
    Generate(GenerateArgs),
    /// Predict every material's price for a target date.
    Predict(PredictArgs),
    /// Print the fitted trend per material with fit diagnostics.
    Models(SourceArgs),
    /// Plot one material's history and trend in the terminal.
    Chart(ChartArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same context as `mtrend predict`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(SourceArgs),
}

/// Knobs for in-memory or exported synthetic data.
#[derive(Debug, Args, Clone, Default)]
pub struct GeneratorArgs {
    /// TOML file with generator profiles (start, days, seed, per-material baselines).
    #[arg(long, env = "MTREND_PROFILES", value_name = "TOML")]
    pub profiles: Option<PathBuf>,

    /// Random seed for noise generation (omit for a fresh seed each run).
    #[arg(long, env = "MTREND_SEED")]
    pub seed: Option<u64>,

    /// Number of days of history to generate.
    #[arg(long)]
    pub days: Option<usize>,

    /// First date of the generated history (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub start: Option<NaiveDate>,

    /// Disable the Gaussian noise (pure linear baselines).
    #[arg(long)]
    pub noiseless: bool,
}

/// Where query commands get their price history.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Load the history from a CSV written by `mtrend generate` instead of generating it.
    #[arg(
        long,
        env = "MTREND_SERIES",
        value_name = "CSV",
        conflicts_with_all = ["profiles", "seed", "days", "start", "noiseless"]
    )]
    pub series: Option<PathBuf>,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Options for `mtrend generate`.
#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Output CSV path (overwritten if it exists).
    #[arg(short, long, default_value = DEFAULT_EXPORT_PATH)]
    pub out: PathBuf,

    /// Number of leading rows to print after export.
    #[arg(long, default_value_t = 5)]
    pub preview: usize,

    #[command(flatten)]
    pub generator: GeneratorArgs,
}

/// Options for `mtrend predict`.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Target date (YYYY-MM-DD); must be after the series start.
    #[arg(short, long)]
    pub date: String,

    /// Print the response as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON response to a file.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Options for `mtrend chart`.
#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Material to plot.
    #[arg(short, long, value_enum, default_value_t = Material::Cement)]
    pub material: Material,

    /// Optional target date; its prediction is drawn as `P`.
    #[arg(short, long)]
    pub date: Option<String>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn predict_flags_parse() {
        let cli = Cli::try_parse_from([
            "mtrend", "predict", "--date", "2025-01-01", "--seed", "3", "--noiseless", "--json",
        ])
        .unwrap();
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.date, "2025-01-01");
        assert!(args.json);
        assert_eq!(args.source.generator.seed, Some(3));
        assert!(args.source.generator.noiseless);
    }

    #[test]
    fn series_csv_conflicts_with_generator_flags() {
        for flag in [
            &["--seed", "3"][..],
            &["--days", "10"][..],
            &["--start", "2020-01-01"][..],
            &["--noiseless"][..],
            &["--profiles", "p.toml"][..],
        ] {
            let mut argv = vec!["mtrend", "models", "--series", "prices.csv"];
            argv.extend_from_slice(flag);
            let err = Cli::try_parse_from(argv.clone()).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict, "{argv:?}");
        }

        let cli = Cli::try_parse_from(["mtrend", "models", "--series", "prices.csv"]).unwrap();
        let Command::Models(args) = cli.command else {
            panic!("expected models");
        };
        assert_eq!(args.series, Some(PathBuf::from("prices.csv")));
    }

    #[test]
    fn chart_material_parses_lowercase() {
        let cli = Cli::try_parse_from(["mtrend", "chart", "-m", "steel"]).unwrap();
        let Command::Chart(args) = cli.command else {
            panic!("expected chart");
        };
        assert_eq!(args.material, Material::Steel);
    }
}
