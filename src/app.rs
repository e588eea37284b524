//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - generates or loads the price history
//! - fits the per-material trends
//! - prints predictions, diagnostics and plots
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::pipeline::{PriceContext, SeriesSource};
use crate::cli::{ChartArgs, Command, GenerateArgs, GeneratorArgs, PredictArgs, SourceArgs};
use crate::config::{GeneratorConfig, load_generator_config};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `mtrend` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `mtrend` and `mtrend --seed 7` behave like `mtrend tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // Log lines would corrupt the alternate screen.
    if !matches!(cli.command, Command::Tui(_)) {
        init_tracing();
    }

    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Predict(args) => handle_predict(args),
        Command::Models(args) => handle_models(args),
        Command::Chart(args) => handle_chart(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "material_trends=info".into()))
        .try_init();
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = generator_config_from_args(&args.generator)?;
    let generated = crate::data::generate_series(&config)?;

    crate::io::write_series_csv(&args.out, &generated.series)?;

    println!(
        "{}",
        crate::report::format_series_summary(&generated.series, Some(generated.seed))
    );
    println!("Exported to {}", args.out.display());
    if args.preview > 0 {
        println!();
        println!("{}", crate::report::format_head(&generated.series, args.preview));
    }
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let source = source_from_args(&args.source)?;
    let ctx = PriceContext::load(&source)?;
    let result = ctx.predict_str(&args.date);

    if let Some(path) = &args.export_json {
        crate::io::write_response_json(path, &result)?;
    }

    if args.json {
        println!("{}", crate::io::render_response_json(&result)?);
    } else if let Ok(prediction) = &result {
        println!("{}", crate::report::format_prediction(prediction));
    }

    result.map(|_| ()).map_err(AppError::from)
}

fn handle_models(args: SourceArgs) -> Result<(), AppError> {
    let source = source_from_args(&args)?;
    let ctx = PriceContext::load(&source)?;

    println!("{}", crate::report::format_series_summary(ctx.series(), ctx.seed()));
    println!();
    println!("{}", crate::report::format_models(ctx.models()));
    Ok(())
}

fn handle_chart(args: ChartArgs) -> Result<(), AppError> {
    let source = source_from_args(&args.source)?;
    let ctx = PriceContext::load(&source)?;

    let prediction = match &args.date {
        Some(date) => Some(ctx.predict_str(date)?),
        None => None,
    };

    let plot = crate::plot::render_material_plot(
        ctx.series(),
        ctx.models(),
        args.material,
        prediction.as_ref(),
        args.width,
        args.height,
    );
    println!("{plot}");
    Ok(())
}

fn handle_tui(args: SourceArgs) -> Result<(), AppError> {
    let source = source_from_args(&args)?;
    let ctx = PriceContext::load(&source)?;
    crate::tui::run(ctx)
}

/// Pick the series source: an explicit CSV wins over in-memory generation.
pub fn source_from_args(args: &SourceArgs) -> Result<SeriesSource, AppError> {
    match &args.series {
        Some(path) => Ok(SeriesSource::Csv(path.clone())),
        None => Ok(SeriesSource::Generated(generator_config_from_args(&args.generator)?)),
    }
}

/// Build a generator config: profile file first, then command-line overrides.
pub fn generator_config_from_args(args: &GeneratorArgs) -> Result<GeneratorConfig, AppError> {
    let mut config = match &args.profiles {
        Some(path) => load_generator_config(path)?,
        None => GeneratorConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(days) = args.days {
        config.days = days;
    }
    if let Some(start) = args.start {
        config.start = start;
    }
    if args.noiseless {
        config = config.noiseless();
    }

    config.validate()?;
    Ok(config)
}

/// Rewrite argv so `mtrend` defaults to `mtrend tui`.
///
/// Rules:
/// - `mtrend`                      -> `mtrend tui`
/// - `mtrend --seed 7 ...`         -> `mtrend tui --seed 7 ...`
/// - `mtrend --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "generate" | "predict" | "models" | "chart" | "tui");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
