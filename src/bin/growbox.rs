//! Grow-Box CLI - analyse one gaze-sample CSV
//!
//! Reads a recording, writes the episodes CSV and the metrics JSON, then echoes
//! the metrics.

use clap::Parser;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use growbox::adapter::REQUIRED_COLUMNS;
use growbox::encoder::encode_metrics;
use growbox::{AnalysisError, DetectorConfig, GrowBoxAnalyzer, GROWBOX_VERSION};

/// Grow-Box CSV analyser
#[derive(Parser)]
#[command(name = "growbox")]
#[command(version = GROWBOX_VERSION)]
#[command(about = "Detect dwell episodes and grow-box metrics in gaze recordings", long_about = None)]
struct Cli {
    /// Input gaze samples CSV (use - for stdin)
    #[arg(long)]
    csv: PathBuf,

    /// Output episodes CSV
    #[arg(long)]
    episodes: PathBuf,

    /// Output metrics JSON
    #[arg(long)]
    metrics: PathBuf,

    /// Dwell threshold in milliseconds
    #[arg(long)]
    dwell_ms: Option<f64>,

    /// Delay before the box grows, in milliseconds
    #[arg(long)]
    grow_after_ms: Option<f64>,

    /// Substring of the mode column that marks grow mode
    #[arg(long)]
    grow_marker: Option<String>,

    /// Load detector configuration from a JSON file (flags override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliErrorReport::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(&cli)?;
    let analyzer = GrowBoxAnalyzer::new(config)?;

    let analysis = analyzer.analyze_files(&cli.csv, &cli.episodes, &cli.metrics)?;

    println!("[OK] episodes → {}", cli.episodes.display());
    println!("[OK] metrics  → {}", cli.metrics.display());
    println!("{}", encode_metrics(&analysis.metrics)?);

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<DetectorConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => DetectorConfig::from_json(&fs::read_to_string(path)?)?,
        None => DetectorConfig::default(),
    };

    if let Some(dwell_ms) = cli.dwell_ms {
        config.dwell_ms = dwell_ms;
    }
    if let Some(grow_after_ms) = cli.grow_after_ms {
        config.grow_after_ms = grow_after_ms;
    }
    if let Some(marker) = &cli.grow_marker {
        config.grow_marker = marker.clone();
    }

    Ok(config)
}

// Error types

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Analysis(AnalysisError),
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<AnalysisError> for CliError {
    fn from(e: AnalysisError) -> Self {
        CliError::Analysis(e)
    }
}

#[derive(serde::Serialize)]
struct CliErrorReport {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliError> for CliErrorReport {
    fn from(e: CliError) -> Self {
        match e {
            CliError::Io(e) | CliError::Analysis(AnalysisError::IoError(e)) => CliErrorReport {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CliError::Analysis(e @ AnalysisError::MissingColumn(_)) => CliErrorReport {
                code: "MISSING_COLUMN".to_string(),
                message: e.to_string(),
                hint: Some(format!("Input needs columns: {}", REQUIRED_COLUMNS.join(", "))),
            },
            CliError::Analysis(e @ AnalysisError::InvalidValue { .. }) => CliErrorReport {
                code: "INVALID_VALUE".to_string(),
                message: e.to_string(),
                hint: Some("timestamp must be numeric; hit flags must be 0 or 1".to_string()),
            },
            CliError::Analysis(e @ AnalysisError::CsvError(_)) => CliErrorReport {
                code: "CSV_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check CSV syntax".to_string()),
            },
            CliError::Analysis(e @ AnalysisError::JsonError(_)) => CliErrorReport {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the --config file's JSON syntax".to_string()),
            },
            CliError::Analysis(e @ AnalysisError::InvalidConfig(_)) => CliErrorReport {
                code: "INVALID_CONFIG".to_string(),
                message: e.to_string(),
                hint: Some("Thresholds must be non-negative and the marker non-empty".to_string()),
            },
        }
    }
}
