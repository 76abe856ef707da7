use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use maze_core::GenerationSettings;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// The CLI refuses grids smaller than this on either side.
pub const MIN_CLI_DIMENSION: usize = 10;

/// Prefix for environment variables overriding generation settings (e.g. `MAZE_NROWS`).
pub const ENV_PREFIX: &str = "MAZE_";

/// Represents the different visualization modes available.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VisualizationMode {
    None,
    #[default]
    Terminal, // Colored blocks (or plain glyphs with --no-color)
}

/// File format for the saved maze.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Log level for the progress reporter.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProgressLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
}

/// Log level for everything else.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Configuration for the Maze Forge application.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Generates random mazes that always have a solution", long_about = None)]
pub struct AppConfig {
    /// Optional TOML file with generation settings. CLI flags override it.
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of rows in the maze.
    #[arg(short = 'r', long)]
    pub nrows: Option<usize>,

    /// Number of columns in the maze.
    #[arg(short = 'c', long)]
    pub ncols: Option<usize>,

    /// Maximum number of branch walks added after the maze is solved.
    #[arg(short = 'w', long)]
    pub walks: Option<u32>,

    /// Time budget for generation (e.g., "5s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub time_budget: Option<Duration>,

    /// Fraction of cells that should be open, in [0, 1].
    #[arg(long)]
    pub coverage: Option<f64>,

    /// Optional seed for the random number generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of solve attempts before giving up.
    #[arg(long)]
    pub max_solve_attempts: Option<u32>,

    /// Path to save the generated maze.
    #[arg(short, long, value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Format of the saved maze.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Choose the visualization mode.
    #[arg(long, value_enum, default_value_t = VisualizationMode::Terminal)]
    pub visualization_mode: VisualizationMode,

    /// Draw the terminal view with plain characters instead of colors.
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    /// Report progress updates every specified interval (e.g., "1s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub report_progress_interval: Option<Duration>,

    /// Generate this many mazes and report timing statistics instead of a single maze.
    #[arg(long, default_value_t = 0)]
    pub benchmark_runs: u32,

    /// Optional: Path to save benchmark results as a CSV file.
    /// Only used if benchmark_runs is non-zero.
    #[arg(long, value_name = "CSV_FILE")]
    pub benchmark_csv_output: Option<PathBuf>,

    /// Log level for progress reports.
    #[arg(long, value_enum, default_value_t = ProgressLogLevel::Info)]
    pub progress_log_level: ProgressLogLevel,

    /// Log level for everything else (RUST_LOG takes precedence).
    #[arg(long, value_enum, default_value_t = GlobalLogLevel::Info)]
    pub global_log_level: GlobalLogLevel,
}

/// Generation settings given explicitly on the command line.
#[derive(Serialize, Debug, Default)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    nrows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ncols: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n_random_walks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allotted_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    desired_coverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_solve_attempts: Option<u32>,
}

impl AppConfig {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            nrows: self.nrows,
            ncols: self.ncols,
            n_random_walks: self.walks,
            allotted_time_ms: self
                .time_budget
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            desired_coverage: self.coverage,
            seed: self.seed,
            max_solve_attempts: self.max_solve_attempts,
        }
    }

    /// Layers defaults, the optional config file, `MAZE_*` environment
    /// variables and CLI flags (in increasing priority) into validated settings.
    pub fn generation_settings(&self) -> Result<GenerationSettings, AppError> {
        let mut figment = Figment::from(Serialized::defaults(GenerationSettings::default()));
        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        let settings: GenerationSettings = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(self.overrides()))
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;

        for (name, value) in [("nrows", settings.nrows), ("ncols", settings.ncols)] {
            if value < MIN_CLI_DIMENSION {
                return Err(AppError::Config(format!(
                    "{name} must be at least {MIN_CLI_DIMENSION}, got {value}"
                )));
            }
        }
        settings
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok(settings)
    }
}
