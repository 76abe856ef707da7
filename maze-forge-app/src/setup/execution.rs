//! Handles the core execution logic for standard and benchmark modes.

use crate::{
    benchmark,
    config::{AppConfig, VisualizationMode},
    error::AppError,
    output,
    progress::{ConsoleProgressReporter, ProgressReporter},
    visualization::{TerminalVisualizer, Visualizer},
};
use log::{error, info};
use maze_core::{CarveCallback, CarveEvent, GeneratedMaze, MazeGenerator};
use std::sync::{Arc, Mutex};

type SharedReporter = Arc<Mutex<ConsoleProgressReporter>>;

fn progress_callback(reporter: &SharedReporter) -> CarveCallback {
    let reporter = Arc::clone(reporter);
    Box::new(move |event: &CarveEvent| match reporter.lock() {
        Ok(mut guard) => {
            if let Err(e) = guard.report(event) {
                error!("Progress reporting failed: {}", e);
            }
        }
        Err(_) => error!("Progress reporter mutex poisoned!"),
    })
}

/// Generates one maze, then shows and saves it as configured.
pub fn run_standard_mode(config: &AppConfig) -> Result<GeneratedMaze, AppError> {
    info!("Running maze generation...");
    let settings = config.generation_settings()?;
    let total_cells = settings.total_cells();

    let reporter: Option<SharedReporter> = config.report_progress_interval.map(|interval| {
        info!("Reporting progress every {:?}", interval);
        Arc::new(Mutex::new(ConsoleProgressReporter::new(interval, total_cells)))
    });

    let mut generator = MazeGenerator::new(settings)?;
    if let Some(reporter) = &reporter {
        generator = generator.with_carve_callback(progress_callback(reporter));
    }

    let maze = match generator.generate() {
        Ok(maze) => {
            if let Some(reporter) = &reporter {
                if let Ok(mut guard) = reporter.lock() {
                    guard.finish(&maze.stats)?;
                }
            }
            maze
        }
        Err(e) => {
            if let Some(reporter) = &reporter {
                if let Ok(mut guard) = reporter.lock() {
                    guard.fail(&e)?;
                }
            }
            return Err(e.into());
        }
    };
    info!(
        "Generated maze: {} solve attempt(s), {} branch walk(s), {:.1}% open in {:?}",
        maze.stats.solve_attempts,
        maze.stats.enrichment_walks,
        maze.stats.coverage * 100.0,
        maze.stats.elapsed
    );

    match config.visualization_mode {
        VisualizationMode::None => {}
        VisualizationMode::Terminal => {
            if config.no_color {
                colored::control::set_override(false);
            }
            let mut visualizer = TerminalVisualizer::stdout(!config.no_color);
            visualizer
                .display_state(&maze.grid)
                .map_err(|e| AppError::Visualization(e.to_string()))?;
        }
    }

    if let Some(path) = &config.output_path {
        output::save_maze_to_file(&maze, path, config.output_format)?;
    }

    Ok(maze)
}

/// Generates `benchmark_runs` mazes and reports timing statistics.
pub fn run_benchmark_mode(config: &AppConfig) -> Result<(), AppError> {
    info!("Benchmark mode enabled. Runs: {}", config.benchmark_runs);
    let settings = config.generation_settings()?;

    let results = benchmark::run_benchmark(&settings, config.benchmark_runs);
    let summary = benchmark::summarize(&results);
    benchmark::report_summary(&settings, &summary);

    if let Some(csv_path) = &config.benchmark_csv_output {
        info!("Writing benchmark results to {:?}", csv_path);
        benchmark::write_results_to_csv(&results, csv_path)?;
        info!("Benchmark results successfully written to {:?}", csv_path);
    }

    if summary.successful_runs == 0 && summary.runs > 0 {
        error!("All {} benchmark runs failed", summary.runs);
    }
    Ok(())
}
