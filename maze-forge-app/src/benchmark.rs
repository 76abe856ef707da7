//! Benchmarking utilities: generate many mazes with the same settings and
//! summarize how long they took.

use anyhow::Error;
use maze_core::{GenerationSettings, MazeError, MazeGenerator};
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

/// Outcome of a single generation run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub run: u32,
    pub seed: u64,
    pub nrows: usize,
    pub ncols: usize,
    pub succeeded: bool,
    pub solve_attempts: u32,
    pub enrichment_walks: u32,
    pub timed_out_walks: u32,
    pub open_cells: usize,
    pub coverage: f64,
    pub elapsed_ms: f64,
    pub error: Option<String>,
}

/// Aggregated timings over all runs.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSummary {
    pub runs: usize,
    pub successful_runs: usize,
    pub failed_runs: usize,
    pub avg_time_ms: Option<f64>,
    pub median_time_ms: Option<f64>,
    pub stddev_time_ms: Option<f64>,
    pub avg_coverage: Option<f64>,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Runs one generation with an explicit seed.
pub fn run_single_benchmark(settings: &GenerationSettings, run: u32, seed: u64) -> BenchmarkResult {
    let mut run_settings = settings.clone();
    run_settings.seed = Some(seed);

    let start_time = Instant::now();
    let outcome = MazeGenerator::new(run_settings).and_then(|mut generator| generator.generate());
    let elapsed_ms = millis(start_time.elapsed());

    let mut result = BenchmarkResult {
        run,
        seed,
        nrows: settings.nrows,
        ncols: settings.ncols,
        succeeded: false,
        solve_attempts: 0,
        enrichment_walks: 0,
        timed_out_walks: 0,
        open_cells: 0,
        coverage: 0.0,
        elapsed_ms,
        error: None,
    };
    match outcome {
        Ok(maze) => {
            result.succeeded = true;
            result.solve_attempts = maze.stats.solve_attempts;
            result.enrichment_walks = maze.stats.enrichment_walks;
            result.timed_out_walks = maze.stats.timed_out_walks;
            result.open_cells = maze.stats.open_cells;
            result.coverage = maze.stats.coverage;
        }
        Err(e) => {
            if let MazeError::GenerationFailed { attempts } = e {
                result.solve_attempts = attempts;
            }
            log::warn!("Benchmark run {} (seed {}) failed: {}", run, seed, e);
            result.error = Some(e.to_string());
        }
    }
    result
}

/// Runs `runs` generations. Run `i` uses seed `base + i`, where `base` is
/// the configured seed or 0.
pub fn run_benchmark(settings: &GenerationSettings, runs: u32) -> Vec<BenchmarkResult> {
    let base_seed = settings.seed.unwrap_or(0);
    (0..runs)
        .map(|run| {
            let result = run_single_benchmark(settings, run, base_seed.wrapping_add(u64::from(run)));
            log::debug!(
                "Benchmark run {}/{} finished in {:.3} ms",
                run + 1,
                runs,
                result.elapsed_ms
            );
            result
        })
        .collect()
}

// --- Statistics Helper Functions ---
fn calculate_median(data: &mut [f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    data.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = data.len() / 2;
    if data.len() % 2 == 0 {
        Some((data[mid - 1] + data[mid]) / 2.0)
    } else {
        Some(data[mid])
    }
}

fn calculate_std_dev(data: &[f64], mean: f64) -> Option<f64> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    let variance = data
        .iter()
        .map(|value| {
            let diff = mean - value;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1) as f64;
    Some(variance.sqrt())
}

fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        None
    } else {
        Some(data.iter().sum::<f64>() / data.len() as f64)
    }
}

/// Timing statistics over the successful runs.
pub fn summarize(results: &[BenchmarkResult]) -> BenchmarkSummary {
    let successful: Vec<&BenchmarkResult> = results.iter().filter(|r| r.succeeded).collect();
    let times: Vec<f64> = successful.iter().map(|r| r.elapsed_ms).collect();
    let coverages: Vec<f64> = successful.iter().map(|r| r.coverage).collect();

    let avg_time_ms = mean(&times);
    let mut sorted_times = times.clone();
    BenchmarkSummary {
        runs: results.len(),
        successful_runs: successful.len(),
        failed_runs: results.len() - successful.len(),
        avg_time_ms,
        median_time_ms: calculate_median(&mut sorted_times),
        stddev_time_ms: avg_time_ms.and_then(|avg| calculate_std_dev(&times, avg)),
        avg_coverage: mean(&coverages),
    }
}

/// Prints the summary table to stdout.
pub fn report_summary(settings: &GenerationSettings, summary: &BenchmarkSummary) {
    let fmt = |value: Option<f64>| value.map_or_else(|| "N/A".to_string(), |t| format!("{t:.3}"));

    println!("\n--- Maze Generation Benchmark ---");
    println!(
        "Size: {}x{} | Walks: {} | Budget: {} ms | Coverage target: {:.2}",
        settings.nrows,
        settings.ncols,
        settings.n_random_walks,
        settings.allotted_time_ms,
        settings.desired_coverage
    );
    println!("----------------------------------------------------------------------------");
    println!("Runs | Success | Failed | Avg Time (ms) | Median (ms) | Std Dev (ms) | Avg Coverage");
    println!("-----|---------|--------|---------------|-------------|--------------|-------------");
    println!(
        "{:<4} | {:<7} | {:<6} | {:<13} | {:<11} | {:<12} | {}",
        summary.runs,
        summary.successful_runs,
        summary.failed_runs,
        fmt(summary.avg_time_ms),
        fmt(summary.median_time_ms),
        fmt(summary.stddev_time_ms),
        fmt(summary.avg_coverage),
    );
    println!("----------------------------------------------------------------------------");
}

/// Writes one CSV row per run.
///
/// # Returns
///
/// * `Ok(())` if writing to CSV is successful.
/// * `Err(Error)` if there is an error creating the file or writing the data.
pub fn write_results_to_csv(results: &[BenchmarkResult], path: &Path) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}
