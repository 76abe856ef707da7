// maze-forge-app/src/progress.rs

use anyhow::Result;
use maze_core::{CarveEvent, GenerationStats, MazeError, WalkPhase};
use std::time::{Duration, Instant};

/// Trait for reporting the progress of maze generation.
///
/// Implementors of this trait can display progress information in various ways
/// (e.g., console output, GUI updates).
pub trait ProgressReporter: Send {
    /// Called for every carved cell.
    fn report(&mut self, event: &CarveEvent) -> Result<()>;

    /// Called when generation completes successfully.
    fn finish(&mut self, stats: &GenerationStats) -> Result<()>;

    /// Called when generation fails with an error.
    fn fail(&mut self, error: &MazeError) -> Result<()>;
}

/// A `ProgressReporter` that outputs throttled status updates to the log.
pub struct ConsoleProgressReporter {
    start_time: Instant,
    last_report_time: Instant,
    report_interval: Duration,
    total_cells: usize,
    attempt: u32,
    carved_this_attempt: usize,
    reports: usize,
}

impl ConsoleProgressReporter {
    /// Creates a new `ConsoleProgressReporter`.
    ///
    /// # Arguments
    ///
    /// * `report_interval` - The minimum time that must elapse between progress reports.
    /// * `total_cells` - Size of the grid being generated, for percentages.
    pub fn new(report_interval: Duration, total_cells: usize) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_report_time: now,
            report_interval,
            total_cells,
            attempt: 0,
            carved_this_attempt: 0,
            reports: 0,
        }
    }

    /// Number of progress lines emitted so far.
    pub const fn reports(&self) -> usize {
        self.reports
    }

    /// Cells carved by the current solve attempt and its enrichment walks.
    pub const fn carved(&self) -> usize {
        self.carved_this_attempt
    }

    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        let millis = duration.subsec_millis();
        format!("{}.{:03}s", secs, millis)
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report(&mut self, event: &CarveEvent) -> Result<()> {
        // A new attempt starts again from a fresh grid.
        if event.attempt != self.attempt {
            self.attempt = event.attempt;
            self.carved_this_attempt = 0;
        }
        self.carved_this_attempt += 1;

        let now = Instant::now();
        if now.duration_since(self.last_report_time) >= self.report_interval {
            let percentage = if self.total_cells > 0 {
                // Start and finish are open before any carving happens.
                ((self.carved_this_attempt + 2) as f64 / self.total_cells as f64) * 100.0
            } else {
                100.0
            };
            let phase = match (event.phase, event.walk) {
                (WalkPhase::Solve, _) => "solving".to_string(),
                (WalkPhase::Enrichment, Some(walk)) => format!("branch walk {walk}"),
                (WalkPhase::Enrichment, None) => "branching".to_string(),
            };
            log::info!(
                "Progress: Attempt {} | {} | Carved: {} ({:.1}% open) | Elapsed: {}",
                event.attempt,
                phase,
                self.carved_this_attempt,
                percentage,
                Self::format_duration(self.start_time.elapsed())
            );
            self.last_report_time = now;
            self.reports += 1;
        }
        Ok(())
    }

    fn finish(&mut self, stats: &GenerationStats) -> Result<()> {
        log::info!(
            "Maze finished: {} open cells ({:.1}%). Total time: {}",
            stats.open_cells,
            stats.coverage * 100.0,
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }

    fn fail(&mut self, error: &MazeError) -> Result<()> {
        log::error!(
            "Maze generation failed: {}. Total time: {}",
            error,
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }
}
