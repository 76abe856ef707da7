use crate::{
    grid::{Coord, MazeGrid},
    legality::{CarvePolicy, NoMergePolicy},
    settings::GenerationSettings,
    walker::{WalkError, Walker},
    MazeError,
};
use log::{debug, error, info, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Alias for the boxed callback invoked after every carved cell.
pub type CarveCallback = Box<dyn FnMut(&CarveEvent) + Send>;

/// Which kind of walk carved a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WalkPhase {
    /// The start-to-finish solving walk.
    Solve,
    /// A dead-end branch added after solving.
    Enrichment,
}

/// Information passed to the carve callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarveEvent {
    /// The cell that was just carved.
    pub coord: Coord,
    /// The walk that carved it.
    pub phase: WalkPhase,
    /// The solve attempt this cell belongs to (1-based). Each attempt starts from a fresh grid.
    pub attempt: u32,
    /// Index of the enrichment walk (1-based), `None` during solving.
    pub walk: Option<u32>,
}

/// Summary of a finished generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationStats {
    /// Solve attempts made, including the successful one.
    pub solve_attempts: u32,
    /// Enrichment walks run.
    pub enrichment_walks: u32,
    /// Enrichment walks that ran out of their time slice.
    pub timed_out_walks: u32,
    /// Open cells in the final grid.
    pub open_cells: usize,
    /// Final fraction of open cells.
    pub coverage: f64,
    /// Wall-clock time spent generating.
    pub elapsed: Duration,
}

/// A generated maze together with its statistics.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneratedMaze {
    /// The carved grid with start, finish and player placed.
    pub grid: MazeGrid,
    /// How the grid was produced.
    pub stats: GenerationStats,
}

/// Drives maze generation: places the endpoints, solves, then enriches.
pub struct MazeGenerator<P = NoMergePolicy> {
    settings: GenerationSettings,
    policy: P,
    carve_callback: Option<CarveCallback>,
}

impl MazeGenerator<NoMergePolicy> {
    /// Creates a generator using the standard carving rules.
    ///
    /// # Errors
    ///
    /// Returns `MazeError::Settings` if the settings are invalid.
    pub fn new(settings: GenerationSettings) -> Result<Self, MazeError> {
        Self::with_policy(settings, NoMergePolicy)
    }
}

impl<P: CarvePolicy + Clone> MazeGenerator<P> {
    /// Creates a generator using a custom carving policy.
    pub fn with_policy(settings: GenerationSettings, policy: P) -> Result<Self, MazeError> {
        settings.validate()?;
        Ok(Self {
            settings,
            policy,
            carve_callback: None,
        })
    }

    /// Sets the callback invoked after every carved cell.
    #[must_use]
    pub fn with_carve_callback(mut self, callback: CarveCallback) -> Self {
        self.carve_callback = Some(callback);
        self
    }

    /// The validated settings this generator runs with.
    pub const fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Generates a maze, seeding the RNG from the settings (or system entropy).
    pub fn generate(&mut self) -> Result<GeneratedMaze, MazeError> {
        let mut rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate_with_rng(&mut rng)
    }

    /// Generates a maze drawing every random choice from `rng`.
    ///
    /// 1. **Placement**: picks a random start and a random non-corner finish.
    /// 2. **Solve**: walks from start to finish. A failed attempt is retried on a
    ///    fresh grid with the same endpoints, up to `max_solve_attempts` times.
    /// 3. **Enrichment**: runs up to `n_random_walks` branch walks, stopping
    ///    early once the open fraction reaches `desired_coverage`.
    ///
    /// # Errors
    ///
    /// * `MazeError::GenerationFailed` if every solve attempt failed.
    /// * `MazeError::Walk` / `MazeError::Grid` for unrecoverable walk or grid errors.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<GeneratedMaze, MazeError> {
        let start_time = Instant::now();
        let settings = &self.settings;
        let budget = settings.allotted_time();
        info!(
            "Generating {}x{} maze (walks: {}, budget: {:?}, coverage target: {})",
            settings.ncols, settings.nrows, settings.n_random_walks, budget, settings.desired_coverage
        );

        let (start, finish) = place_endpoints(settings.nrows, settings.ncols, rng)?;
        debug!("Start at {start}, finish at {finish}");

        // --- Solve ---
        let callback = &mut self.carve_callback;
        let mut solved = None;
        for attempt in 1..=settings.max_solve_attempts {
            let mut grid = prepare_grid(settings.nrows, settings.ncols, start, finish)?;
            let mut walker = Walker::new(self.policy.clone(), budget);
            let result = walker.solve(&mut grid, rng, &mut |coord| {
                trace!("Solve attempt {attempt}: carved {coord}");
                if let Some(cb) = callback.as_mut() {
                    cb(&CarveEvent {
                        coord,
                        phase: WalkPhase::Solve,
                        attempt,
                        walk: None,
                    });
                }
            });
            match result {
                Ok(carved) => {
                    debug!("Solve attempt {attempt} succeeded, carved {carved} cells");
                    solved = Some((grid, attempt));
                    break;
                }
                Err(e @ (WalkError::BudgetExceeded(_) | WalkError::NoOpenCells)) => {
                    warn!("Solve attempt {attempt} failed: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }
        let Some((mut grid, solve_attempts)) = solved else {
            error!(
                "Giving up after {} failed solve attempts",
                settings.max_solve_attempts
            );
            return Err(MazeError::GenerationFailed {
                attempts: settings.max_solve_attempts,
            });
        };

        // --- Enrichment ---
        let mut walker = Walker::new(self.policy.clone(), budget);
        let mut enrichment_walks = 0;
        let mut timed_out_walks = 0;
        while enrichment_walks < settings.n_random_walks
            && grid.coverage() < settings.desired_coverage
        {
            enrichment_walks += 1;
            let walk = enrichment_walks;
            let result = walker.form_path(&mut grid, rng, settings.n_random_walks, &mut |coord| {
                if let Some(cb) = callback.as_mut() {
                    cb(&CarveEvent {
                        coord,
                        phase: WalkPhase::Enrichment,
                        attempt: solve_attempts,
                        walk: Some(walk),
                    });
                }
            });
            match result {
                Ok(carved) => trace!("Enrichment walk {walk} carved {carved} cells"),
                Err(WalkError::BudgetExceeded(slice)) => {
                    debug!("Enrichment walk {walk} ran out of its {slice:?} slice");
                    timed_out_walks += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        let stats = GenerationStats {
            solve_attempts,
            enrichment_walks,
            timed_out_walks,
            open_cells: grid.open_cell_count(),
            coverage: grid.coverage(),
            elapsed: start_time.elapsed(),
        };
        info!(
            "Maze generated in {:?}: {} solve attempt(s), {} enrichment walk(s), coverage {:.3}",
            stats.elapsed, stats.solve_attempts, stats.enrichment_walks, stats.coverage
        );
        Ok(GeneratedMaze { grid, stats })
    }
}

/// Chooses a uniformly random start and a uniformly random finish that is
/// neither the start nor a corner.
///
/// # Errors
///
/// Returns `MazeError::Grid` for zero dimensions, or `MazeError::NoFinishCandidate`
/// if the grid has no non-corner cell besides the start.
pub fn place_endpoints<R: Rng + ?Sized>(
    nrows: usize,
    ncols: usize,
    rng: &mut R,
) -> Result<(Coord, Coord), MazeError> {
    let grid = MazeGrid::new(nrows, ncols)?;
    let start = Coord::new(rng.gen_range(0..ncols), rng.gen_range(0..nrows));
    let candidates: Vec<Coord> = grid
        .coords()
        .filter(|&c| c != start && !grid.is_corner(c))
        .collect();
    let finish = *candidates
        .choose(rng)
        .ok_or(MazeError::NoFinishCandidate { nrows, ncols })?;
    Ok((start, finish))
}

/// Builds a fresh wall grid with both endpoints opened and the player on the start.
fn prepare_grid(
    nrows: usize,
    ncols: usize,
    start: Coord,
    finish: Coord,
) -> Result<MazeGrid, MazeError> {
    let mut grid = MazeGrid::new(nrows, ncols)?;
    grid.carve(start)?;
    grid.set_start(start)?;
    grid.set_player(start)?;
    grid.carve(finish)?;
    grid.set_finish(finish)?;
    Ok(grid)
}

/// Generates a maze with the standard carving rules.
pub fn generate(settings: &GenerationSettings) -> Result<GeneratedMaze, MazeError> {
    MazeGenerator::new(settings.clone())?.generate()
}
