//! The randomized walk that carves paths through the grid.
//!
//! A [`Walker`] performs two kinds of walks:
//! 1. **Solve**: from the start cell until it stands next to the finish,
//!    backtracking along already-open cells whenever it gets stuck.
//! 2. **Enrichment** ([`Walker::form_path`]): from a random open cell until
//!    no legal step remains, leaving a dead-end branch off the existing path.
//!
//! Every loop polls its deadline; there is no preemptive cancellation.

use crate::grid::{Coord, GridError, MazeGrid};
use crate::legality::{has_legal_step, legal_steps, CarvePolicy};
use bitvec::prelude::*;
use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can end a walk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalkError {
    /// The walk ran out of its time budget. Cells carved so far stay carved.
    #[error("Walk exceeded its time budget of {0:?}")]
    BudgetExceeded(Duration),
    /// Solving requires a start cell.
    #[error("Grid has no start cell")]
    MissingStart,
    /// Solving requires a finish cell.
    #[error("Grid has no finish cell")]
    MissingFinish,
    /// Backtracking was requested before the walker had a position.
    #[error("Walker has no current position")]
    NoPosition,
    /// There is no open cell to start from or jump to.
    #[error("Grid has no open cells to walk from")]
    NoOpenCells,
    /// A grid operation failed.
    #[error("Grid error during walk: {0}")]
    Grid(#[from] GridError),
}

/// Random walker carving paths under a [`CarvePolicy`].
#[derive(Debug, Clone)]
pub struct Walker<P> {
    policy: P,
    budget: Duration,
    current: Option<Coord>,
    deadline: Option<Instant>,
    visited: BitVec,
}

impl<P: CarvePolicy> Walker<P> {
    /// Creates a walker. `budget` bounds a whole solve; enrichment walks get a share of it.
    pub fn new(policy: P, budget: Duration) -> Self {
        Self {
            policy,
            budget,
            current: None,
            deadline: None,
            visited: BitVec::new(),
        }
    }

    /// The cell the walker is standing on.
    pub const fn current(&self) -> Option<Coord> {
        self.current
    }

    fn arm_deadline(&mut self, slice: Duration) {
        // An unrepresentable deadline means the walk is effectively unbounded.
        self.deadline = Instant::now().checked_add(slice);
    }

    fn check_deadline(&self, slice: Duration) -> Result<(), WalkError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(WalkError::BudgetExceeded(slice)),
            _ => Ok(()),
        }
    }

    /// Walks from the start cell until the walker stands next to the finish.
    ///
    /// `on_carve` is invoked once per newly carved cell. Walk state always
    /// restarts from the start cell; a failed solve is never resumed.
    ///
    /// Returns the number of cells carved.
    ///
    /// # Errors
    ///
    /// * `WalkError::BudgetExceeded` if the deadline passes, including while backtracking.
    /// * `WalkError::MissingStart` / `WalkError::MissingFinish` if the grid lacks either marker.
    pub fn solve<R: Rng + ?Sized>(
        &mut self,
        grid: &mut MazeGrid,
        rng: &mut R,
        on_carve: &mut dyn FnMut(Coord),
    ) -> Result<usize, WalkError> {
        let start = grid.start().ok_or(WalkError::MissingStart)?;
        grid.finish().ok_or(WalkError::MissingFinish)?;
        self.current = Some(start);
        self.arm_deadline(self.budget);
        debug!("Solving from {start} with budget {:?}", self.budget);

        let mut carved = 0;
        loop {
            self.check_deadline(self.budget)?;

            let current = self.current.ok_or(WalkError::NoPosition)?;
            if grid.is_adjacent_to_finish(current) {
                debug!("Reached finish neighbor {current} after carving {carved} cells");
                return Ok(carved);
            }

            match self.step(grid, rng) {
                Some(next) => {
                    grid.carve(next)?;
                    on_carve(next);
                    carved += 1;
                    self.current = Some(next);
                }
                None => {
                    self.backtrack(grid, rng)?;
                }
            }
        }
    }

    /// Picks a uniformly random legal neighbor of the current cell.
    ///
    /// `None` is not an error: it means the walker is stuck here.
    pub fn step<R: Rng + ?Sized>(&self, grid: &MazeGrid, rng: &mut R) -> Option<Coord> {
        let current = self.current?;
        legal_steps(&self.policy, grid, current).choose(rng).copied()
    }

    /// Moves the walker back along open cells until it reaches one with a legal step.
    ///
    /// Cells visited during this call are not re-entered. When every open
    /// neighbor has been visited, the visited set is cleared and the walker
    /// jumps to a uniformly random open cell instead.
    ///
    /// # Errors
    ///
    /// * `WalkError::BudgetExceeded` if the deadline passes before a position is found.
    /// * `WalkError::NoOpenCells` if there is nowhere to jump to.
    pub fn backtrack<R: Rng + ?Sized>(
        &mut self,
        grid: &MazeGrid,
        rng: &mut R,
    ) -> Result<Coord, WalkError> {
        let mut current = self.current.ok_or(WalkError::NoPosition)?;
        let finish = grid.finish();
        self.visited = bitvec![0; grid.total_cells()];
        trace!("Backtracking from {current}");

        loop {
            self.check_deadline(self.budget)?;
            self.mark_visited(grid, current);

            let options: Vec<Coord> = grid
                .neighbors(current)
                .filter(|&n| grid.is_open(n) && Some(n) != finish && !self.is_visited(grid, n))
                .collect();

            current = match options.choose(rng) {
                Some(&next) => next,
                None => {
                    self.visited.fill(false);
                    let jump = random_open_cell(grid, rng)?;
                    trace!("Backtrack exhausted around {current}, jumping to {jump}");
                    jump
                }
            };
            self.current = Some(current);

            if has_legal_step(&self.policy, grid, current) {
                trace!("Backtracked to {current}");
                return Ok(current);
            }
        }
    }

    /// Carves a dead-end branch from a random open cell until no legal step remains.
    ///
    /// The walk gets `budget / n_total_walks` of time and never backtracks.
    /// Returns the number of cells carved.
    ///
    /// # Errors
    ///
    /// * `WalkError::BudgetExceeded` if the time slice runs out. Cells already carved are kept.
    /// * `WalkError::NoOpenCells` if the grid has nothing to start from.
    pub fn form_path<R: Rng + ?Sized>(
        &mut self,
        grid: &mut MazeGrid,
        rng: &mut R,
        n_total_walks: u32,
        on_carve: &mut dyn FnMut(Coord),
    ) -> Result<usize, WalkError> {
        let slice = self
            .budget
            .checked_div(n_total_walks)
            .unwrap_or(self.budget);
        self.arm_deadline(slice);

        let origin = random_open_cell(grid, rng)?;
        self.current = Some(origin);
        trace!("Enrichment walk from {origin} with slice {slice:?}");

        let mut carved = 0;
        loop {
            if let Err(e) = self.check_deadline(slice) {
                debug!("Enrichment walk from {origin} timed out after carving {carved} cells");
                return Err(e);
            }
            let Some(next) = self.step(grid, rng) else {
                return Ok(carved);
            };
            grid.carve(next)?;
            on_carve(next);
            carved += 1;
            self.current = Some(next);
        }
    }

    fn mark_visited(&mut self, grid: &MazeGrid, coord: Coord) {
        if let Some(idx) = grid.index(coord) {
            self.visited.set(idx, true);
        }
    }

    fn is_visited(&self, grid: &MazeGrid, coord: Coord) -> bool {
        grid.index(coord)
            .and_then(|idx| self.visited.get(idx).map(|bit| *bit))
            .unwrap_or(false)
    }
}

/// A uniformly random open cell other than the finish.
fn random_open_cell<R: Rng + ?Sized>(grid: &MazeGrid, rng: &mut R) -> Result<Coord, WalkError> {
    let finish = grid.finish();
    let candidates: Vec<Coord> = grid
        .all_open_cells()
        .into_iter()
        .filter(|&c| Some(c) != finish)
        .collect();
    candidates.choose(rng).copied().ok_or(WalkError::NoOpenCells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legality::{MockCarvePolicy, NoMergePolicy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const AMPLE: Duration = Duration::from_secs(10);

    fn setup_grid(start: Coord, finish: Coord) -> MazeGrid {
        let mut grid = MazeGrid::new(10, 10).unwrap();
        grid.carve(start).unwrap();
        grid.set_start(start).unwrap();
        grid.set_player(start).unwrap();
        grid.carve(finish).unwrap();
        grid.set_finish(finish).unwrap();
        grid
    }

    #[test]
    fn test_solve_reaches_finish_neighbor() {
        let mut grid = setup_grid(Coord::new(2, 2), Coord::new(7, 6));
        let mut rng = StdRng::seed_from_u64(7);
        let mut walker = Walker::new(NoMergePolicy, AMPLE);
        let mut carved_cells = Vec::new();

        let carved = walker
            .solve(&mut grid, &mut rng, &mut |c| carved_cells.push(c))
            .unwrap();

        assert_eq!(carved, carved_cells.len());
        let current = walker.current().unwrap();
        assert!(grid.is_adjacent_to_finish(current));
        assert!(carved_cells.iter().all(|&c| grid.is_open(c)));
    }

    #[test]
    fn test_solve_with_adjacent_finish_carves_nothing() {
        let mut grid = setup_grid(Coord::new(3, 3), Coord::new(4, 3));
        let mut rng = StdRng::seed_from_u64(1);
        let mut walker = Walker::new(NoMergePolicy, AMPLE);
        assert_eq!(walker.solve(&mut grid, &mut rng, &mut |_| {}), Ok(0));
        assert_eq!(grid.open_cell_count(), 2);
    }

    #[test]
    fn test_solve_with_zero_budget_fails_immediately() {
        let mut grid = setup_grid(Coord::new(3, 3), Coord::new(4, 3));
        let mut rng = StdRng::seed_from_u64(1);
        let mut walker = Walker::new(NoMergePolicy, Duration::ZERO);
        assert_eq!(
            walker.solve(&mut grid, &mut rng, &mut |_| {}),
            Err(WalkError::BudgetExceeded(Duration::ZERO))
        );
        assert_eq!(grid.open_cell_count(), 2);
    }

    #[test]
    fn test_solve_requires_markers() {
        let mut grid = MazeGrid::new(10, 10).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut walker = Walker::new(NoMergePolicy, AMPLE);
        assert_eq!(
            walker.solve(&mut grid, &mut rng, &mut |_| {}),
            Err(WalkError::MissingStart)
        );
        grid.set_start(Coord::new(1, 1)).unwrap();
        assert_eq!(
            walker.solve(&mut grid, &mut rng, &mut |_| {}),
            Err(WalkError::MissingFinish)
        );
    }

    #[test]
    fn test_solve_times_out_when_policy_forbids_everything() {
        let mut grid = setup_grid(Coord::new(2, 2), Coord::new(7, 6));
        let mut rng = StdRng::seed_from_u64(3);
        let mut policy = MockCarvePolicy::new();
        policy.expect_is_legal().returning(|_, _, _| false);
        let budget = Duration::from_millis(20);
        let mut walker = Walker::new(policy, budget);

        let result = walker.solve(&mut grid, &mut rng, &mut |_| {});

        assert_eq!(result, Err(WalkError::BudgetExceeded(budget)));
        assert_eq!(grid.open_cell_count(), 2);
    }

    #[test]
    fn test_step_without_position_is_none() {
        let grid = setup_grid(Coord::new(2, 2), Coord::new(7, 6));
        let walker = Walker::new(NoMergePolicy, AMPLE);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(walker.step(&grid, &mut rng), None);
    }

    #[test]
    fn test_backtrack_finds_position_with_legal_step() {
        // Corridor from the start at (1, 4) east to (5, 4), then boxed in at its tip.
        let mut grid = setup_grid(Coord::new(1, 4), Coord::new(8, 1));
        for x in 2..=5 {
            grid.carve(Coord::new(x, 4)).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(11);
        let mut walker = Walker::new(NoMergePolicy, AMPLE);
        walker.current = Some(Coord::new(5, 4));

        let found = walker.backtrack(&grid, &mut rng).unwrap();

        assert!(grid.is_open(found));
        assert!(has_legal_step(&NoMergePolicy, &grid, found));
        assert_eq!(walker.current(), Some(found));
    }

    #[test]
    fn test_backtrack_jumps_when_no_open_neighbor_remains() {
        // The start at (2, 2) is an isolated island; (6, 6) is the only cell with a legal step.
        let island = Coord::new(6, 6);
        let finish = Coord::new(8, 1);
        for seed in 0..20 {
            let mut grid = setup_grid(Coord::new(2, 2), finish);
            grid.carve(island).unwrap();
            let mut policy = MockCarvePolicy::new();
            policy
                .expect_is_legal()
                .returning(move |_, current, candidate| current == island && candidate.is_some());
            let mut rng = StdRng::seed_from_u64(seed);
            let mut walker = Walker::new(policy, AMPLE);
            walker.current = Some(Coord::new(2, 2));

            let found = walker.backtrack(&grid, &mut rng);

            assert_eq!(found, Ok(island), "seed {seed}");
            assert_eq!(walker.current(), Some(island));
            assert_ne!(walker.current(), Some(finish));
        }
    }

    #[test]
    fn test_backtrack_without_position_fails() {
        let grid = setup_grid(Coord::new(2, 2), Coord::new(7, 6));
        let mut rng = StdRng::seed_from_u64(0);
        let mut walker = Walker::new(NoMergePolicy, AMPLE);
        assert_eq!(
            walker.backtrack(&grid, &mut rng),
            Err(WalkError::NoPosition)
        );
    }

    #[test]
    fn test_form_path_only_extends_existing_structure() {
        let mut grid = setup_grid(Coord::new(4, 4), Coord::new(8, 8));
        let mut rng = StdRng::seed_from_u64(5);
        let mut walker = Walker::new(NoMergePolicy, AMPLE);
        let before = grid.open_cell_count();
        let mut carved_cells = Vec::new();

        let carved = walker
            .form_path(&mut grid, &mut rng, 4, &mut |c| carved_cells.push(c))
            .unwrap();

        assert_eq!(grid.open_cell_count(), before + carved);
        assert_eq!(carved, carved_cells.len());
        // The walk stops only when stuck.
        let end = walker.current().unwrap();
        assert!(!has_legal_step(&NoMergePolicy, &grid, end));
    }

    #[test]
    fn test_form_path_without_open_cells_fails() {
        let mut grid = MazeGrid::new(10, 10).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut walker = Walker::new(NoMergePolicy, AMPLE);
        assert_eq!(
            walker.form_path(&mut grid, &mut rng, 1, &mut |_| {}),
            Err(WalkError::NoOpenCells)
        );
    }

    #[test]
    fn test_form_path_zero_slice_keeps_grid_untouched() {
        let mut grid = setup_grid(Coord::new(4, 4), Coord::new(8, 8));
        let mut rng = StdRng::seed_from_u64(5);
        let mut walker = Walker::new(NoMergePolicy, Duration::ZERO);
        let before = grid.clone();
        assert!(matches!(
            walker.form_path(&mut grid, &mut rng, 3, &mut |_| {}),
            Err(WalkError::BudgetExceeded(_))
        ));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_form_path_timeout_keeps_partial_carving() {
        let mut grid = setup_grid(Coord::new(4, 4), Coord::new(8, 8));
        let mut rng = StdRng::seed_from_u64(2);
        let mut policy = MockCarvePolicy::new();
        policy.expect_is_legal().returning(|_, _, _| {
            std::thread::sleep(Duration::from_millis(1));
            true
        });
        let budget = Duration::from_millis(40);
        let mut walker = Walker::new(policy, budget);
        let before = grid.open_cell_count();
        let mut carved_cells = Vec::new();

        let result = walker.form_path(&mut grid, &mut rng, 1, &mut |c| carved_cells.push(c));

        assert_eq!(result, Err(WalkError::BudgetExceeded(budget)));
        assert!(grid.open_cell_count() > before);
        assert!(!carved_cells.is_empty());
        assert!(carved_cells.iter().all(|&c| grid.is_open(c)));
    }
}
