//! Rules deciding which wall cells a walk may carve into.
use crate::grid::{Coord, Direction, MazeGrid};
use log::trace;

/// Trait defining the predicate a walk consults before carving a cell.
///
/// Implementations must be pure: the answer depends only on the grid state,
/// the walker's current position and the candidate.
#[cfg_attr(test, mockall::automock)]
pub trait CarvePolicy {
    /// Returns true if `candidate` may be carved by a walk standing on `current`.
    ///
    /// `candidate` is `None` when the step would leave the grid.
    fn is_legal(&self, grid: &MazeGrid, current: Coord, candidate: Option<Coord>) -> bool;
}

/// The standard carving rules.
///
/// A candidate is legal only if it exists, is a wall, is not on the grid
/// boundary (unless the walk is stepping off a start cell that sits in a
/// corner), and would not join two separate open regions. Cells touching the
/// finish are always accepted so a walk can reach the goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoMergePolicy;

impl NoMergePolicy {
    /// Creates the policy.
    pub const fn new() -> Self {
        Self
    }
}

impl CarvePolicy for NoMergePolicy {
    fn is_legal(&self, grid: &MazeGrid, current: Coord, candidate: Option<Coord>) -> bool {
        let Some(node) = candidate else {
            return false;
        };

        if grid.is_edge(node) {
            let from_corner_start =
                grid.start() == Some(current) && grid.is_corner(current);
            if !from_corner_start {
                trace!("{node} is illegal: edge");
                return false;
            }
        }

        match grid.get(node) {
            Some(cell) if cell.is_wall() => {}
            _ => {
                trace!("{node} is illegal: not a wall");
                return false;
            }
        }

        if grid.is_adjacent_to_finish(node) {
            return true;
        }

        // The only open neighbor allowed is the cell we are carving from.
        let merges = grid
            .neighbors(node)
            .any(|n| n != current && grid.is_open(n));
        if merges {
            trace!("{node} is illegal: would merge with an existing path");
        }
        !merges
    }
}

/// Coordinates a walk on `current` may carve next, in [`Direction::ALL`] order.
pub fn legal_steps<P: CarvePolicy + ?Sized>(
    policy: &P,
    grid: &MazeGrid,
    current: Coord,
) -> Vec<Coord> {
    Direction::ALL
        .into_iter()
        .map(|direction| grid.neighbor(current, direction))
        .filter(|&candidate| policy.is_legal(grid, current, candidate))
        .flatten()
        .collect()
}

/// True if a walk on `current` has at least one legal step.
pub fn has_legal_step<P: CarvePolicy + ?Sized>(policy: &P, grid: &MazeGrid, current: Coord) -> bool {
    Direction::ALL
        .into_iter()
        .any(|direction| policy.is_legal(grid, current, grid.neighbor(current, direction)))
}
