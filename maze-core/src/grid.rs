//! Rectangular maze grid.
//!
//! Cells are stored in a dense row-major array and addressed by [`Coord`].
//! Adjacency is derived from coordinate arithmetic, so the topology never
//! changes after construction; only wall state and the start/finish/player
//! markers mutate.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A cell position. `x` is the column (leftmost is zero), `y` is the row (topmost is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

impl Coord {
    /// Creates a new coordinate.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Towards row zero.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column zero.
    Left,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// All directions, in the order neighbors are examined.
    pub const ALL: [Self; 4] = [Self::Left, Self::Up, Self::Right, Self::Down];

    /// The direction pointing back the way this one came.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// A single maze cell: either a wall or open path, plus the special markers.
///
/// Markers are read-only here; they are set through [`MazeGrid`] so the grid
/// can keep at most one holder of each.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    coord: Coord,
    is_wall: bool,
    is_start: bool,
    is_finish: bool,
    has_player: bool,
}

impl Cell {
    const fn new(coord: Coord) -> Self {
        Self {
            coord,
            is_wall: true,
            is_start: false,
            is_finish: false,
            has_player: false,
        }
    }

    /// Position of this cell.
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// Column index.
    pub const fn x(&self) -> usize {
        self.coord.x
    }

    /// Row index.
    pub const fn y(&self) -> usize {
        self.coord.y
    }

    /// True while the cell is uncarved.
    pub const fn is_wall(&self) -> bool {
        self.is_wall
    }

    /// True when the cell has been carved.
    pub const fn is_open(&self) -> bool {
        !self.is_wall
    }

    /// True on the start cell.
    pub const fn is_start(&self) -> bool {
        self.is_start
    }

    /// True on the finish cell.
    pub const fn is_finish(&self) -> bool {
        self.is_finish
    }

    /// True where the player stands.
    pub const fn has_player(&self) -> bool {
        self.has_player
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Wall: {}; Player: {}; Start: {}; Finish: {}",
            self.coord, self.is_wall, self.has_player, self.is_start, self.is_finish
        )
    }
}

/// Errors raised by grid construction and coordinate lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Both dimensions must be at least one.
    #[error("Grid dimensions must be positive, got {nrows} rows x {ncols} columns")]
    InvalidDimensions {
        /// Requested row count.
        nrows: usize,
        /// Requested column count.
        ncols: usize,
    },
    /// The coordinate does not name a cell of this grid.
    #[error("Coordinate ({x}, {y}) is outside the {ncols}x{nrows} grid")]
    OutOfBounds {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
        /// Grid column count.
        ncols: usize,
        /// Grid row count.
        nrows: usize,
    },
    /// A player move was requested before any player was placed.
    #[error("No player has been placed on the grid")]
    NoPlayer,
}

/// Result of [`MazeGrid::move_player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The player moved onto an open cell.
    Moved(Coord),
    /// The move was refused: off the grid or into a wall.
    Blocked,
    /// The player moved onto the finish cell.
    ReachedFinish(Coord),
}

/// The maze: owns every cell and tracks the start, finish, and player cells.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MazeGrid {
    nrows: usize,
    ncols: usize,
    cells: Vec<Cell>,
    start: Option<Coord>,
    finish: Option<Coord>,
    player: Option<Coord>,
}

impl MazeGrid {
    /// Creates a grid of `nrows x ncols` cells, all walls, with no markers set.
    ///
    /// # Errors
    ///
    /// Returns `GridError::InvalidDimensions` if either dimension is zero.
    pub fn new(nrows: usize, ncols: usize) -> Result<Self, GridError> {
        if nrows == 0 || ncols == 0 {
            return Err(GridError::InvalidDimensions { nrows, ncols });
        }
        let cells = (0..nrows)
            .flat_map(|y| (0..ncols).map(move |x| Cell::new(Coord::new(x, y))))
            .collect();
        Ok(Self {
            nrows,
            ncols,
            cells,
            start: None,
            finish: None,
            player: None,
        })
    }

    /// Number of rows.
    pub const fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    pub const fn ncols(&self) -> usize {
        self.ncols
    }

    /// Total number of cells (`nrows * ncols`).
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Every cell, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates over the rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.ncols)
    }

    /// Iterates over every coordinate, row-major.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(Cell::coord)
    }

    /// True if `coord` lies inside the grid.
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.x < self.ncols && coord.y < self.nrows
    }

    /// Flat index of `coord`, or `None` if it lies outside the grid.
    pub(crate) const fn index(&self, coord: Coord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.y * self.ncols + coord.x)
        } else {
            None
        }
    }

    /// Returns the cell at `coord`, or `None` if out of bounds.
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        self.index(coord).and_then(|idx| self.cells.get(idx))
    }

    fn get_mut(&mut self, coord: Coord) -> Result<&mut Cell, GridError> {
        let (ncols, nrows) = (self.ncols, self.nrows);
        self.index(coord)
            .and_then(move |idx| self.cells.get_mut(idx))
            .ok_or(GridError::OutOfBounds {
                x: coord.x,
                y: coord.y,
                ncols,
                nrows,
            })
    }

    /// Returns the cell at column `x`, row `y`.
    ///
    /// # Errors
    ///
    /// Returns `GridError::OutOfBounds` if the coordinate is outside the grid.
    pub fn cell_at(&self, x: usize, y: usize) -> Result<&Cell, GridError> {
        self.get(Coord::new(x, y)).ok_or(GridError::OutOfBounds {
            x,
            y,
            ncols: self.ncols,
            nrows: self.nrows,
        })
    }

    /// True if `coord` is a carved (non-wall) cell. Out-of-bounds coordinates are never open.
    pub fn is_open(&self, coord: Coord) -> bool {
        self.get(coord).is_some_and(Cell::is_open)
    }

    /// True if `coord` lies on the outer boundary of the grid.
    pub const fn is_edge(&self, coord: Coord) -> bool {
        coord.x == 0 || coord.y == 0 || coord.x == self.ncols - 1 || coord.y == self.nrows - 1
    }

    /// True if `coord` lies on two boundary edges at once.
    pub const fn is_corner(&self, coord: Coord) -> bool {
        (coord.x == 0 || coord.x == self.ncols - 1) && (coord.y == 0 || coord.y == self.nrows - 1)
    }

    /// The neighbor of `coord` in `direction`, or `None` past the boundary.
    pub const fn neighbor(&self, coord: Coord, direction: Direction) -> Option<Coord> {
        if !self.contains(coord) {
            return None;
        }
        match direction {
            Direction::Up if coord.y > 0 => Some(Coord::new(coord.x, coord.y - 1)),
            Direction::Down if coord.y + 1 < self.nrows => Some(Coord::new(coord.x, coord.y + 1)),
            Direction::Left if coord.x > 0 => Some(Coord::new(coord.x - 1, coord.y)),
            Direction::Right if coord.x + 1 < self.ncols => Some(Coord::new(coord.x + 1, coord.y)),
            _ => None,
        }
    }

    /// The cell above `coord`, if any.
    pub const fn up(&self, coord: Coord) -> Option<Coord> {
        self.neighbor(coord, Direction::Up)
    }

    /// The cell below `coord`, if any.
    pub const fn down(&self, coord: Coord) -> Option<Coord> {
        self.neighbor(coord, Direction::Down)
    }

    /// The cell left of `coord`, if any.
    pub const fn left(&self, coord: Coord) -> Option<Coord> {
        self.neighbor(coord, Direction::Left)
    }

    /// The cell right of `coord`, if any.
    pub const fn right(&self, coord: Coord) -> Option<Coord> {
        self.neighbor(coord, Direction::Right)
    }

    /// The existing neighbors of `coord` (left, up, right, down), skipping the boundary.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.neighbor(coord, direction))
    }

    /// True if any neighbor of `coord` is the finish cell.
    pub fn is_adjacent_to_finish(&self, coord: Coord) -> bool {
        self.finish
            .is_some_and(|finish| self.neighbors(coord).any(|n| n == finish))
    }

    /// Coordinates of every open cell, row-major.
    pub fn all_open_cells(&self) -> Vec<Coord> {
        self.cells
            .iter()
            .filter(|cell| cell.is_open())
            .map(Cell::coord)
            .collect()
    }

    /// Number of carved cells.
    pub fn open_cell_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_open()).count()
    }

    /// Fraction of cells that are open, in `[0, 1]`.
    pub fn coverage(&self) -> f64 {
        self.open_cell_count() as f64 / self.total_cells() as f64
    }

    /// Turns a wall into open path. Carving is monotonic: there is no way back to wall.
    ///
    /// Returns `true` if the cell was a wall before this call.
    pub fn carve(&mut self, coord: Coord) -> Result<bool, GridError> {
        let cell = self.get_mut(coord)?;
        let was_wall = cell.is_wall;
        cell.is_wall = false;
        Ok(was_wall)
    }

    /// Coordinate of the start cell.
    pub const fn start(&self) -> Option<Coord> {
        self.start
    }

    /// Coordinate of the finish cell.
    pub const fn finish(&self) -> Option<Coord> {
        self.finish
    }

    /// Coordinate of the player.
    pub const fn player(&self) -> Option<Coord> {
        self.player
    }

    /// The start cell, once placed.
    pub fn start_cell(&self) -> Option<&Cell> {
        self.start.and_then(|coord| self.get(coord))
    }

    /// The finish cell, once placed.
    pub fn finish_cell(&self) -> Option<&Cell> {
        self.finish.and_then(|coord| self.get(coord))
    }

    /// The cell holding the player, once placed.
    pub fn player_cell(&self) -> Option<&Cell> {
        self.player.and_then(|coord| self.get(coord))
    }

    /// Marks `coord` as the start, clearing the previous start cell if any.
    pub fn set_start(&mut self, coord: Coord) -> Result<(), GridError> {
        self.get_mut(coord)?;
        if let Some(previous) = self.start.take() {
            self.get_mut(previous)?.is_start = false;
        }
        self.get_mut(coord)?.is_start = true;
        self.start = Some(coord);
        Ok(())
    }

    /// Marks `coord` as the finish, clearing the previous finish cell if any.
    pub fn set_finish(&mut self, coord: Coord) -> Result<(), GridError> {
        self.get_mut(coord)?;
        if let Some(previous) = self.finish.take() {
            self.get_mut(previous)?.is_finish = false;
        }
        self.get_mut(coord)?.is_finish = true;
        self.finish = Some(coord);
        Ok(())
    }

    /// Places the player on `coord`, removing it from its previous cell if any.
    pub fn set_player(&mut self, coord: Coord) -> Result<(), GridError> {
        self.get_mut(coord)?;
        if let Some(previous) = self.player.take() {
            self.get_mut(previous)?.has_player = false;
        }
        self.get_mut(coord)?.has_player = true;
        self.player = Some(coord);
        Ok(())
    }

    /// Moves the player one cell in `direction` if the target is open.
    ///
    /// # Errors
    ///
    /// Returns `GridError::NoPlayer` if no player has been placed.
    pub fn move_player(&mut self, direction: Direction) -> Result<MoveOutcome, GridError> {
        let from = self.player.ok_or(GridError::NoPlayer)?;
        let Some(target) = self.neighbor(from, direction).filter(|&c| self.is_open(c)) else {
            return Ok(MoveOutcome::Blocked);
        };
        self.set_player(target)?;
        if self.finish == Some(target) {
            Ok(MoveOutcome::ReachedFinish(target))
        } else {
            Ok(MoveOutcome::Moved(target))
        }
    }
}
