//! Core library for random maze generation.
//! Defines the grid data model, the carving rules, the random walker and the
//! generation orchestrator. Rendering and input live outside this crate.

use thiserror::Error;

// Module declarations
/// Rectangular cell grid with start/finish/player markers.
pub mod grid;
/// Predicates deciding which cells a walk may carve.
pub mod legality;
/// Settings consumed by generation.
pub mod settings;
/// The randomized walk with backtracking.
pub mod walker;

/// The generation orchestrator.
pub mod generator;

// Re-export core public items

pub use crate::generator::{
    generate, CarveCallback, CarveEvent, GeneratedMaze, GenerationStats, MazeGenerator, WalkPhase,
};
pub use crate::grid::{Cell, Coord, Direction, GridError, MazeGrid, MoveOutcome};
pub use crate::legality::{CarvePolicy, NoMergePolicy};
pub use crate::settings::{GenerationSettings, GenerationSettingsBuilder, SettingsError};
pub use crate::walker::{WalkError, Walker};

/// Errors that can occur while generating a maze.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MazeError {
    /// An error related to grid dimensions or coordinate lookup.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),
    /// The generation settings were rejected.
    #[error("Configuration error: {0}")]
    Settings(#[from] SettingsError),
    /// A walk failed in a way retrying cannot fix.
    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),
    /// No cell can host the finish (every non-start cell is a corner).
    #[error("No valid finish cell in a {nrows}x{ncols} grid")]
    NoFinishCandidate {
        /// Grid row count.
        nrows: usize,
        /// Grid column count.
        ncols: usize,
    },
    /// Every solve attempt ran out of time.
    #[error("Maze generation failed after {attempts} solve attempt(s)")]
    GenerationFailed {
        /// Number of attempts made.
        attempts: u32,
    },
}
