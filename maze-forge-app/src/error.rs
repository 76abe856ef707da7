use maze_core::MazeError;
use thiserror::Error;

/// Errors surfaced by the command line application.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Maze Generation Error: {0}")]
    Maze(#[from] MazeError),

    #[error("Visualization Error: {0}")]
    Visualization(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
