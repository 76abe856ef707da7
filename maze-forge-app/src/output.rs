use crate::config::OutputFormat;
use anyhow::{Context, Result};
use maze_core::{Cell, GeneratedMaze, MazeGrid};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub const WALL_GLYPH: char = '#';
pub const OPEN_GLYPH: char = '.';
pub const START_GLYPH: char = 'S';
pub const FINISH_GLYPH: char = 'F';
pub const PLAYER_GLYPH: char = 'P';

/// Character used for `cell` in the text format.
///
/// Finish wins over start, start over player.
pub const fn glyph(cell: &Cell) -> char {
    if cell.is_finish() {
        FINISH_GLYPH
    } else if cell.is_start() {
        START_GLYPH
    } else if cell.has_player() {
        PLAYER_GLYPH
    } else if cell.is_wall() {
        WALL_GLYPH
    } else {
        OPEN_GLYPH
    }
}

/// Renders the grid as text: one line per row, one character per cell.
pub fn render_ascii(grid: &MazeGrid) -> String {
    let mut out = String::with_capacity(grid.total_cells() + grid.nrows());
    for row in grid.rows() {
        out.extend(row.iter().map(glyph));
        out.push('\n');
    }
    out
}

/// Saves the maze to a file.
///
/// Text format: see [`render_ascii`]. JSON format: the full grid and the
/// generation statistics.
pub fn save_maze_to_file(maze: &GeneratedMaze, output_path: &Path, format: OutputFormat) -> Result<()> {
    log::info!("Attempting to save maze to {:?}...", output_path);

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {:?}", output_path))?;
    let mut writer = io::BufWriter::new(file);

    match format {
        OutputFormat::Text => writer
            .write_all(render_ascii(&maze.grid).as_bytes())
            .with_context(|| format!("Failed to write maze to {:?}", output_path))?,
        OutputFormat::Json => serde_json::to_writer_pretty(&mut writer, maze)
            .with_context(|| format!("Failed to serialize maze to {:?}", output_path))?,
    }

    writer
        .flush()
        .context("Failed to flush writer for output file")?;
    log::info!("Successfully saved maze to {:?}", output_path);

    Ok(())
}
