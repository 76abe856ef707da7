use crate::output;
use colored::{Color, Colorize};
use maze_core::{Cell, MazeGrid};
use std::io::{self, Stdout, Write};

/// Trait for types that can show a `MazeGrid` to the user.
pub trait Visualizer {
    /// Displays the current state of the grid.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the display was successful.
    /// * `Err(anyhow::Error)` if writing the frame failed.
    fn display_state(&mut self, grid: &MazeGrid) -> Result<(), anyhow::Error>;
}

/// Colors used by the terminal view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub wall: (u8, u8, u8),
    pub path: (u8, u8, u8),
    pub goal: (u8, u8, u8),
    pub player: (u8, u8, u8),
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall: (20, 20, 20),
            path: (235, 235, 235),
            goal: (0, 255, 0),
            player: (220, 40, 40),
        }
    }
}

impl Palette {
    /// Background color for `cell`. Start and player share the player color.
    pub const fn color_for(&self, cell: &Cell) -> (u8, u8, u8) {
        if cell.is_finish() {
            self.goal
        } else if cell.is_start() || cell.has_player() {
            self.player
        } else if cell.is_wall() {
            self.wall
        } else {
            self.path
        }
    }
}

/// Prints the maze to a terminal, two columns per cell so blocks look square.
pub struct TerminalVisualizer<W: Write> {
    out: W,
    palette: Palette,
    use_color: bool,
}

impl TerminalVisualizer<Stdout> {
    /// Creates a visualizer writing to stdout.
    pub fn stdout(use_color: bool) -> Self {
        Self::new(io::stdout(), Palette::default(), use_color)
    }
}

impl<W: Write> TerminalVisualizer<W> {
    /// Creates a visualizer writing frames to `out`.
    pub fn new(out: W, palette: Palette, use_color: bool) -> Self {
        Self {
            out,
            palette,
            use_color,
        }
    }

    /// Consumes the visualizer and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_colored(&self, grid: &MazeGrid) -> String {
        let mut frame = String::new();
        for row in grid.rows() {
            for cell in row {
                let (r, g, b) = self.palette.color_for(cell);
                let block = "  ".on_color(Color::TrueColor { r, g, b });
                frame.push_str(&block.to_string());
            }
            frame.push('\n');
        }
        frame
    }
}

impl<W: Write> Visualizer for TerminalVisualizer<W> {
    fn display_state(&mut self, grid: &MazeGrid) -> Result<(), anyhow::Error> {
        let frame = if self.use_color {
            self.render_colored(grid)
        } else {
            output::render_ascii(grid)
        };
        writeln!(
            self.out,
            "--- Maze {}x{} ({:.1}% open) ---",
            grid.nrows(),
            grid.ncols(),
            grid.coverage() * 100.0
        )?;
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
