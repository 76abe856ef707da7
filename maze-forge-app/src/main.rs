//! # Maze Forge Application (Binary)
//!
//! Main executable entry point.

fn main() -> anyhow::Result<()> {
    maze_forge_app::main()
}
