//! Setup module for the Maze Forge application.
//!
//! Contains the execution modes (single maze or benchmark).

pub mod execution;
