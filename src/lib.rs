//! Falling-block puzzle engine.
//!
//! The library holds the grid state machine and the boundary traits it talks
//! to (clock, score store, render sink). The terminal frontend lives in the
//! binary.

pub mod clock;
pub mod collision;
pub mod color;
pub mod game;
pub mod grid;
pub mod highscore;
pub mod input;
pub mod render;
pub mod rotation;
pub mod scoring;
pub mod shapes;
