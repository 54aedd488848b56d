//! Grid snake: a segmented snake on a fixed board, steered with the arrow
//! keys, growing on food and dying on the walls or its own body.
//!
//! - `engine` holds the game state and rules
//! - `surface` defines what the engine draws, scores and sounds into
//! - `term` is the crossterm implementation of those sinks
//! - `game` runs the engine on the terminal at a fixed tick rate

pub mod config;
pub mod engine;
pub mod game;
pub mod input;
pub mod scheduler;
pub mod snake;
pub mod surface;
pub mod term;
