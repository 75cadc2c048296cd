//! Implementation of chess game, its rules and specifics.

pub mod attacks;
pub mod core;
pub mod game;
pub mod movegen;
pub mod position;
