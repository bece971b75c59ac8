//! Game simulation modules

pub mod ai;
pub mod combo;
pub mod fighter;
pub mod r#match;
pub mod physics;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use r#match::{GameMatch, MatchCmd, MatchHandle, MatchOutcome, MatchPhase, MatchState};

use serde::{Deserialize, Serialize};

/// 2D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A horizontal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDir {
    Left,
    Right,
}
