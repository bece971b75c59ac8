//! Combo detection over a sliding window of recent inputs

use std::collections::VecDeque;

use crate::ws::protocol::{FighterSide, InputKey};

/// Inputs older than this are dropped from the history
pub const COMBO_WINDOW_MS: u64 = 2000;

/// A registered combo pattern
#[derive(Debug, Clone, Copy)]
pub struct ComboPattern {
    pub id: &'static str,
    pub inputs: &'static [InputKey],
}

/// Registered patterns, checked in this order; the first suffix match wins
pub const COMBO_PATTERNS: &[ComboPattern] = &[
    ComboPattern {
        id: "triple_combo",
        inputs: &[InputKey::Punch, InputKey::Punch, InputKey::Kick],
    },
    ComboPattern {
        id: "special_move_1",
        inputs: &[InputKey::Down, InputKey::Right, InputKey::Punch],
    },
];

/// Tracks each fighter's recent inputs and matches them against the
/// registered combo patterns
#[derive(Debug, Default)]
pub struct ComboDetector {
    history: [VecDeque<(InputKey, u64)>; 2],
}

impl ComboDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an input and prune entries that fell out of the window
    pub fn record(&mut self, side: FighterSide, input: InputKey, now_ms: u64) {
        let history = &mut self.history[side.index()];
        history.push_back((input, now_ms));

        while let Some(&(_, t)) = history.front() {
            if now_ms.saturating_sub(t) >= COMBO_WINDOW_MS {
                history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Check whether the fighter's recent inputs end with a registered
    /// pattern
    pub fn detect(&self, side: FighterSide) -> Option<&'static str> {
        let history = &self.history[side.index()];

        COMBO_PATTERNS
            .iter()
            .find(|pattern| Self::ends_with(history, pattern.inputs))
            .map(|pattern| pattern.id)
    }

    /// Drop all recorded inputs (round reset)
    pub fn clear(&mut self) {
        for history in &mut self.history {
            history.clear();
        }
    }

    fn ends_with(history: &VecDeque<(InputKey, u64)>, pattern: &[InputKey]) -> bool {
        if history.len() < pattern.len() {
            return false;
        }

        let start = history.len() - pattern.len();
        history
            .iter()
            .skip(start)
            .zip(pattern)
            .all(|(&(input, _), &expected)| input == expected)
    }
}
