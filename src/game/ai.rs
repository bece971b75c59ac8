//! AI move planner for the computer-controlled fighter
//!
//! A pure query: nothing here touches fighter state. The caller applies the
//! returned intent to velocity and attack triggers.

use rand::Rng;

use crate::ws::protocol::Difficulty;

use super::fighter::Fighter;
use super::physics::PhysicsSystem;

/// Intended moves for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlannedMove {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub attack: bool,
}

/// Plan the AI fighter's next move from distance and facing. Overlapping
/// conditions evaluate top to bottom; later clauses may overwrite earlier
/// attack decisions (the hard tier's counter-attack does).
pub fn plan_move<R: Rng>(
    ai: &Fighter,
    opponent: &Fighter,
    difficulty: Difficulty,
    rng: &mut R,
) -> PlannedMove {
    let distance = PhysicsSystem::distance_between(ai, opponent);
    let facing = PhysicsSystem::facing_direction(ai, opponent);
    let mut moves = PlannedMove::default();

    match difficulty {
        Difficulty::Easy => {
            // Basic movement and occasional attacks
            if distance > 150.0 {
                moves.left = facing == -1.0;
                moves.right = facing == 1.0;
            }
            moves.jump = rng.gen::<f32>() < 0.01 && !ai.is_jumping;
            moves.attack = distance < 100.0 && rng.gen::<f32>() < 0.1;
        }

        Difficulty::Medium => {
            // Close in from afar, back off when crowded
            if distance > 120.0 {
                moves.left = facing == -1.0;
                moves.right = facing == 1.0;
            } else if distance < 80.0 {
                moves.left = facing == 1.0;
                moves.right = facing == -1.0;
            }

            moves.jump = (rng.gen::<f32>() < 0.03 && !ai.is_jumping)
                || (opponent.is_attacking && rng.gen::<f32>() < 0.4 && !ai.is_jumping);

            moves.attack = distance < 120.0 && distance > 50.0 && rng.gen::<f32>() < 0.2;
        }

        Difficulty::Hard => {
            if distance > 140.0 {
                // Chase aggressively
                moves.left = facing == -1.0;
                moves.right = facing == 1.0;
            } else if distance < 70.0 && opponent.is_attacking {
                // Retreat and jump out when the opponent swings up close
                moves.left = facing == 1.0;
                moves.right = facing == -1.0;
                moves.jump = rng.gen::<f32>() < 0.6 && !ai.is_jumping;
            } else if distance > 80.0 && distance < 140.0 {
                // Hold optimal attack range
                moves.left = facing == -1.0 && distance > 110.0;
                moves.right = facing == 1.0 && distance > 110.0;
            }

            moves.jump = (rng.gen::<f32>() < 0.05 && !ai.is_jumping)
                || (opponent.is_attacking && rng.gen::<f32>() < 0.7 && !ai.is_jumping);

            moves.attack = (distance < 130.0 && !opponent.is_attacking && rng.gen::<f32>() < 0.3)
                || (opponent.is_jumping && rng.gen::<f32>() < 0.4);

            // Punish whiffed attacks
            if opponent.attack_recovery && distance < 120.0 {
                moves.attack = rng.gen::<f32>() < 0.8;
            }
        }
    }

    moves
}
