//! Snapshot building for client rendering

use crate::ws::protocol::{FighterSnapshot, GameEvent, ServerMsg};

use super::fighter::Fighter;

/// Builds snapshots for network transmission
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval,
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Build a snapshot message
    pub fn build(
        &mut self,
        tick: u64,
        timer: u32,
        fighters: &[Fighter; 2],
        events: Vec<GameEvent>,
    ) -> ServerMsg {
        let fighters = fighters
            .iter()
            .map(|f| FighterSnapshot {
                side: f.side,
                character: f.character,
                x: f.position.x,
                y: f.position.y,
                vel_x: f.velocity.x,
                vel_y: f.velocity.y,
                health: f.health.max(0),
                animation: f.animation,
                frame: f.frame,
                is_attacking: f.is_attacking,
                is_jumping: f.is_jumping,
                dead: f.dead,
            })
            .collect();

        ServerMsg::Snapshot {
            tick,
            timer,
            fighters,
            events,
        }
    }
}
