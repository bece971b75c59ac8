//! Fighter physics and collision resolution

use super::fighter::Fighter;

/// Arena configuration. Gravity and the ground line belong to the arena,
/// not the fighter.
#[derive(Debug, Clone, Copy)]
pub struct Arena {
    /// Logical canvas width
    pub width: f32,
    /// Logical canvas height
    pub height: f32,
    /// Gravity added to vertical velocity each tick
    pub gravity: f32,
    /// Y coordinate of the ground line
    pub ground_y: f32,
    /// Horizontal friction factor applied while grounded
    pub friction: f32,
}

impl Default for Arena {
    fn default() -> Self {
        let height = 400.0;
        Self {
            width: 800.0,
            height,
            gravity: 0.5,
            ground_y: height - 100.0,
            friction: 0.8,
        }
    }
}

/// Velocity below this snaps to zero when friction is applied
pub const FRICTION_SNAP: f32 = 0.1;

/// Axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Physics system for fighter movement and collision
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Apply gravity and ground collision to a fighter
    pub fn apply_gravity(arena: &Arena, fighter: &mut Fighter) {
        fighter.velocity.y += arena.gravity;

        if fighter.position.y + fighter.height + fighter.velocity.y >= arena.ground_y {
            fighter.velocity.y = 0.0;
            fighter.position.y = arena.ground_y - fighter.height;
            fighter.is_jumping = false;
        } else {
            fighter.position.y += fighter.velocity.y;
            fighter.is_jumping = true;
        }
    }

    /// Apply horizontal movement, friction, and screen boundaries
    pub fn apply_movement(arena: &Arena, fighter: &mut Fighter) {
        fighter.position.x += fighter.velocity.x;

        // Friction only while on the ground
        if !fighter.is_jumping && fighter.velocity.x.abs() > 0.0 {
            fighter.velocity.x *= arena.friction;

            if fighter.velocity.x.abs() < FRICTION_SNAP {
                fighter.velocity.x = 0.0;
            }
        }

        if fighter.position.x < 0.0 {
            fighter.position.x = 0.0;
            fighter.velocity.x = 0.0;
        } else if fighter.position.x + fighter.width > arena.width {
            fighter.position.x = arena.width - fighter.width;
            fighter.velocity.x = 0.0;
        }
    }

    /// Check rectangular overlap between two rectangles. Touching edges do
    /// not count; the test is strict on both axes.
    pub fn rect_overlap(a: &Rect, b: &Rect) -> bool {
        a.x < b.x + b.width
            && a.x + a.width > b.x
            && a.y < b.y + b.height
            && a.y + a.height > b.y
    }

    /// Check whether the attacker's attack box overlaps the defender's body
    pub fn attack_hit(attacker: &Fighter, defender: &Fighter) -> bool {
        Self::rect_overlap(&attacker.attack_box_rect(), &defender.body_rect())
    }

    /// Apply a knockback impulse. `direction` is -1 (left) or 1 (right).
    pub fn knockback(fighter: &mut Fighter, direction: f32, force: f32) {
        fighter.velocity.x = direction * force;
        fighter.velocity.y = -force / 2.0;
    }

    /// Horizontal distance between two fighters' centers
    pub fn distance_between(a: &Fighter, b: &Fighter) -> f32 {
        (Self::center_x(a) - Self::center_x(b)).abs()
    }

    /// Direction `a` must face to look at `b`: 1 for right, -1 for left
    pub fn facing_direction(a: &Fighter, b: &Fighter) -> f32 {
        if Self::center_x(a) < Self::center_x(b) {
            1.0
        } else {
            -1.0
        }
    }

    /// Whether two fighters are within `range` of each other
    pub fn in_attack_range(a: &Fighter, b: &Fighter, range: f32) -> bool {
        Self::distance_between(a, b) <= range
    }

    fn center_x(fighter: &Fighter) -> f32 {
        fighter.position.x + fighter.width / 2.0
    }
}
