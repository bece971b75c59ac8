//! Fighter entity and animation state machine

use crate::ws::protocol::{AnimationState, CharacterId, FighterSide};

use super::physics::{Arena, Rect};
use super::{MoveDir, Vec2};

/// Bounding box dimensions, fixed per fighter
pub const FIGHTER_WIDTH: f32 = 50.0;
pub const FIGHTER_HEIGHT: f32 = 150.0;

/// Horizontal speed while a directional key is held
pub const RUN_SPEED: f32 = 5.0;
/// Vertical impulse applied on jump
pub const JUMP_VELOCITY: f32 = -15.0;

/// Ticks each animation frame is held before advancing
pub const FRAME_HOLD: u32 = 5;
/// Frame of the attack animation at which the hit is evaluated
pub const ATTACK_HIT_FRAME: u32 = 4;
/// Post-attack recovery window, in ticks
pub const ATTACK_RECOVERY_TICKS: u32 = 18;

/// Starting health at the top of a round
pub const MAX_HEALTH: i32 = 100;

/// Attack reach rectangle, offset from the fighter's body. The offset sign
/// differs per side so the box projects toward the opponent.
#[derive(Debug, Clone, Copy)]
pub struct AttackBox {
    pub offset: Vec2,
    pub width: f32,
    pub height: f32,
}

impl AttackBox {
    pub fn for_side(side: FighterSide) -> Self {
        let offset = match side {
            FighterSide::PlayerOne => Vec2::new(50.0, 0.0),
            FighterSide::PlayerTwo => Vec2::new(-100.0, 0.0),
        };
        Self {
            offset,
            width: 100.0,
            height: 50.0,
        }
    }
}

/// Number of frames in each animation strip
pub fn frames_max(animation: AnimationState) -> u32 {
    match animation {
        AnimationState::Idle => 8,
        AnimationState::Run => 8,
        AnimationState::Jump => 3,
        AnimationState::Attack => 6,
        AnimationState::TakeDamage => 4,
    }
}

/// A fighter in the arena
#[derive(Debug, Clone)]
pub struct Fighter {
    pub side: FighterSide,
    pub character: CharacterId,

    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,

    pub health: i32,
    pub dead: bool,

    pub is_jumping: bool,
    pub is_attacking: bool,
    pub attack_recovery: bool,
    recovery_ticks: u32,

    pub attack_box: AttackBox,

    /// Most recently pressed directional key; gates run vs idle selection
    pub last_direction: Option<MoveDir>,

    pub animation: AnimationState,
    pub frame: u32,
    frame_tick: u32,
}

impl Fighter {
    pub fn new(side: FighterSide, character: CharacterId, arena: &Arena) -> Self {
        Self {
            side,
            character,
            position: Vec2::new(Self::start_x(side), arena.ground_y - FIGHTER_HEIGHT),
            velocity: Vec2::new(0.0, 0.0),
            width: FIGHTER_WIDTH,
            height: FIGHTER_HEIGHT,
            health: MAX_HEALTH,
            dead: false,
            is_jumping: false,
            is_attacking: false,
            attack_recovery: false,
            recovery_ticks: 0,
            attack_box: AttackBox::for_side(side),
            last_direction: None,
            animation: AnimationState::Idle,
            frame: 0,
            frame_tick: 0,
        }
    }

    fn start_x(side: FighterSide) -> f32 {
        match side {
            FighterSide::PlayerOne => 200.0,
            FighterSide::PlayerTwo => 600.0,
        }
    }

    /// Body rectangle in world space
    pub fn body_rect(&self) -> Rect {
        Rect {
            x: self.position.x,
            y: self.position.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Attack box rectangle in world space, derived from the current
    /// position every time it is asked for
    pub fn attack_box_rect(&self) -> Rect {
        Rect {
            x: self.position.x + self.attack_box.offset.x,
            y: self.position.y + self.attack_box.offset.y,
            width: self.attack_box.width,
            height: self.attack_box.height,
        }
    }

    /// Whether the current animation is on its final frame
    pub fn on_last_frame(&self) -> bool {
        self.frame == frames_max(self.animation) - 1
    }

    /// Request a locomotion-driven animation switch. Rejected (no-op,
    /// returns false) while an attack or hit-reaction animation has not
    /// reached its final frame; those must play out.
    pub fn request_animation(&mut self, next: AnimationState) -> bool {
        let locked = matches!(
            self.animation,
            AnimationState::Attack | AnimationState::TakeDamage
        ) && !self.on_last_frame();

        if locked {
            return false;
        }

        self.set_animation(next);
        true
    }

    /// Switch animation unconditionally, bypassing the in-progress lock
    pub fn force_animation(&mut self, next: AnimationState) {
        self.set_animation(next);
    }

    fn set_animation(&mut self, next: AnimationState) {
        if self.animation != next {
            self.animation = next;
            self.frame = 0;
        }
    }

    /// Begin an attack. No-op while one is already in progress.
    pub fn attack(&mut self) {
        if self.is_attacking {
            return;
        }

        self.is_attacking = true;
        self.force_animation(AnimationState::Attack);
    }

    /// End the current attack (hit landed or animation completed) and open
    /// the recovery window
    pub fn end_attack(&mut self) {
        self.is_attacking = false;
        self.attack_recovery = true;
        self.recovery_ticks = ATTACK_RECOVERY_TICKS;
    }

    /// Count down the post-attack recovery window
    pub fn tick_recovery(&mut self) {
        if self.attack_recovery {
            self.recovery_ticks = self.recovery_ticks.saturating_sub(1);
            if self.recovery_ticks == 0 {
                self.attack_recovery = false;
            }
        }
    }

    /// Apply damage, saturating at zero, and force the hit reaction
    pub fn take_hit(&mut self, damage: i32) {
        self.health = (self.health - damage).max(0);
        if self.health == 0 {
            self.dead = true;
        }
        self.force_animation(AnimationState::TakeDamage);
    }

    /// Jump if grounded
    pub fn try_jump(&mut self) {
        if !self.is_jumping {
            self.velocity.y = JUMP_VELOCITY;
        }
    }

    /// Advance the animation frame counter. Every FRAME_HOLD ticks the
    /// frame index moves forward, wrapping past the last frame.
    pub fn advance_animation(&mut self) {
        if self.dead {
            return;
        }

        self.frame_tick += 1;
        if self.frame_tick % FRAME_HOLD == 0 {
            if self.frame < frames_max(self.animation) - 1 {
                self.frame += 1;
            } else {
                self.frame = 0;
            }
        }
    }

    /// Restore the fighter for a fresh round
    pub fn reset(&mut self, arena: &Arena) {
        self.health = MAX_HEALTH;
        self.dead = false;
        self.position = Vec2::new(Self::start_x(self.side), arena.ground_y - FIGHTER_HEIGHT);
        self.velocity = Vec2::new(0.0, 0.0);
        self.is_jumping = false;
        self.is_attacking = false;
        self.attack_recovery = false;
        self.recovery_ticks = 0;
        self.last_direction = None;
        self.animation = AnimationState::Idle;
        self.frame = 0;
        self.frame_tick = 0;
    }
}
