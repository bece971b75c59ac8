//! Game core tests: physics, fighters, AI planning, combos, and the match
//! step function.

use rand::rngs::mock::StepRng;
use uuid::Uuid;

use crate::ws::protocol::{
    AnimationState, CharacterId, Difficulty, FighterSide, InputKey, MatchMode, Verdict,
};

use super::ai::plan_move;
use super::combo::ComboDetector;
use super::fighter::{Fighter, ATTACK_HIT_FRAME, FIGHTER_HEIGHT, MAX_HEALTH, RUN_SPEED};
use super::physics::{Arena, PhysicsSystem, Rect};
use super::r#match::{MatchPhase, MatchState, DAMAGE_PER_HIT, ROUND_SECONDS};

fn arena() -> Arena {
    Arena::default()
}

fn fighter(side: FighterSide) -> Fighter {
    Fighter::new(side, CharacterId::Blaze, &arena())
}

/// A human-vs-human match so the AI planner stays out of the way
fn vs_human_match() -> MatchState {
    let mut state = MatchState::new(Uuid::new_v4(), 7, CharacterId::Blaze, MatchMode::VsHuman);
    state.start();
    state
}

/// Low rolls: every probability check passes
fn low_rng() -> StepRng {
    StepRng::new(0, 0)
}

/// High rolls: every probability check fails
fn high_rng() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

/// Put the fighters `distance` apart (player two to the right)
fn place_apart(ai: &mut Fighter, opponent: &mut Fighter, distance: f32) {
    opponent.position.x = 100.0;
    ai.position.x = 100.0 + distance;
}

// -----------------------------------------------------------------------------
// Physics tests
// -----------------------------------------------------------------------------

#[test]
fn test_gravity_clamps_to_ground() {
    let arena = arena();
    let mut f = fighter(FighterSide::PlayerOne);
    f.velocity.y = 5.0;

    PhysicsSystem::apply_gravity(&arena, &mut f);

    assert_eq!(f.velocity.y, 0.0);
    assert_eq!(f.position.y, arena.ground_y - FIGHTER_HEIGHT);
    assert!(!f.is_jumping);
}

#[test]
fn test_gravity_accelerates_airborne_fighter() {
    let arena = arena();
    let mut f = fighter(FighterSide::PlayerOne);
    f.position.y = 50.0;
    f.velocity.y = 0.0;

    PhysicsSystem::apply_gravity(&arena, &mut f);

    assert_eq!(f.velocity.y, arena.gravity);
    assert_eq!(f.position.y, 50.0 + arena.gravity);
    assert!(f.is_jumping);
}

#[test]
fn test_friction_converges_to_zero() {
    let arena = arena();
    let mut f = fighter(FighterSide::PlayerOne);
    f.velocity.x = 5.0;

    let mut steps = 0;
    while f.velocity.x != 0.0 && steps < 100 {
        PhysicsSystem::apply_movement(&arena, &mut f);
        steps += 1;
    }

    assert_eq!(f.velocity.x, 0.0);
    // 5.0 * 0.8^n drops below the 0.1 snap threshold within 18 steps
    assert!(steps <= 20, "took {steps} steps");
}

#[test]
fn test_boundary_clamp_right_zeroes_velocity() {
    let arena = arena();
    let mut f = fighter(FighterSide::PlayerOne);
    f.position.x = 745.0;
    f.velocity.x = 10.0;
    f.is_jumping = true; // skip friction for an exact check

    PhysicsSystem::apply_movement(&arena, &mut f);

    assert_eq!(f.position.x, arena.width - f.width);
    assert_eq!(f.velocity.x, 0.0);
}

#[test]
fn test_boundary_clamp_left_zeroes_velocity() {
    let arena = arena();
    let mut f = fighter(FighterSide::PlayerOne);
    f.position.x = 3.0;
    f.velocity.x = -10.0;
    f.is_jumping = true;

    PhysicsSystem::apply_movement(&arena, &mut f);

    assert_eq!(f.position.x, 0.0);
    assert_eq!(f.velocity.x, 0.0);
}

#[test]
fn test_rect_overlap_is_strict_at_edges() {
    let a = Rect {
        x: 0.0,
        y: 0.0,
        width: 50.0,
        height: 50.0,
    };
    let touching = Rect {
        x: 50.0,
        y: 0.0,
        width: 50.0,
        height: 50.0,
    };
    let overlapping = Rect {
        x: 49.0,
        y: 0.0,
        width: 50.0,
        height: 50.0,
    };

    assert!(!PhysicsSystem::rect_overlap(&a, &touching));
    assert!(PhysicsSystem::rect_overlap(&a, &overlapping));
}

#[test]
fn test_attack_box_projects_toward_opponent() {
    let arena = arena();
    let p1 = Fighter::new(FighterSide::PlayerOne, CharacterId::Blaze, &arena);
    let p2 = Fighter::new(FighterSide::PlayerTwo, CharacterId::Blaze, &arena);

    // Player one's box extends right of the body, player two's left
    assert!(p1.attack_box_rect().x > p1.position.x);
    assert!(p2.attack_box_rect().x < p2.position.x);
}

#[test]
fn test_knockback_impulse() {
    let arena = arena();
    let mut f = fighter(FighterSide::PlayerOne);

    PhysicsSystem::knockback(&mut f, -1.0, 8.0);

    assert_eq!(f.velocity.x, -8.0);
    assert_eq!(f.velocity.y, -4.0);
}

#[test]
fn test_distance_and_facing() {
    let arena = arena();
    let p1 = Fighter::new(FighterSide::PlayerOne, CharacterId::Blaze, &arena);
    let p2 = Fighter::new(FighterSide::PlayerTwo, CharacterId::Blaze, &arena);

    assert_eq!(PhysicsSystem::distance_between(&p1, &p2), 400.0);
    assert_eq!(PhysicsSystem::facing_direction(&p1, &p2), 1.0);
    assert_eq!(PhysicsSystem::facing_direction(&p2, &p1), -1.0);
    assert!(PhysicsSystem::in_attack_range(&p1, &p2, 400.0));
    assert!(!PhysicsSystem::in_attack_range(&p1, &p2, 399.0));
}

// -----------------------------------------------------------------------------
// Fighter animation machine tests
// -----------------------------------------------------------------------------

#[test]
fn test_attack_animation_locks_locomotion() {
    let mut f = fighter(FighterSide::PlayerOne);
    f.attack();
    f.frame = 2;

    assert!(!f.request_animation(AnimationState::Idle));
    assert!(!f.request_animation(AnimationState::Run));
    assert_eq!(f.animation, AnimationState::Attack);

    // Final frame releases the lock
    f.frame = 5;
    assert!(f.request_animation(AnimationState::Idle));
    assert_eq!(f.animation, AnimationState::Idle);
    assert_eq!(f.frame, 0);
}

#[test]
fn test_take_damage_animation_locks_locomotion() {
    let mut f = fighter(FighterSide::PlayerOne);
    f.take_hit(10);

    assert_eq!(f.animation, AnimationState::TakeDamage);
    assert!(!f.request_animation(AnimationState::Run));

    f.frame = 3;
    assert!(f.request_animation(AnimationState::Run));
}

#[test]
fn test_attack_is_noop_while_attacking() {
    let mut f = fighter(FighterSide::PlayerOne);
    f.attack();
    f.frame = 3;

    f.attack();

    // A second trigger must not restart the animation
    assert_eq!(f.frame, 3);
    assert!(f.is_attacking);
}

#[test]
fn test_frame_advance_holds_and_wraps() {
    let mut f = fighter(FighterSide::PlayerOne);
    assert_eq!(f.animation, AnimationState::Idle);

    // One frame advance per 5 ticks
    for _ in 0..5 {
        f.advance_animation();
    }
    assert_eq!(f.frame, 1);

    // 8-frame idle strip wraps back to 0 after frame 7
    for _ in 0..35 {
        f.advance_animation();
    }
    assert_eq!(f.frame, 0);
}

#[test]
fn test_take_hit_saturates_at_zero() {
    let mut f = fighter(FighterSide::PlayerOne);
    f.health = 5;

    f.take_hit(10);

    assert_eq!(f.health, 0);
    assert!(f.dead);
}

#[test]
fn test_reset_restores_fighter() {
    let arena = arena();
    let mut f = fighter(FighterSide::PlayerTwo);
    f.take_hit(100);
    f.position.x = 10.0;
    f.velocity.x = -3.0;

    f.reset(&arena);

    assert_eq!(f.health, MAX_HEALTH);
    assert!(!f.dead);
    assert_eq!(f.position.x, 600.0);
    assert_eq!(f.velocity.x, 0.0);
    assert_eq!(f.animation, AnimationState::Idle);
    assert_eq!(f.frame, 0);
}

// -----------------------------------------------------------------------------
// AI planner tests
// -----------------------------------------------------------------------------

#[test]
fn test_easy_ai_approaches_from_afar() {
    let arena = arena();
    let mut ai = Fighter::new(FighterSide::PlayerTwo, CharacterId::Blaze, &arena);
    let mut opponent = Fighter::new(FighterSide::PlayerOne, CharacterId::Blaze, &arena);
    place_apart(&mut ai, &mut opponent, 200.0);

    let moves = plan_move(&ai, &opponent, Difficulty::Easy, &mut low_rng());

    // Opponent is to the left, so the AI walks left and never attacks at
    // this range even with guaranteed rolls
    assert!(moves.left);
    assert!(!moves.right);
    assert!(!moves.attack);
}

#[test]
fn test_easy_ai_never_attacks_outside_range() {
    let arena = arena();
    let mut ai = Fighter::new(FighterSide::PlayerTwo, CharacterId::Blaze, &arena);
    let mut opponent = Fighter::new(FighterSide::PlayerOne, CharacterId::Blaze, &arena);
    place_apart(&mut ai, &mut opponent, 100.0);

    let moves = plan_move(&ai, &opponent, Difficulty::Easy, &mut low_rng());

    assert!(!moves.attack);
    assert!(!moves.left && !moves.right);
}

#[test]
fn test_easy_ai_attacks_in_range() {
    let arena = arena();
    let mut ai = Fighter::new(FighterSide::PlayerTwo, CharacterId::Blaze, &arena);
    let mut opponent = Fighter::new(FighterSide::PlayerOne, CharacterId::Blaze, &arena);
    place_apart(&mut ai, &mut opponent, 90.0);

    assert!(plan_move(&ai, &opponent, Difficulty::Easy, &mut low_rng()).attack);
    assert!(!plan_move(&ai, &opponent, Difficulty::Easy, &mut high_rng()).attack);
}

#[test]
fn test_medium_ai_retreats_when_crowded() {
    let arena = arena();
    let mut ai = Fighter::new(FighterSide::PlayerTwo, CharacterId::Blaze, &arena);
    let mut opponent = Fighter::new(FighterSide::PlayerOne, CharacterId::Blaze, &arena);
    place_apart(&mut ai, &mut opponent, 60.0);

    let moves = plan_move(&ai, &opponent, Difficulty::Medium, &mut high_rng());

    // Opponent to the left: retreat means moving right
    assert!(moves.right);
    assert!(!moves.left);
}

#[test]
fn test_hard_ai_punishes_attack_recovery() {
    let arena = arena();
    let mut ai = Fighter::new(FighterSide::PlayerTwo, CharacterId::Blaze, &arena);
    let mut opponent = Fighter::new(FighterSide::PlayerOne, CharacterId::Blaze, &arena);
    place_apart(&mut ai, &mut opponent, 100.0);
    opponent.attack_recovery = true;
    opponent.is_attacking = true;

    // The counter-attack clause overrides the earlier attack decision
    let moves = plan_move(&ai, &opponent, Difficulty::Hard, &mut low_rng());

    assert!(moves.attack);
}

#[test]
fn test_hard_ai_holds_optimal_range() {
    let arena = arena();
    let mut ai = Fighter::new(FighterSide::PlayerTwo, CharacterId::Blaze, &arena);
    let mut opponent = Fighter::new(FighterSide::PlayerOne, CharacterId::Blaze, &arena);
    place_apart(&mut ai, &mut opponent, 100.0);

    let moves = plan_move(&ai, &opponent, Difficulty::Hard, &mut high_rng());

    // Inside 80..140 but under the 110 advance threshold: hold position
    assert!(!moves.left && !moves.right);
}

// -----------------------------------------------------------------------------
// Combo detector tests
// -----------------------------------------------------------------------------

#[test]
fn test_triple_combo_within_window() {
    let mut combos = ComboDetector::new();
    combos.record(FighterSide::PlayerOne, InputKey::Punch, 1000);
    combos.record(FighterSide::PlayerOne, InputKey::Punch, 1500);
    combos.record(FighterSide::PlayerOne, InputKey::Kick, 2000);

    assert_eq!(combos.detect(FighterSide::PlayerOne), Some("triple_combo"));
}

#[test]
fn test_combo_expires_outside_window() {
    let mut combos = ComboDetector::new();
    combos.record(FighterSide::PlayerOne, InputKey::Punch, 1000);
    combos.record(FighterSide::PlayerOne, InputKey::Punch, 2500);
    combos.record(FighterSide::PlayerOne, InputKey::Kick, 3600);

    // The first punch fell out of the 2000ms window
    assert_eq!(combos.detect(FighterSide::PlayerOne), None);
}

#[test]
fn test_special_move_suffix_match() {
    let mut combos = ComboDetector::new();
    // Leading noise must not prevent a suffix match
    combos.record(FighterSide::PlayerTwo, InputKey::Left, 100);
    combos.record(FighterSide::PlayerTwo, InputKey::Down, 200);
    combos.record(FighterSide::PlayerTwo, InputKey::Right, 300);
    combos.record(FighterSide::PlayerTwo, InputKey::Punch, 400);

    assert_eq!(
        combos.detect(FighterSide::PlayerTwo),
        Some("special_move_1")
    );
}

#[test]
fn test_combo_histories_are_per_fighter() {
    let mut combos = ComboDetector::new();
    combos.record(FighterSide::PlayerOne, InputKey::Punch, 100);
    combos.record(FighterSide::PlayerOne, InputKey::Punch, 200);
    combos.record(FighterSide::PlayerTwo, InputKey::Kick, 300);

    assert_eq!(combos.detect(FighterSide::PlayerOne), None);
    assert_eq!(combos.detect(FighterSide::PlayerTwo), None);
}

// -----------------------------------------------------------------------------
// Match step tests
// -----------------------------------------------------------------------------

/// Line the attacker's hit frame up with an overlapping defender
fn stage_hit(state: &mut MatchState) {
    state.fighters[0].position.x = 300.0;
    state.fighters[1].position.x = 360.0;
    state.fighters[0].attack();
    state.fighters[0].frame = ATTACK_HIT_FRAME;
}

#[test]
fn test_attack_hits_exactly_once() {
    let mut state = vs_human_match();
    stage_hit(&mut state);

    let events = state.step();

    assert_eq!(state.fighters[1].health, MAX_HEALTH - DAMAGE_PER_HIT);
    assert!(!state.fighters[0].is_attacking);
    assert!(state.fighters[0].attack_recovery);
    assert_eq!(state.fighters[1].animation, AnimationState::TakeDamage);
    assert_eq!(events.len(), 1);

    // The same attack instance cannot land again
    let events = state.step();
    assert_eq!(state.fighters[1].health, MAX_HEALTH - DAMAGE_PER_HIT);
    assert!(events.is_empty());
}

#[test]
fn test_attack_whiff_clears_on_final_frame() {
    let mut state = vs_human_match();
    // Default spawns are 400 apart; the attack cannot connect
    state.fighters[0].attack();
    state.fighters[0].frame = 5;

    state.step();

    assert!(!state.fighters[0].is_attacking);
    assert!(state.fighters[0].attack_recovery);
    assert_eq!(state.fighters[1].health, MAX_HEALTH);
}

#[test]
fn test_knockback_applied_on_hit() {
    let mut state = vs_human_match();
    stage_hit(&mut state);

    state.step();

    // Defender is to the attacker's right and gets shoved further right
    assert!(state.fighters[1].velocity.x > 0.0);
    assert!(state.fighters[1].velocity.y < 0.0);
}

#[test]
fn test_ko_ends_match() {
    let mut state = vs_human_match();
    state.fighters[1].health = DAMAGE_PER_HIT;
    stage_hit(&mut state);

    state.step();

    assert_eq!(state.phase, MatchPhase::Ended);
    assert_eq!(state.winner, Some(Verdict::PlayerOne));
}

#[test]
fn test_winner_by_health_comparison() {
    let mut state = vs_human_match();
    state.fighters[0].health = 60;
    state.fighters[1].health = 40;
    assert_eq!(state.determine_winner(), Verdict::PlayerOne);

    state.fighters[0].health = 50;
    state.fighters[1].health = 50;
    assert_eq!(state.determine_winner(), Verdict::Tie);

    state.fighters[0].health = 0;
    state.fighters[1].health = 30;
    assert_eq!(state.determine_winner(), Verdict::PlayerTwo);
}

#[test]
fn test_double_ko_is_a_tie() {
    let mut state = vs_human_match();
    state.fighters[0].health = 0;
    state.fighters[1].health = 0;

    state.step();

    assert_eq!(state.phase, MatchPhase::Ended);
    assert_eq!(state.winner, Some(Verdict::Tie));
}

#[test]
fn test_timer_expiry_ends_match() {
    let mut state = vs_human_match();
    state.timer = 0;

    state.step();

    assert_eq!(state.phase, MatchPhase::Ended);
    assert_eq!(state.winner, Some(Verdict::Tie));
}

#[test]
fn test_timer_decrements_once_per_second() {
    let mut state = vs_human_match();

    // 62 ticks at 60 TPS cover one simulated second with rounding slack
    for _ in 0..62 {
        state.step();
    }

    assert_eq!(state.timer, ROUND_SECONDS - 1);
}

#[test]
fn test_pause_suspends_simulation_and_timer() {
    let mut state = vs_human_match();
    state.pause();

    for _ in 0..120 {
        state.step();
    }

    assert_eq!(state.phase, MatchPhase::Paused);
    assert_eq!(state.timer, ROUND_SECONDS);
    assert_eq!(state.tick, 0);

    // Resume picks up without a burst of missed time
    state.resume();
    state.step();
    assert_eq!(state.tick, 1);
    assert_eq!(state.timer, ROUND_SECONDS);
}

#[test]
fn test_latest_direction_key_wins() {
    let mut state = vs_human_match();
    state.key_down(FighterSide::PlayerOne, InputKey::Left, 0);
    state.key_down(FighterSide::PlayerOne, InputKey::Right, 10);

    state.step();

    // Both keys held; the most recent press drives the motion
    assert_eq!(state.fighters[0].velocity.x, RUN_SPEED);
    assert_eq!(state.fighters[0].animation, AnimationState::Run);
}

#[test]
fn test_stale_held_key_does_not_move() {
    let mut state = vs_human_match();
    state.key_down(FighterSide::PlayerOne, InputKey::Left, 0);
    state.key_down(FighterSide::PlayerOne, InputKey::Right, 10);
    state.key_up(FighterSide::PlayerOne, InputKey::Right);

    state.step();

    // Left is still held but was not the last direction pressed
    assert_eq!(state.fighters[0].animation, AnimationState::Idle);
}

#[test]
fn test_jump_key_only_from_ground() {
    let mut state = vs_human_match();
    state.key_down(FighterSide::PlayerOne, InputKey::Up, 0);
    assert!(state.fighters[0].velocity.y < 0.0);

    let first_impulse = state.fighters[0].velocity.y;
    state.step();
    state.key_down(FighterSide::PlayerOne, InputKey::Up, 20);

    // Airborne now; the second press must not re-apply the impulse
    assert!(state.fighters[0].is_jumping);
    assert!(state.fighters[0].velocity.y > first_impulse);
}

#[test]
fn test_punch_key_triggers_attack_and_combo() {
    let mut state = vs_human_match();

    assert!(state
        .key_down(FighterSide::PlayerOne, InputKey::Punch, 100)
        .is_none());
    assert!(state
        .key_down(FighterSide::PlayerOne, InputKey::Punch, 200)
        .is_none());
    let combo = state.key_down(FighterSide::PlayerOne, InputKey::Kick, 300);

    assert!(state.fighters[0].is_attacking);
    assert!(combo.is_some());
}

#[test]
fn test_input_ignored_after_match_ends() {
    let mut state = vs_human_match();
    state.fighters[0].health = 0;
    state.step();
    assert_eq!(state.phase, MatchPhase::Ended);

    state.key_down(FighterSide::PlayerOne, InputKey::Right, 0);
    state.step();

    assert_eq!(state.fighters[0].velocity.x, 0.0);
    assert_eq!(state.tick, 1);
}
