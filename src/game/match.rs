//! Match state and authoritative tick loop

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::util::time::{
    tick_delta, unix_millis, SIMULATION_TPS, SNAPSHOT_TPS, TICK_DURATION_MICROS,
};
use crate::ws::protocol::{
    AnimationState, CharacterId, FighterSide, GameEvent, InputKey, MatchMode, ServerMsg, Verdict,
};

use super::ai::{plan_move, PlannedMove};
use super::combo::ComboDetector;
use super::fighter::{Fighter, ATTACK_HIT_FRAME, RUN_SPEED};
use super::physics::{Arena, PhysicsSystem};
use super::snapshot::SnapshotBuilder;
use super::MoveDir;

/// Round length in seconds
pub const ROUND_SECONDS: u32 = 99;
/// Health removed by a landed attack
pub const DAMAGE_PER_HIT: i32 = 10;
/// Impulse applied to a fighter that just got hit
pub const KNOCKBACK_FORCE: f32 = 8.0;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Created but not yet started
    NotStarted,
    /// Simulation running
    Running,
    /// Suspended; physics, animation, and the timer do not advance
    Paused,
    /// Finished (terminal)
    Ended,
}

/// Directional keys currently held for one fighter
#[derive(Debug, Clone, Copy, Default)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
}

/// Authoritative match state
pub struct MatchState {
    pub id: Uuid,
    pub seed: u64,
    pub phase: MatchPhase,
    pub tick: u64,
    pub arena: Arena,
    pub fighters: [Fighter; 2],
    pub held: [HeldKeys; 2],
    pub mode: MatchMode,
    /// Round countdown in seconds
    pub timer: u32,
    /// Fraction of the current second already simulated
    timer_accum: f32,
    pub winner: Option<Verdict>,
    pub combos: ComboDetector,
    rng: ChaCha8Rng,
}

impl MatchState {
    pub fn new(id: Uuid, seed: u64, character: CharacterId, mode: MatchMode) -> Self {
        let arena = Arena::default();
        Self {
            id,
            seed,
            phase: MatchPhase::NotStarted,
            tick: 0,
            fighters: [
                Fighter::new(FighterSide::PlayerOne, character, &arena),
                Fighter::new(FighterSide::PlayerTwo, CharacterId::default(), &arena),
            ],
            arena,
            held: [HeldKeys::default(), HeldKeys::default()],
            mode,
            timer: ROUND_SECONDS,
            timer_accum: 0.0,
            winner: None,
            combos: ComboDetector::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Reset both fighters and begin the round
    pub fn start(&mut self) {
        for fighter in &mut self.fighters {
            fighter.reset(&self.arena);
        }
        self.held = [HeldKeys::default(), HeldKeys::default()];
        self.combos.clear();
        self.timer = ROUND_SECONDS;
        self.timer_accum = 0.0;
        self.winner = None;
        self.tick = 0;
        self.phase = MatchPhase::Running;
    }

    pub fn pause(&mut self) {
        if self.phase == MatchPhase::Running {
            self.phase = MatchPhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == MatchPhase::Paused {
            self.phase = MatchPhase::Running;
        }
    }

    /// Handle a key-down edge event. Returns a combo event if the input
    /// completed a registered pattern.
    pub fn key_down(
        &mut self,
        side: FighterSide,
        key: InputKey,
        now_ms: u64,
    ) -> Option<GameEvent> {
        if self.phase != MatchPhase::Running {
            return None;
        }

        let idx = side.index();
        match key {
            InputKey::Left => {
                self.held[idx].left = true;
                self.fighters[idx].last_direction = Some(MoveDir::Left);
            }
            InputKey::Right => {
                self.held[idx].right = true;
                self.fighters[idx].last_direction = Some(MoveDir::Right);
            }
            InputKey::Up => {
                self.fighters[idx].try_jump();
            }
            InputKey::Down | InputKey::Punch | InputKey::Kick => {
                if matches!(key, InputKey::Punch | InputKey::Kick) {
                    self.fighters[idx].attack();
                }
                self.combos.record(side, key, now_ms);
                if let Some(combo) = self.combos.detect(side) {
                    return Some(GameEvent::Combo {
                        side,
                        combo: combo.to_string(),
                    });
                }
            }
            InputKey::Pause => {}
        }

        None
    }

    /// Handle a key-up edge event
    pub fn key_up(&mut self, side: FighterSide, key: InputKey) {
        let idx = side.index();
        match key {
            InputKey::Left => self.held[idx].left = false,
            InputKey::Right => self.held[idx].right = false,
            _ => {}
        }
    }

    /// Run one simulation tick. Fixed order: physics and animation for both
    /// fighters, AI intent, movement resolution, attack resolution, whiff
    /// recovery, round timer, end check.
    pub fn step(&mut self) -> Vec<GameEvent> {
        if self.phase != MatchPhase::Running {
            return Vec::new();
        }

        self.tick += 1;
        let mut events = Vec::new();

        for fighter in &mut self.fighters {
            PhysicsSystem::apply_gravity(&self.arena, fighter);
            PhysicsSystem::apply_movement(&self.arena, fighter);
            fighter.advance_animation();
            fighter.tick_recovery();
        }

        if let MatchMode::VsAi { difficulty } = self.mode {
            let (p1, p2) = self.fighters.split_at_mut(1);
            let plan = plan_move(&p2[0], &p1[0], difficulty, &mut self.rng);
            Self::apply_plan(&mut p2[0], &mut self.held[1], plan);
            if plan.attack && !p2[0].is_attacking {
                p2[0].attack();
                self.combos
                    .record(FighterSide::PlayerTwo, InputKey::Punch, unix_millis());
            }
        }

        for (idx, fighter) in self.fighters.iter_mut().enumerate() {
            Self::resolve_movement(fighter, self.held[idx]);
        }

        let (p1, p2) = self.fighters.split_at_mut(1);
        events.extend(Self::resolve_attack(&mut p1[0], &mut p2[0]));
        events.extend(Self::resolve_attack(&mut p2[0], &mut p1[0]));

        for fighter in &mut self.fighters {
            if fighter.is_attacking
                && fighter.animation == AnimationState::Attack
                && fighter.on_last_frame()
            {
                // Attack finished without landing
                fighter.end_attack();
            }
        }

        self.timer_accum += tick_delta();
        if self.timer_accum >= 1.0 {
            self.timer_accum -= 1.0;
            if self.timer > 0 {
                self.timer -= 1;
                events.push(GameEvent::TimerTick {
                    remaining: self.timer,
                });
            }
        }

        if self.timer == 0 || self.fighters.iter().any(|f| f.health <= 0) {
            self.end_round();
        }

        events
    }

    /// Translate an AI plan into the same held-key state a human produces
    fn apply_plan(fighter: &mut Fighter, held: &mut HeldKeys, plan: PlannedMove) {
        held.left = plan.left;
        held.right = plan.right;
        if plan.left {
            fighter.last_direction = Some(MoveDir::Left);
        } else if plan.right {
            fighter.last_direction = Some(MoveDir::Right);
        }
        if plan.jump {
            fighter.try_jump();
        }
    }

    /// Apply held directional keys to velocity and animation. Horizontal
    /// motion requires the held key to also be the most recently pressed
    /// direction, so simultaneous opposite keys resolve to the latest one.
    fn resolve_movement(fighter: &mut Fighter, held: HeldKeys) {
        if held.left && fighter.last_direction == Some(MoveDir::Left) {
            fighter.velocity.x = -RUN_SPEED;
            fighter.request_animation(AnimationState::Run);
        } else if held.right && fighter.last_direction == Some(MoveDir::Right) {
            fighter.velocity.x = RUN_SPEED;
            fighter.request_animation(AnimationState::Run);
        } else {
            fighter.request_animation(AnimationState::Idle);
        }

        if fighter.velocity.y < 0.0 {
            fighter.request_animation(AnimationState::Jump);
        }
    }

    /// Evaluate the attacker's hit frame against the defender. An attack
    /// instance lands at most once: the attacking flag is cleared the
    /// moment damage is applied.
    fn resolve_attack(attacker: &mut Fighter, defender: &mut Fighter) -> Option<GameEvent> {
        if attacker.is_attacking
            && attacker.animation == AnimationState::Attack
            && attacker.frame == ATTACK_HIT_FRAME
            && PhysicsSystem::attack_hit(attacker, defender)
        {
            attacker.end_attack();
            defender.take_hit(DAMAGE_PER_HIT);

            let direction = PhysicsSystem::facing_direction(attacker, defender);
            PhysicsSystem::knockback(defender, direction, KNOCKBACK_FORCE);

            return Some(GameEvent::Hit {
                attacker: attacker.side,
                defender: defender.side,
                damage: DAMAGE_PER_HIT,
                health_remaining: defender.health,
            });
        }

        None
    }

    /// Compare health and close out the round. Strictly higher health wins;
    /// equal health is a tie, including the double-KO case.
    fn end_round(&mut self) {
        self.winner = Some(self.determine_winner());
        self.phase = MatchPhase::Ended;
    }

    pub fn determine_winner(&self) -> Verdict {
        let p1 = self.fighters[0].health;
        let p2 = self.fighters[1].health;

        if p1 == p2 {
            Verdict::Tie
        } else if p1 > p2 {
            Verdict::PlayerOne
        } else {
            Verdict::PlayerTwo
        }
    }
}

/// Commands sent to a running match task
#[derive(Debug, Clone)]
pub enum MatchCmd {
    KeyDown { side: FighterSide, key: InputKey },
    KeyUp { side: FighterSide, key: InputKey },
    Pause,
    Resume,
    Stop,
}

/// Final outcome delivered to the owning session
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub match_id: Uuid,
    pub verdict: Verdict,
    pub player_one_health: i32,
    pub player_two_health: i32,
}

/// Handle to a running match task
#[derive(Clone)]
pub struct MatchHandle {
    pub id: Uuid,
    pub cmd_tx: mpsc::Sender<MatchCmd>,
    pub snapshot_tx: broadcast::Sender<ServerMsg>,
}

/// The authoritative game match
pub struct GameMatch {
    state: MatchState,
    cmd_rx: mpsc::Receiver<MatchCmd>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    outcome_tx: mpsc::Sender<MatchOutcome>,
    pending_events: Vec<GameEvent>,
}

impl GameMatch {
    /// Create a new match and its handle
    pub fn new(
        character: CharacterId,
        mode: MatchMode,
        outcome_tx: mpsc::Sender<MatchOutcome>,
    ) -> (Self, MatchHandle) {
        let id = Uuid::new_v4();
        let seed = rand::random::<u64>();
        let (cmd_tx, cmd_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);

        let handle = MatchHandle {
            id,
            cmd_tx,
            snapshot_tx: snapshot_tx.clone(),
        };

        let snapshot_interval = SIMULATION_TPS / SNAPSHOT_TPS;
        let game_match = Self {
            state: MatchState::new(id, seed, character, mode),
            cmd_rx,
            snapshot_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_interval),
            outcome_tx,
            pending_events: Vec::new(),
        };

        (game_match, handle)
    }

    /// Run the authoritative tick loop until the round ends or the session
    /// stops the match
    pub async fn run(mut self) {
        info!(match_id = %self.state.id, seed = self.state.seed, "Match started");

        self.state.start();
        let _ = self.snapshot_tx.send(ServerMsg::MatchStarted {
            match_id: self.state.id,
            seed: self.state.seed,
            timer: self.state.timer,
            arena_width: self.state.arena.width,
            arena_height: self.state.arena.height,
        });

        let tick_duration = Duration::from_micros(TICK_DURATION_MICROS);
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            if !self.process_commands() {
                info!(match_id = %self.state.id, "Match stopped by session");
                return;
            }

            let events = self.state.step();
            self.pending_events.extend(events);

            let ended = self.state.phase == MatchPhase::Ended;

            // The final tick always snapshots so its events are not lost
            if self.snapshot_builder.should_send() || ended {
                let snapshot = self.snapshot_builder.build(
                    self.state.tick,
                    self.state.timer,
                    &self.state.fighters,
                    std::mem::take(&mut self.pending_events),
                );
                let _ = self.snapshot_tx.send(snapshot);
            }

            if ended {
                break;
            }
        }

        let verdict = self.state.winner.unwrap_or_else(|| self.state.determine_winner());
        info!(match_id = %self.state.id, ?verdict, "Match ended");

        let outcome = MatchOutcome {
            match_id: self.state.id,
            verdict,
            player_one_health: self.state.fighters[0].health.max(0),
            player_two_health: self.state.fighters[1].health.max(0),
        };

        let _ = self.snapshot_tx.send(ServerMsg::MatchEnd {
            verdict,
            player_one_health: outcome.player_one_health,
            player_two_health: outcome.player_two_health,
        });
        let _ = self.outcome_tx.send(outcome).await;
    }

    /// Drain pending commands. Returns false when the match should stop.
    fn process_commands(&mut self) -> bool {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            match cmd {
                MatchCmd::KeyDown { side, key } => {
                    if let Some(event) = self.state.key_down(side, key, unix_millis()) {
                        debug!(match_id = %self.state.id, ?side, "Combo detected");
                        self.pending_events.push(event);
                    }
                }
                MatchCmd::KeyUp { side, key } => {
                    self.state.key_up(side, key);
                }
                MatchCmd::Pause => self.state.pause(),
                MatchCmd::Resume => self.state.resume(),
                MatchCmd::Stop => return false,
            }
        }
        true
    }
}
