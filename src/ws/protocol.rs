//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playable characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterId {
    /// Balanced all-rounder
    Blaze,
    /// Long reach, slow recovery
    Frost,
    /// Quick but fragile
    Volt,
    /// Heavy hitter
    Onyx,
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::Blaze
    }
}

/// AI difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

/// Which corner a fighter occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FighterSide {
    PlayerOne,
    PlayerTwo,
}

impl FighterSide {
    pub fn index(self) -> usize {
        match self {
            Self::PlayerOne => 0,
            Self::PlayerTwo => 1,
        }
    }

}

/// Input keys, delivered as key-down/key-up edge events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKey {
    Left,
    Right,
    Up,
    Down,
    Punch,
    Kick,
    Pause,
}

/// Who controls the second fighter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchMode {
    /// Both fighters driven by the same client (shared keyboard)
    VsHuman,
    /// Second fighter driven by the server AI
    VsAi { difficulty: Difficulty },
}

impl Default for MatchMode {
    fn default() -> Self {
        Self::VsAi {
            difficulty: Difficulty::Medium,
        }
    }
}

/// Application screens shown by the client, one active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppScreen {
    Loading,
    Menu,
    CharacterSelect,
    Match,
    Pause,
    GameOver,
    Leaderboard,
}

/// Match outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    PlayerOne,
    PlayerTwo,
    Tie,
}

/// Animation states a fighter can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    Idle,
    Run,
    Jump,
    Attack,
    TakeDamage,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// The start control was pressed (menu, character select, game over)
    StartPressed,

    /// A character was chosen on the character select screen
    SelectCharacter { character: CharacterId },

    /// Choose who controls the second fighter
    SelectMode { mode: MatchMode },

    /// Key pressed for a fighter
    KeyDown { side: FighterSide, key: InputKey },

    /// Key released for a fighter
    KeyUp { side: FighterSide, key: InputKey },

    /// The leaderboard control was pressed
    LeaderboardPressed,

    /// The back control was pressed
    BackPressed,

    /// Place a wager on the current session through the ledger
    PlaceBet { amount: u64 },

    /// Ping for latency measurement
    Ping { t: u64 },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome { session_id: Uuid, server_time: u64 },

    /// Asset loading progress (0..1)
    LoadingProgress {
        loaded: usize,
        total: usize,
        progress: f32,
    },

    /// The active application screen changed; show exactly this screen
    ScreenChanged { screen: AppScreen },

    /// A match began
    MatchStarted {
        match_id: Uuid,
        /// Seed for the match's deterministic random generation
        seed: u64,
        timer: u32,
        /// Logical canvas the client should render
        arena_width: f32,
        arena_height: f32,
    },

    /// Game state snapshot (sent at regular intervals while a match runs)
    Snapshot {
        /// Server tick number
        tick: u64,
        /// Round timer in seconds
        timer: u32,
        /// Both fighter states
        fighters: Vec<FighterSnapshot>,
        /// Events that occurred since last snapshot
        events: Vec<GameEvent>,
    },

    /// The match ended
    MatchEnd {
        verdict: Verdict,
        player_one_health: i32,
        player_two_health: i32,
    },

    /// Leaderboard contents fetched from the ledger
    Leaderboard { entries: Vec<LeaderboardEntry> },

    /// Non-fatal notice about a ledger operation
    LedgerNotice {
        ok: bool,
        message: String,
        reference: Option<String>,
    },

    /// Error message
    Error { code: String, message: String },

    /// Pong response
    Pong { t: u64 },
}

/// Fighter state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub side: FighterSide,
    pub character: CharacterId,
    /// Position of the bounding box top-left
    pub x: f32,
    pub y: f32,
    /// Current velocity
    pub vel_x: f32,
    pub vel_y: f32,
    /// Health (0-100)
    pub health: i32,
    pub animation: AnimationState,
    /// Current animation frame index
    pub frame: u32,
    pub is_attacking: bool,
    pub is_jumping: bool,
    pub dead: bool,
}

/// Game events (hits, combos)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// An attack landed
    Hit {
        attacker: FighterSide,
        defender: FighterSide,
        damage: i32,
        health_remaining: i32,
    },

    /// An input sequence completed a combo
    Combo { side: FighterSide, combo: String },

    /// The round timer ticked down
    TimerTick { remaining: u32 },
}

/// One leaderboard row from the on-chain program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player: String,
    pub wins: u32,
    pub losses: u32,
    pub score: i64,
}
