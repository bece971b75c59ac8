//! Top-level application flow: one active screen, explicit transitions
//!
//! Pure state machine. Events go in, effects come out; the async session
//! driver interprets the effects. Invalid events for the current screen are
//! ignored rather than rejected with errors - the client's controls for
//! them are not shown in the first place.

use crate::ws::protocol::{AppScreen, CharacterId, MatchMode, Verdict};

/// Events fed into the flow machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowEvent {
    /// Asset loading finished
    AssetsReady,
    /// The start control was pressed
    StartPressed,
    /// A character was chosen on the select screen
    CharacterChosen(CharacterId),
    /// The opponent mode was chosen on the select screen
    ModeChosen(MatchMode),
    /// The pause key was pressed
    PauseKey,
    /// The running match finished
    MatchEnded(Verdict),
    /// The leaderboard control was pressed
    LeaderboardPressed,
    /// The back control was pressed
    BackPressed,
}

/// Effects produced by a transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEffect {
    /// Show exactly this screen
    ShowScreen(AppScreen),
    /// Spawn the match loop
    StartMatch {
        character: CharacterId,
        mode: MatchMode,
    },
    /// Suspend the match loop
    PauseMatch,
    /// Resume the match loop
    ResumeMatch,
    /// Record the verdict on the ledger, best-effort
    RecordResult(Verdict),
    /// Fetch the leaderboard from the ledger
    FetchLeaderboard,
}

/// The application flow state machine
#[derive(Debug)]
pub struct GameFlow {
    screen: AppScreen,
    selected_character: Option<CharacterId>,
    mode: MatchMode,
    last_verdict: Option<Verdict>,
}

impl GameFlow {
    pub fn new() -> Self {
        Self {
            screen: AppScreen::Loading,
            selected_character: None,
            mode: MatchMode::default(),
            last_verdict: None,
        }
    }

    pub fn screen(&self) -> AppScreen {
        self.screen
    }

    pub fn selected_character(&self) -> Option<CharacterId> {
        self.selected_character
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn last_verdict(&self) -> Option<Verdict> {
        self.last_verdict
    }

    /// Whether the start control should be enabled on the select screen.
    /// Proceeding to a match is gated on a chosen character.
    pub fn can_start_match(&self) -> bool {
        self.selected_character.is_some()
    }

    /// Dispatch an event, returning the effects of the transition
    pub fn handle(&mut self, event: FlowEvent) -> Vec<FlowEffect> {
        use AppScreen::*;

        match (self.screen, event) {
            (Loading, FlowEvent::AssetsReady) => self.enter(Menu, vec![]),

            (Menu, FlowEvent::StartPressed) => self.enter(CharacterSelect, vec![]),

            (CharacterSelect, FlowEvent::CharacterChosen(character)) => {
                self.selected_character = Some(character);
                vec![]
            }

            (CharacterSelect, FlowEvent::ModeChosen(mode)) => {
                self.mode = mode;
                vec![]
            }

            (CharacterSelect, FlowEvent::StartPressed) => match self.selected_character {
                Some(character) => {
                    let start = FlowEffect::StartMatch {
                        character,
                        mode: self.mode,
                    };
                    self.enter(Match, vec![start])
                }
                // Start is disabled until a character is chosen
                None => vec![],
            },

            (Match, FlowEvent::PauseKey) => self.enter(Pause, vec![FlowEffect::PauseMatch]),

            (Pause, FlowEvent::PauseKey) => self.enter(Match, vec![FlowEffect::ResumeMatch]),

            (Match, FlowEvent::MatchEnded(verdict)) => {
                self.last_verdict = Some(verdict);
                self.enter(GameOver, vec![FlowEffect::RecordResult(verdict)])
            }

            (GameOver, FlowEvent::StartPressed) => self.enter(Menu, vec![]),

            (Menu | GameOver, FlowEvent::LeaderboardPressed) => {
                self.enter(Leaderboard, vec![FlowEffect::FetchLeaderboard])
            }

            (Leaderboard, FlowEvent::BackPressed) => self.enter(Menu, vec![]),

            _ => vec![],
        }
    }

    /// Switch screens; the ShowScreen effect always leads so the client
    /// swaps UI before acting on the rest
    fn enter(&mut self, screen: AppScreen, tail: Vec<FlowEffect>) -> Vec<FlowEffect> {
        self.screen = screen;
        let mut effects = vec![FlowEffect::ShowScreen(screen)];
        effects.extend(tail);
        effects
    }
}

impl Default for GameFlow {
    fn default() -> Self {
        Self::new()
    }
}
