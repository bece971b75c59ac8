//! Application flow tests: screen transitions, gating, and effects.

use crate::ws::protocol::{AppScreen, CharacterId, Difficulty, MatchMode, Verdict};

use super::flow::{FlowEffect, FlowEvent, GameFlow};

fn flow_at_menu() -> GameFlow {
    let mut flow = GameFlow::new();
    flow.handle(FlowEvent::AssetsReady);
    flow
}

fn flow_in_match() -> GameFlow {
    let mut flow = flow_at_menu();
    flow.handle(FlowEvent::StartPressed);
    flow.handle(FlowEvent::CharacterChosen(CharacterId::Volt));
    flow.handle(FlowEvent::StartPressed);
    flow
}

// -----------------------------------------------------------------------------
// Happy-path transitions
// -----------------------------------------------------------------------------

#[test]
fn test_assets_ready_unlocks_menu() {
    let mut flow = GameFlow::new();
    assert_eq!(flow.screen(), AppScreen::Loading);

    let effects = flow.handle(FlowEvent::AssetsReady);

    assert_eq!(flow.screen(), AppScreen::Menu);
    assert_eq!(effects, vec![FlowEffect::ShowScreen(AppScreen::Menu)]);
}

#[test]
fn test_menu_start_opens_character_select() {
    let mut flow = flow_at_menu();

    flow.handle(FlowEvent::StartPressed);

    assert_eq!(flow.screen(), AppScreen::CharacterSelect);
    assert!(!flow.can_start_match());
}

#[test]
fn test_character_select_gates_match_start() {
    let mut flow = flow_at_menu();
    flow.handle(FlowEvent::StartPressed);

    // No character chosen yet: start is a no-op
    let effects = flow.handle(FlowEvent::StartPressed);
    assert!(effects.is_empty());
    assert_eq!(flow.screen(), AppScreen::CharacterSelect);

    flow.handle(FlowEvent::CharacterChosen(CharacterId::Frost));
    assert!(flow.can_start_match());

    let effects = flow.handle(FlowEvent::StartPressed);
    assert_eq!(flow.screen(), AppScreen::Match);
    assert_eq!(
        effects,
        vec![
            FlowEffect::ShowScreen(AppScreen::Match),
            FlowEffect::StartMatch {
                character: CharacterId::Frost,
                mode: MatchMode::default(),
            },
        ]
    );
}

#[test]
fn test_mode_selection_carries_into_match() {
    let mut flow = flow_at_menu();
    flow.handle(FlowEvent::StartPressed);
    flow.handle(FlowEvent::CharacterChosen(CharacterId::Onyx));
    flow.handle(FlowEvent::ModeChosen(MatchMode::VsAi {
        difficulty: Difficulty::Hard,
    }));

    let effects = flow.handle(FlowEvent::StartPressed);

    assert!(effects.contains(&FlowEffect::StartMatch {
        character: CharacterId::Onyx,
        mode: MatchMode::VsAi {
            difficulty: Difficulty::Hard,
        },
    }));
}

#[test]
fn test_pause_key_toggles_pause() {
    let mut flow = flow_in_match();

    let effects = flow.handle(FlowEvent::PauseKey);
    assert_eq!(flow.screen(), AppScreen::Pause);
    assert_eq!(
        effects,
        vec![
            FlowEffect::ShowScreen(AppScreen::Pause),
            FlowEffect::PauseMatch,
        ]
    );

    let effects = flow.handle(FlowEvent::PauseKey);
    assert_eq!(flow.screen(), AppScreen::Match);
    assert_eq!(
        effects,
        vec![
            FlowEffect::ShowScreen(AppScreen::Match),
            FlowEffect::ResumeMatch,
        ]
    );
}

#[test]
fn test_match_end_records_result() {
    let mut flow = flow_in_match();

    let effects = flow.handle(FlowEvent::MatchEnded(Verdict::PlayerOne));

    assert_eq!(flow.screen(), AppScreen::GameOver);
    assert_eq!(flow.last_verdict(), Some(Verdict::PlayerOne));
    assert_eq!(
        effects,
        vec![
            FlowEffect::ShowScreen(AppScreen::GameOver),
            FlowEffect::RecordResult(Verdict::PlayerOne),
        ]
    );
}

#[test]
fn test_game_over_start_returns_to_menu() {
    let mut flow = flow_in_match();
    flow.handle(FlowEvent::MatchEnded(Verdict::Tie));

    flow.handle(FlowEvent::StartPressed);

    assert_eq!(flow.screen(), AppScreen::Menu);
}

#[test]
fn test_leaderboard_from_menu_and_game_over() {
    let mut flow = flow_at_menu();
    let effects = flow.handle(FlowEvent::LeaderboardPressed);
    assert_eq!(flow.screen(), AppScreen::Leaderboard);
    assert!(effects.contains(&FlowEffect::FetchLeaderboard));

    flow.handle(FlowEvent::BackPressed);
    assert_eq!(flow.screen(), AppScreen::Menu);

    let mut flow = flow_in_match();
    flow.handle(FlowEvent::MatchEnded(Verdict::PlayerTwo));
    flow.handle(FlowEvent::LeaderboardPressed);
    assert_eq!(flow.screen(), AppScreen::Leaderboard);
}

// -----------------------------------------------------------------------------
// Invalid events are ignored
// -----------------------------------------------------------------------------

#[test]
fn test_start_ignored_while_loading() {
    let mut flow = GameFlow::new();

    let effects = flow.handle(FlowEvent::StartPressed);

    assert!(effects.is_empty());
    assert_eq!(flow.screen(), AppScreen::Loading);
}

#[test]
fn test_pause_key_ignored_outside_match() {
    let mut flow = flow_at_menu();

    let effects = flow.handle(FlowEvent::PauseKey);

    assert!(effects.is_empty());
    assert_eq!(flow.screen(), AppScreen::Menu);
}

#[test]
fn test_character_choice_persists_across_games() {
    let mut flow = flow_in_match();
    flow.handle(FlowEvent::MatchEnded(Verdict::PlayerOne));
    flow.handle(FlowEvent::StartPressed); // back to the menu
    flow.handle(FlowEvent::StartPressed); // into character select

    // The previous selection still satisfies the gate
    assert!(flow.can_start_match());
    flow.handle(FlowEvent::StartPressed);
    assert_eq!(flow.screen(), AppScreen::Match);
}
