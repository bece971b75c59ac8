//! Session driver - owns one client's application flow and match task

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assets::AssetCatalog;
use crate::game::{GameMatch, MatchCmd, MatchHandle, MatchOutcome};
use crate::ledger::LedgerService;
use crate::util::time::unix_millis;
use crate::ws::protocol::{
    AppScreen, CharacterId, ClientMsg, FighterSide, InputKey, MatchMode, ServerMsg, Verdict,
};

use super::flow::{FlowEffect, FlowEvent, GameFlow};

/// Handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    /// Channel for client messages into the session task
    pub client_tx: mpsc::Sender<ClientMsg>,
    /// Channel for server messages out to the WebSocket writer
    pub out_tx: broadcast::Sender<ServerMsg>,
}

/// Registry of all live sessions
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Create a session. The caller subscribes to `out_tx` first and then
    /// spawns the returned session, so no early message is lost.
    pub fn open(
        &self,
        assets: Arc<AssetCatalog>,
        ledger: LedgerService,
    ) -> (SessionHandle, GameSession) {
        let id = Uuid::new_v4();
        let (client_tx, client_rx) = mpsc::channel(64);
        let (out_tx, _) = broadcast::channel(256);
        let (outcome_tx, outcome_rx) = mpsc::channel(4);

        let handle = SessionHandle {
            id,
            client_tx,
            out_tx: out_tx.clone(),
        };

        let session = GameSession {
            id,
            assets,
            ledger,
            flow: GameFlow::new(),
            client_rx,
            out_tx,
            match_handle: None,
            snapshot_forwarder: None,
            outcome_tx,
            outcome_rx,
        };

        self.sessions.insert(id, handle.clone());
        (handle, session)
    }

    pub fn close(&self, id: &Uuid) {
        self.sessions.remove(id);
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One client's session: application flow plus the match task it owns
pub struct GameSession {
    id: Uuid,
    assets: Arc<AssetCatalog>,
    ledger: LedgerService,
    flow: GameFlow,
    client_rx: mpsc::Receiver<ClientMsg>,
    out_tx: broadcast::Sender<ServerMsg>,
    match_handle: Option<MatchHandle>,
    snapshot_forwarder: Option<JoinHandle<()>>,
    outcome_tx: mpsc::Sender<MatchOutcome>,
    outcome_rx: mpsc::Receiver<MatchOutcome>,
}

impl GameSession {
    /// Drive the session until the client disconnects
    pub async fn run(mut self) {
        info!(session_id = %self.id, "Session started");

        self.send(ServerMsg::Welcome {
            session_id: self.id,
            server_time: unix_millis(),
        });
        self.send(ServerMsg::ScreenChanged {
            screen: AppScreen::Loading,
        });

        let mut progress_rx = self.assets.subscribe();
        let initial = self.assets.progress();
        let mut loading_done = initial.complete;

        self.send(ServerMsg::LoadingProgress {
            loaded: initial.loaded,
            total: initial.total,
            progress: initial.fraction(),
        });
        if loading_done {
            self.dispatch(FlowEvent::AssetsReady).await;
        }

        loop {
            tokio::select! {
                maybe_msg = self.client_rx.recv() => {
                    match maybe_msg {
                        Some(msg) => self.handle_client(msg).await,
                        None => break,
                    }
                }

                Some(outcome) = self.outcome_rx.recv() => {
                    self.handle_outcome(outcome).await;
                }

                changed = progress_rx.changed(), if !loading_done => {
                    match changed {
                        Ok(()) => {
                            let progress = *progress_rx.borrow_and_update();
                            self.send(ServerMsg::LoadingProgress {
                                loaded: progress.loaded,
                                total: progress.total,
                                progress: progress.fraction(),
                            });
                            if progress.complete {
                                loading_done = true;
                                self.dispatch(FlowEvent::AssetsReady).await;
                            }
                        }
                        Err(_) => {
                            // Loader is gone; stop waiting on it
                            loading_done = true;
                        }
                    }
                }
            }
        }

        self.stop_match().await;
        info!(session_id = %self.id, "Session closed");
    }

    async fn handle_client(&mut self, msg: ClientMsg) {
        match msg {
            ClientMsg::StartPressed => self.dispatch(FlowEvent::StartPressed).await,
            ClientMsg::SelectCharacter { character } => {
                self.dispatch(FlowEvent::CharacterChosen(character)).await
            }
            ClientMsg::SelectMode { mode } => self.dispatch(FlowEvent::ModeChosen(mode)).await,
            ClientMsg::KeyDown { side, key } => {
                if key == InputKey::Pause {
                    self.dispatch(FlowEvent::PauseKey).await;
                } else {
                    self.send_match_cmd(MatchCmd::KeyDown { side, key }).await;
                }
            }
            ClientMsg::KeyUp { side, key } => {
                self.send_match_cmd(MatchCmd::KeyUp { side, key }).await;
            }
            ClientMsg::LeaderboardPressed => self.dispatch(FlowEvent::LeaderboardPressed).await,
            ClientMsg::BackPressed => self.dispatch(FlowEvent::BackPressed).await,
            ClientMsg::PlaceBet { amount } => self.place_bet(amount),
            ClientMsg::Ping { t } => self.send(ServerMsg::Pong { t }),
        }
    }

    async fn handle_outcome(&mut self, outcome: MatchOutcome) {
        info!(
            session_id = %self.id,
            match_id = %outcome.match_id,
            verdict = ?outcome.verdict,
            "Match outcome received"
        );

        // The match task already ended itself
        self.match_handle = None;
        self.snapshot_forwarder = None;
        self.dispatch(FlowEvent::MatchEnded(outcome.verdict)).await;
    }

    async fn dispatch(&mut self, event: FlowEvent) {
        let effects = self.flow.handle(event);
        for effect in effects {
            self.apply_effect(effect).await;
        }
    }

    async fn apply_effect(&mut self, effect: FlowEffect) {
        match effect {
            FlowEffect::ShowScreen(screen) => {
                self.send(ServerMsg::ScreenChanged { screen });
            }
            FlowEffect::StartMatch { character, mode } => {
                self.start_match(character, mode).await;
            }
            FlowEffect::PauseMatch => self.send_match_cmd(MatchCmd::Pause).await,
            FlowEffect::ResumeMatch => self.send_match_cmd(MatchCmd::Resume).await,
            FlowEffect::RecordResult(verdict) => self.record_result(verdict),
            FlowEffect::FetchLeaderboard => self.fetch_leaderboard(),
        }
    }

    async fn start_match(&mut self, character: CharacterId, mode: MatchMode) {
        self.stop_match().await;

        let (game_match, handle) = GameMatch::new(character, mode, self.outcome_tx.clone());

        // Subscribe before spawning so MatchStarted is not missed
        let mut snapshot_rx = handle.snapshot_tx.subscribe();
        let out_tx = self.out_tx.clone();
        let session_id = self.id;
        let forwarder = tokio::spawn(async move {
            loop {
                match snapshot_rx.recv().await {
                    Ok(msg) => {
                        let _ = out_tx.send(msg);
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(session_id = %session_id, lagged = n, "Snapshot forwarder lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        info!(session_id = %self.id, match_id = %handle.id, ?mode, "Starting match");
        tokio::spawn(game_match.run());
        self.match_handle = Some(handle);
        self.snapshot_forwarder = Some(forwarder);
    }

    async fn stop_match(&mut self) {
        if let Some(handle) = self.match_handle.take() {
            // The match may have ended on its own already; a closed channel
            // is fine
            let _ = handle.cmd_tx.send(MatchCmd::Stop).await;
        }
        // The forwarder exits once the match drops its snapshot sender
        self.snapshot_forwarder = None;
    }

    async fn send_match_cmd(&mut self, cmd: MatchCmd) {
        if let Some(handle) = &self.match_handle {
            if handle.cmd_tx.send(cmd).await.is_err() {
                debug!(session_id = %self.id, "Match command channel closed");
            }
        }
    }

    /// Record a decisive result on the ledger and reward the winner.
    /// Best-effort: failures become a notice, the verdict stands.
    fn record_result(&self, verdict: Verdict) {
        let (winner, loser) = match verdict {
            Verdict::Tie => {
                self.send(ServerMsg::LedgerNotice {
                    ok: true,
                    message: "Tie game, nothing recorded on the ledger".to_string(),
                    reference: None,
                });
                return;
            }
            Verdict::PlayerOne => (
                self.player_label(FighterSide::PlayerOne),
                self.player_label(FighterSide::PlayerTwo),
            ),
            Verdict::PlayerTwo => (
                self.player_label(FighterSide::PlayerTwo),
                self.player_label(FighterSide::PlayerOne),
            ),
        };

        let ledger = self.ledger.clone();
        let out_tx = self.out_tx.clone();
        let session_id = self.id;
        let reward_winner = winner != "cpu";

        tokio::spawn(async move {
            match ledger.record_result(&winner, &loser).await {
                Ok(reference) => {
                    info!(session_id = %session_id, reference = %reference, "Match result recorded");
                    let _ = out_tx.send(ServerMsg::LedgerNotice {
                        ok: true,
                        message: "Match result recorded".to_string(),
                        reference: Some(reference),
                    });

                    if reward_winner {
                        match ledger.request_reward(&winner).await {
                            Ok(reference) => {
                                let _ = out_tx.send(ServerMsg::LedgerNotice {
                                    ok: true,
                                    message: "Reward minted for the winner".to_string(),
                                    reference: Some(reference),
                                });
                            }
                            Err(e) => {
                                warn!(session_id = %session_id, error = %e, "Reward request failed");
                                let _ = out_tx.send(ServerMsg::LedgerNotice {
                                    ok: false,
                                    message: format!("Reward request failed: {e}"),
                                    reference: None,
                                });
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Failed to record match result");
                    let _ = out_tx.send(ServerMsg::LedgerNotice {
                        ok: false,
                        message: format!("Failed to record result: {e}"),
                        reference: None,
                    });
                }
            }
        });
    }

    fn fetch_leaderboard(&self) {
        let ledger = self.ledger.clone();
        let out_tx = self.out_tx.clone();
        let session_id = self.id;

        tokio::spawn(async move {
            match ledger.get_leaderboard().await {
                Ok(entries) => {
                    let _ = out_tx.send(ServerMsg::Leaderboard { entries });
                }
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Leaderboard fetch failed");
                    let _ = out_tx.send(ServerMsg::LedgerNotice {
                        ok: false,
                        message: format!("Leaderboard unavailable: {e}"),
                        reference: None,
                    });
                }
            }
        });
    }

    fn place_bet(&self, amount: u64) {
        let ledger = self.ledger.clone();
        let out_tx = self.out_tx.clone();
        let player = self.player_label(FighterSide::PlayerOne);
        let session_id = self.id;

        tokio::spawn(async move {
            match ledger.place_bet(&player, amount).await {
                Ok(reference) => {
                    let _ = out_tx.send(ServerMsg::LedgerNotice {
                        ok: true,
                        message: format!("Bet of {amount} placed"),
                        reference: Some(reference),
                    });
                }
                Err(e) => {
                    warn!(session_id = %session_id, error = %e, "Bet failed");
                    let _ = out_tx.send(ServerMsg::LedgerNotice {
                        ok: false,
                        message: format!("Bet failed: {e}"),
                        reference: None,
                    });
                }
            }
        });
    }

    fn player_label(&self, side: FighterSide) -> String {
        match side {
            FighterSide::PlayerOne => self.id.to_string(),
            FighterSide::PlayerTwo => match self.flow.mode() {
                MatchMode::VsAi { .. } => "cpu".to_string(),
                MatchMode::VsHuman => format!("{}-p2", self.id),
            },
        }
    }

    fn send(&self, msg: ServerMsg) {
        let _ = self.out_tx.send(msg);
    }
}
