//! Ledger side channel - records match results and rewards on-chain
//!
//! Thin JSON-RPC wrapper around the chain endpoint. Every call here is
//! best-effort: failures surface as a notice to the client and never touch
//! match state.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::ws::protocol::LeaderboardEntry;

/// Reward token amount minted per request
const REWARD_AMOUNT: u64 = 10;

/// Ledger service for on-chain operations
#[derive(Clone)]
pub struct LedgerService {
    client: Client,
    rpc_url: String,
    program_id: String,
    authority: String,
}

impl LedgerService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            rpc_url: config.ledger_rpc_url.clone(),
            program_id: config.ledger_program_id.clone(),
            authority: config.ledger_authority.clone(),
        }
    }

    /// Record a decisive match result. Returns the transaction reference.
    pub async fn record_result(&self, winner: &str, loser: &str) -> Result<String, LedgerError> {
        let instruction = json!({
            "action": "record_game",
            "game_type": "arena-fighter",
            "winner": winner,
            "loser": loser,
            "timestamp": Utc::now().timestamp_millis(),
        });

        self.send_instruction(&instruction).await
    }

    /// Request a token reward for a player
    pub async fn request_reward(&self, player: &str) -> Result<String, LedgerError> {
        let instruction = json!({
            "action": "mint_reward",
            "player": player,
            "amount": REWARD_AMOUNT,
        });

        self.send_instruction(&instruction).await
    }

    /// Place a wager for a player
    pub async fn place_bet(&self, player: &str, amount: u64) -> Result<String, LedgerError> {
        let instruction = json!({
            "action": "place_bet",
            "player": player,
            "amount": amount,
            "timestamp": Utc::now().timestamp_millis(),
        });

        self.send_instruction(&instruction).await
    }

    /// Fetch the leaderboard rows kept by the program, best score first
    pub async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        let mut entries: Vec<LeaderboardEntry> = self
            .rpc_call(
                "getProgramAccounts",
                json!([self.program_id, { "encoding": "jsonParsed" }]),
            )
            .await?;

        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(entries)
    }

    /// Base64-encode an instruction payload and submit it
    async fn send_instruction(&self, instruction: &serde_json::Value) -> Result<String, LedgerError> {
        let payload = STANDARD.encode(instruction.to_string());

        self.rpc_call(
            "sendTransaction",
            json!([
                payload,
                {
                    "encoding": "base64",
                    "programId": self.program_id,
                    "feePayer": self.authority,
                }
            ]),
        )
        .await
    }

    async fn rpc_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(LedgerError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let rpc: RpcResponse<T> = response.json().await.map_err(LedgerError::Request)?;

        if let Some(error) = rpc.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        rpc.result.ok_or(LedgerError::EmptyResponse)
    }
}

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Ledger errors - all non-fatal from the game's point of view
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("RPC request failed: {0}")]
    Request(reqwest::Error),

    #[error("RPC endpoint returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("RPC response carried no result")]
    EmptyResponse,
}
