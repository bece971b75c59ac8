//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Directory containing the asset manifest and sprite/sound files
    pub asset_dir: PathBuf,

    /// Chain RPC endpoint for the ledger side channel
    pub ledger_rpc_url: String,
    /// On-chain program that records match results and rewards
    pub ledger_program_id: String,
    /// Server authority account (fee payer for recorded results)
    pub ledger_authority: String,

    /// Allowed client origin for CORS
    pub client_origin: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            asset_dir: env::var("ASSET_DIR")
                .unwrap_or_else(|_| "assets".to_string())
                .into(),

            ledger_rpc_url: env::var("LEDGER_RPC_URL")
                .unwrap_or_else(|_| "https://api.devnet.solana.com".to_string()),
            ledger_program_id: env::var("LEDGER_PROGRAM_ID")
                .map_err(|_| ConfigError::Missing("LEDGER_PROGRAM_ID"))?,
            ledger_authority: env::var("LEDGER_AUTHORITY")
                .map_err(|_| ConfigError::Missing("LEDGER_AUTHORITY"))?,

            client_origin: env::var("CLIENT_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
