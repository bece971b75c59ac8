//! Application state shared across routes

use std::sync::Arc;

use crate::assets::AssetCatalog;
use crate::config::Config;
use crate::ledger::LedgerService;
use crate::session::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub assets: Arc<AssetCatalog>,
    pub ledger: LedgerService,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // Asset catalog; filled by the background load spawned at startup
        let assets = Arc::new(AssetCatalog::new());

        // Ledger side channel
        let ledger = LedgerService::new(&config);

        // Live session registry
        let sessions = Arc::new(SessionRegistry::new());

        Self {
            config,
            assets,
            ledger,
            sessions,
        }
    }
}
