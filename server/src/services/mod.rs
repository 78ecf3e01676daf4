use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::Config;

pub mod leaderboard_service;
pub mod pool_service;
pub mod scheduler;
pub mod scoring_service;
pub mod session_service;

use leaderboard_service::LeaderboardService;
use session_service::{EngineSettings, SessionService};

pub struct AppState {
    pub config: Config,
    pub catalog: Arc<Catalog>,
    pub sessions: SessionService,
    pub leaderboard: LeaderboardService,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let settings = EngineSettings {
            tick_interval: config.tick_interval(),
            batch_size: config.batch_size,
        };
        Self {
            config,
            catalog: catalog.clone(),
            sessions: SessionService::new(catalog, settings),
            leaderboard: LeaderboardService::new(),
        }
    }
}
