use axum::Router;
use std::sync::Arc;

use cinemaiq_server::{catalog::Catalog, config::Config, create_router, services::AppState};

pub async fn create_test_app() -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    // Fixed engine settings so tests never depend on the host environment.
    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        tick_interval_ms: 100,
        batch_size: 3,
    };

    let catalog = Catalog::embedded().expect("embedded catalog must parse");
    let app_state = Arc::new(AppState::new(config, catalog));

    create_router(app_state)
}
