use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod catalog;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    // The leaderboard is read by a standalone results page on another origin.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/v1/catalog/categories",
            get(handlers::catalog::list_categories),
        )
        .nest("/api/v1/sessions", sessions_routes())
        .route(
            "/leaderboard",
            get(handlers::leaderboard::get_leaderboard)
                .post(handlers::leaderboard::submit_score)
                .layer(cors),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

fn sessions_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/", post(handlers::sessions::create_session))
        .route(
            "/{id}",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .route(
            "/{id}/visibility",
            post(handlers::sessions::update_visibility),
        )
        .route("/{id}/answers", post(handlers::sessions::submit_answer))
        .route("/{id}/filter", post(handlers::sessions::change_filter))
        .route("/{id}/more", post(handlers::sessions::load_more))
        .route("/{id}/stream", get(handlers::sse::session_stream))
}
