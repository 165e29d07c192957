use axum::{
    routing::{delete, get},
    Router,
};
use mission_core::MissionConfig;
use mission_sources::MailReader;
use std::sync::Arc;

use crate::aggregate::Aggregator;

/// Central shared state: passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: MissionConfig,
    pub aggregator: Aggregator,
    pub mail: MailReader,
}

impl AppState {
    pub fn new(config: MissionConfig, aggregator: Aggregator, mail: MailReader) -> Self {
        Self {
            config,
            aggregator,
            mail,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/api/search", get(crate::http::search::search_handler))
        .route(
            "/api/cron",
            get(crate::http::cron::list_handler).post(crate::http::cron::create_handler),
        )
        .route("/api/cron/{id}", delete(crate::http::cron::delete_handler))
        .route("/api/calendar", get(crate::http::calendar::calendar_handler))
        .route("/api/overview", get(crate::http::overview::overview_handler))
        .route(
            "/api/activities",
            get(crate::http::activities::list_handler)
                .post(crate::http::activities::create_handler),
        )
        .route(
            "/api/gmail",
            get(crate::http::gmail::list_handler).patch(crate::http::gmail::mark_handler),
        )
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
