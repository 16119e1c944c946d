//! Route definitions for the web server.

use axum::{
    routing::{get, post, put},
    Router,
};

use super::{api, AppState};

/// Create the API router.
fn create_api_router() -> Router<AppState> {
    Router::new()
        // Copilot
        .route("/copilot", post(api::copilot::run_command))
        // Leads
        .route(
            "/leads",
            get(api::leads::list)
                .post(api::leads::create)
                .patch(api::leads::update),
        )
        .route("/sync", post(api::sync::run))
        // Project intelligence
        .route("/proposal", post(api::projects::draft_proposal))
        .route("/summarize", post(api::projects::summarize))
        .route("/next-step", post(api::projects::next_step))
        .route("/project/archive", post(api::projects::archive))
        .route("/projects/:id", get(api::projects::get_bundle))
        .route("/projects/:id/details", put(api::projects::save_details))
        // Telegram webhook
        .route("/telegram", post(api::telegram::webhook))
}

/// Create the full app router.
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_router())
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
