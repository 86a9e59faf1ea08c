//! Contains all the routes that this application can handle.

mod downloads;
mod installs;
mod subscribe;
mod support;

// re-export errors
pub use downloads::DownloadError;
pub use installs::InstallsError;
pub use subscribe::SubscribeError;
pub use support::SupportError;

use crate::AppState;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/downloads/{slug}", get(downloads::download))
        .with_state(app_state.clone())
        .nest("/api", api_routes(app_state))
        .route("/health-check", get(health_check))
}

/// API - Routes nested under "/api" path
fn api_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/installs",
            get(installs::get_installs).post(installs::update_installs),
        )
        .route("/subscribe", post(subscribe::subscribe))
        .route("/support", post(support::support))
        .with_state(app_state)
}
