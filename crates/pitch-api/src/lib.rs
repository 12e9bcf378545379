pub mod auth;
pub mod error;
pub mod proposals;
pub mod reader;
pub mod render;

use axum::{
    Router,
    routing::{get, post},
};
use tracing::error;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};

/// All routes, with state attached. Layers (tracing, body limits) are
/// added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/proposals", post(proposals::create_proposal))
        .route("/api/proposals/list", post(proposals::list_proposals))
        .route(
            "/api/proposals/{id}",
            get(proposals::get_proposal)
                .put(proposals::update_proposal)
                .delete(proposals::delete_proposal),
        )
        .route("/api/unlock/{id}", post(reader::unlock))
        .route("/api/mockup/{id}/{index}", get(reader::render_mockup))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Run blocking work (SQLite, Argon2) off the async runtime.
pub(crate) async fn blocking<F, T>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })
}
