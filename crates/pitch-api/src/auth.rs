use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::warn;

use pitch_crypto::{AdminKey, PasswordHasher};
use pitch_db::Database;
use pitch_types::api::{LoginRequest, SuccessResponse};

use crate::blocking;
use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub admin_key: AdminKey,
    pub hasher: PasswordHasher,
}

impl AppStateInner {
    /// Gate for authoring operations. Runs before any store access so a
    /// caller without the key learns nothing about stored proposals.
    pub fn require_admin(&self, candidate: &str) -> ApiResult<()> {
        if self.admin_key.verify(candidate) {
            Ok(())
        } else {
            warn!("Rejected admin request: invalid admin key");
            Err(ApiError::Unauthorized)
        }
    }

    /// Check a reader's password against the stored hash on the blocking pool.
    pub async fn require_password(
        self: &Arc<Self>,
        candidate: String,
        stored_hash: String,
    ) -> ApiResult<()> {
        let state = self.clone();
        let ok = blocking(move || state.hasher.verify(&candidate, &stored_hash)).await?;
        if ok {
            Ok(())
        } else {
            warn!("Rejected reader request: wrong password");
            Err(ApiError::Forbidden)
        }
    }
}

/// POST /api/auth/login
///
/// Lets the admin UI check a key before using it.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(req) = payload?;
    state.require_admin(&req.admin_key)?;
    Ok(Json(SuccessResponse::ok()))
}
