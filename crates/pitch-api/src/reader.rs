//! Password-gated reader endpoints.
//!
//! Unknown ids answer 404 and wrong passwords 403; nothing else about a
//! proposal is revealed until the password checks out. The mockup index is
//! only looked at after that, so the mockup count stays private too.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::Response,
};

use pitch_types::api::{MockupQuery, UnlockRequest, UnlockResponse};
use pitch_types::models::Proposal;

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult, TextError};
use crate::render;

/// POST /api/unlock/{id}
pub async fn unlock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UnlockRequest>, JsonRejection>,
) -> ApiResult<Json<UnlockResponse>> {
    let Json(req) = payload?;
    let proposal = authorize(&state, id, req.password).await?;

    Ok(Json(UnlockResponse {
        title: proposal.title,
        markdown: proposal.markdown,
        mockups: proposal.mockups,
    }))
}

/// GET /api/mockup/{id}/{index}?password=...
///
/// Serves a single mockup as a standalone, locked-down HTML document.
/// Errors are plain text since the caller is usually an iframe.
pub async fn render_mockup(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, String)>,
    Query(query): Query<MockupQuery>,
) -> Result<Response, TextError> {
    render_authorized(&state, id, &index, query.password)
        .await
        .map_err(TextError)
}

async fn render_authorized(
    state: &AppState,
    id: String,
    index: &str,
    password: Option<String>,
) -> ApiResult<Response> {
    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::BadRequest("Password is required"))?;

    let proposal = authorize(state, id, password).await?;

    index
        .parse::<i64>()
        .ok()
        .and_then(|i| render::render(&proposal, i))
        .ok_or(ApiError::NotFound("Mockup not found"))
}

/// Load a proposal and check the reader's password against it.
async fn authorize(state: &AppState, id: String, password: String) -> ApiResult<Proposal> {
    let db = state.clone();
    let (proposal, stored_hash) = blocking(move || db.db.get_proposal_with_hash(&id)).await??;

    state.require_password(password, stored_hash).await?;
    Ok(proposal)
}
