//! Authoring endpoints. Every handler checks the admin key first.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use pitch_db::NewProposal;
use pitch_types::api::{
    AdminKeyQuery, AdminKeyRequest, CreateProposalRequest, CreateProposalResponse,
    ProposalListResponse, SuccessResponse, UpdateProposalRequest,
};
use pitch_types::models::{Proposal, validate_mockups};

use crate::auth::AppState;
use crate::blocking;
use crate::error::{ApiError, ApiResult};

/// POST /api/proposals
pub async fn create_proposal(
    State(state): State<AppState>,
    payload: Result<Json<CreateProposalRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) = payload?;
    state.require_admin(&req.admin_key)?;

    // Reject bad input before paying for the hash
    validate_mockups(&req.mockups).map_err(|e| ApiError::Validation(e.to_string()))?;
    if req.password.is_empty() {
        return Err(ApiError::Validation("Password is required".into()));
    }

    let hashing = state.clone();
    let password = req.password;
    let password_hash = blocking(move || hashing.hasher.hash(&password))
        .await?
        .map_err(|e| ApiError::Internal(e.into()))?;

    let new = NewProposal {
        title: req.title,
        markdown: req.markdown,
        mockups: req.mockups,
        password_hash,
    };
    let db = state.clone();
    let id = blocking(move || db.db.create_proposal(&new)).await??;

    Ok((StatusCode::CREATED, Json(CreateProposalResponse { id })))
}

/// GET /api/proposals/{id}?adminKey=...
pub async fn get_proposal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AdminKeyQuery>,
) -> ApiResult<Json<Proposal>> {
    state.require_admin(query.admin_key.as_deref().unwrap_or_default())?;

    let db = state.clone();
    let proposal = blocking(move || db.db.get_proposal(&id)).await??;
    Ok(Json(proposal))
}

/// PUT /api/proposals/{id}
pub async fn update_proposal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProposalRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(req) = payload?;
    state.require_admin(&req.admin_key)?;

    let db = state.clone();
    blocking(move || {
        db.db
            .update_proposal(&id, &req.title, &req.markdown, &req.mockups)
    })
    .await??;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/proposals/{id}
pub async fn delete_proposal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AdminKeyRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(req) = payload?;
    state.require_admin(&req.admin_key)?;

    let db = state.clone();
    blocking(move || db.db.delete_proposal(&id)).await??;
    Ok(Json(SuccessResponse::with_message("Proposal deleted successfully")))
}

/// POST /api/proposals/list
pub async fn list_proposals(
    State(state): State<AppState>,
    payload: Result<Json<AdminKeyRequest>, JsonRejection>,
) -> ApiResult<Json<ProposalListResponse>> {
    let Json(req) = payload?;
    state.require_admin(&req.admin_key)?;

    let db = state.clone();
    let proposals = blocking(move || db.db.list_proposals()).await??;
    Ok(Json(ProposalListResponse { proposals }))
}
