use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use pitch_db::RepoError;
use pitch_types::api::ErrorResponse;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Input the caller can fix: bad mockup list, malformed body.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(&'static str),

    /// Wrong or missing admin key.
    #[error("Unauthorized")]
    Unauthorized,

    /// Wrong proposal password.
    #[error("Wrong password")]
    Forbidden,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self) {
        if let ApiError::Internal(e) = self {
            error!("Internal error: {:#}", e);
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(e) => ApiError::Validation(e.to_string()),
            RepoError::NotFound => ApiError::NotFound("Proposal not found"),
            RepoError::Store(e) => ApiError::Internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Same status mapping, plain-text body. Used where the client is a browser
/// frame rather than the JSON API.
pub struct TextError(pub ApiError);

impl IntoResponse for TextError {
    fn into_response(self) -> Response {
        self.0.log();
        (self.0.status(), self.0.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_types::models::MockupError;

    #[test]
    fn repo_errors_map_to_statuses() {
        let v: ApiError = RepoError::Validation(MockupError::TooMany(6)).into();
        assert_eq!(v.status(), StatusCode::BAD_REQUEST);
        assert!(v.to_string().contains("Maximum 5 mockups"));

        let nf: ApiError = RepoError::NotFound.into();
        assert_eq!(nf.status(), StatusCode::NOT_FOUND);

        let store: ApiError = RepoError::Store(anyhow::anyhow!("disk on fire")).into();
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Store details stay in the logs
        assert_eq!(store.to_string(), "Internal server error");
    }

    #[test]
    fn credential_errors_are_generic() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Forbidden.to_string(), "Wrong password");
    }
}
