use serde::{Deserialize, Serialize};

use crate::models::{Mockup, ProposalSummary};

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub admin_key: String,
}

/// Body of admin-only calls that carry nothing but the key (list, delete).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminKeyRequest {
    #[serde(default)]
    pub admin_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminKeyQuery {
    pub admin_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

// -- Proposals --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    pub title: String,
    #[serde(default)]
    pub markdown: String,
    pub mockups: Vec<Mockup>,
    pub password: String,
    #[serde(default)]
    pub admin_key: String,
}

#[derive(Debug, Serialize)]
pub struct CreateProposalResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProposalRequest {
    pub title: String,
    #[serde(default)]
    pub markdown: String,
    pub mockups: Vec<Mockup>,
    #[serde(default)]
    pub admin_key: String,
}

#[derive(Debug, Serialize)]
pub struct ProposalListResponse {
    pub proposals: Vec<ProposalSummary>,
}

// -- Reader view --

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    #[serde(default)]
    pub password: String,
}

/// What a reader sees after unlocking: content only, no id or timestamps.
#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub title: String,
    pub markdown: String,
    pub mockups: Vec<Mockup>,
}

#[derive(Debug, Deserialize)]
pub struct MockupQuery {
    pub password: Option<String>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
