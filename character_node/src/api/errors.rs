//! API error responses

use crate::errors::CharacterError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    /// Machine-readable failure class, e.g. `not_owner` or `expired`
    pub kind: String,
    pub details: Option<serde_json::Value>,
    pub timestamp: u64,
}

impl ApiError {
    pub fn new(code: u16, kind: &str, message: String) -> Self {
        Self {
            code,
            message,
            kind: kind.to_string(),
            details: None,
            timestamp: chrono::Utc::now().timestamp() as u64,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(400, "bad_request", message.to_string())
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new(500, "internal_error", message.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<CharacterError> for ApiError {
    fn from(err: CharacterError) -> Self {
        let code = match &err {
            CharacterError::RecordNotFound(_) | CharacterError::InvalidId(_) => 404,
            CharacterError::SignatureInvalid(_) | CharacterError::Expired { .. } => 401,
            CharacterError::NotOwner { .. } => 403,
            CharacterError::ValidationFailed { .. } => 422,
            CharacterError::OracleUnavailable(_) => 503,
            CharacterError::StoreIo(_) => 500,
        };
        let details = match &err {
            CharacterError::RecordNotFound(id) | CharacterError::InvalidId(id) => {
                Some(serde_json::json!({ "token_id": id }))
            }
            CharacterError::NotOwner { signer, owner } => {
                Some(serde_json::json!({ "signer": signer, "owner": owner }))
            }
            CharacterError::Expired { exp, now } => {
                Some(serde_json::json!({ "exp": exp, "now": now }))
            }
            CharacterError::ValidationFailed { field, reason } => {
                Some(serde_json::json!({ "field": field, "reason": reason }))
            }
            _ => None,
        };

        let mut api_error = ApiError::new(code, err.kind(), err.to_string());
        api_error.details = details;
        api_error
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(&format!("Invalid request body: {}", rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
