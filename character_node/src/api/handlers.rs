use super::errors::{ApiError, ApiResult};
use super::AppState;
use crate::models::{Character, UpdateEnvelope};
use crate::service::coerce_token_id;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// JSON body indented by two spaces, the layout metadata readers are served.
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec_pretty(&self.0) {
            Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => ApiError::internal_error(&format!("Failed to encode response: {}", e))
                .into_response(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_characters(
    State(state): State<AppState>,
) -> ApiResult<PrettyJson<Vec<Character>>> {
    Ok(PrettyJson(state.service.list_characters().await?))
}

/// Responds with the record, or `null` when no character has this id.
pub async fn get_character(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> ApiResult<PrettyJson<Option<Character>>> {
    Ok(PrettyJson(state.service.get_character(&token_id).await?))
}

pub async fn update_character(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
    body: Result<Json<UpdateEnvelope>, JsonRejection>,
) -> ApiResult<Json<Character>> {
    let Json(envelope) = body?;

    if coerce_token_id(&token_id) != Some(envelope.payload.sub) {
        return Err(ApiError::bad_request("Path token id does not match payload.sub")
            .with_details(serde_json::json!({
                "token_id": token_id,
                "sub": envelope.payload.sub
            })));
    }

    Ok(Json(state.service.update_character(&envelope).await?))
}
