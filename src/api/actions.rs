use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use crate::api::AppState;
use crate::audit::{ActionRequest, AuditEntry, RecordOutcome};
use crate::error::AuditError;

pub struct ApiError(AuditError);

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AuditError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuditError::LogSubmissionError { .. } | AuditError::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            AuditError::PersistenceError(_) | AuditError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("Audit request failed: {}", self.0);
        }

        let body = serde_json::json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "iaoms-audit",
        "timestamp": chrono::Utc::now()
    }))
}

pub async fn record_action(
    State(state): State<AppState>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<RecordOutcome>, ApiError> {
    // Malformed bodies follow the same error contract as invalid fields.
    let Json(request) =
        payload.map_err(|rejection| AuditError::ValidationError(rejection.body_text()))?;
    let outcome = state.recorder.record_action(request).await?;
    Ok(Json(outcome))
}

pub async fn list_entries(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    Ok(Json(state.recorder.entries().await?))
}
