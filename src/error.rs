// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Request-scoped error carrying a `"<httpStatus>-<subcode>"` result code and
/// a client-facing message. The numeric prefix doubles as the transport status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{result_code}: {msg}")]
pub struct ApiError {
    pub result_code: String,
    pub msg: String,
}

impl ApiError {
    pub fn new(result_code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            result_code: result_code.into(),
            msg: msg.into(),
        }
    }

    /// Numeric portion of the result code; anything unparseable is a 500.
    pub fn status_code(&self) -> u16 {
        self.result_code
            .split('-')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(500)
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "resultCode": self.result_code,
            "msg": self.msg,
        })
    }
}

impl From<crate::database::repository::StoreError> for ApiError {
    fn from(err: crate::database::repository::StoreError) -> Self {
        // Log the real error but return a generic message
        tracing::error!("store error: {}", err);
        ApiError::new("500-1", "An error occurred while processing your request.")
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
