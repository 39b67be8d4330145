use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nf_core::Error;
use serde_json::json;
use tracing::error;

/// Maps core errors onto HTTP responses with a flat `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{} ({})", self.0, self.0.detail().unwrap_or("no detail"));
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
