//! Error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pm25_common::Pm25Error;
use serde_json::json;
use tracing::error;

use crate::metrics;

/// A [`Pm25Error`] rendered as `{"error": ..., "kind": ...}`.
#[derive(Debug)]
pub struct ApiError(pub Pm25Error);

impl From<Pm25Error> for ApiError {
    fn from(err: Pm25Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let kind = self.0.kind();

        error!(kind, status = status.as_u16(), error = %self.0, "Map request failed");
        metrics::record_request(kind);

        let body = json!({
            "error": self.0.to_string(),
            "kind": kind,
        });
        (status, Json(body)).into_response()
    }
}
