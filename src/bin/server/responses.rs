//! JSON bodies returned by the HTTP handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Response from a structured file conversion
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    #[serde(rename = "structuredData")]
    pub structured_data: serde_json::Value,
}

/// Error body; the message is fixed per failure kind and carries no internals.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn respond(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(ErrorResponse {
                error: message.into(),
            }),
        )
            .into_response()
    }
}
