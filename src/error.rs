//! Error types for the gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::remote::FetchError;

// == Gateway Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The remote server has no such file
    #[error("File not found on remote server: {0}")]
    NotFound(String),

    /// Reading the file from the remote server failed
    #[error("Error reading file from remote server: {0}")]
    Transfer(String),

    /// The request path could not be decoded
    #[error("Invalid request path: {0}")]
    InvalidPath(String),
}

impl From<FetchError> for GatewayError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound(path) => GatewayError::NotFound(path),
            FetchError::Transient(msg) => GatewayError::Transfer(msg),
        }
    }
}

impl GatewayError {
    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Transfer(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string()
        }));

        (self.status(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;
