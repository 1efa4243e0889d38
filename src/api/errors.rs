use crate::report::QueryError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Message for a request whose JSON body is absent or empty.
pub const MISSING_BODY: &str = "Dados da requisição não fornecidos";

/// API error type with HTTP status code mapping.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed(String),
    /// The upstream client needed for the request was never initialized.
    Unavailable(String),
    /// The upstream call itself failed.
    Upstream(String),
    /// The request did not finish within the configured timeout.
    Timeout(String),
    /// A handler panicked.
    Internal(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::MethodNotAllowed(msg) => write!(f, "Method not allowed: {msg}"),
            Self::Unavailable(msg) => write!(f, "Service unavailable: {msg}"),
            Self::Upstream(msg) => write!(f, "Upstream error: {msg}"),
            Self::Timeout(msg) => write!(f, "Timeout: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::MethodNotAllowed(msg)
            | Self::Unavailable(msg)
            | Self::Upstream(msg)
            | Self::Timeout(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// The failure envelope every error response shares.
fn envelope(message: &str) -> serde_json::Value {
    serde_json::json!({ "erro": message, "sucesso": false })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Upstream(msg) => tracing::warn!(error = %msg, "Upstream call failed"),
            Self::Internal(msg) => tracing::error!(error = %msg, "Internal error"),
            _ => {}
        }
        (status, Json(envelope(self.message()))).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                Self::BadRequest(format!("Dados da requisição inválidos: {}", e.body_text()))
            }
            _ => Self::BadRequest(MISSING_BODY.to_string()),
        }
    }
}
