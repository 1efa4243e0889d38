pub mod errors;
pub mod ga4;
pub mod search_console;

use crate::google::Upstreams;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use errors::{ApiError, MISSING_BODY};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Shared application state.
pub struct AppState {
    pub upstreams: Upstreams,
    /// Upper bound on handling one inbound request.
    pub request_timeout: Duration,
}

/// Decode a JSON request body into `T`.
///
/// An absent, unparseable, `null` or empty-object body is rejected with the
/// same 400 message; a body of the wrong shape reports the field at fault.
pub fn parse_body<T: DeserializeOwned>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) = body?;
    match &value {
        Value::Object(map) if !map.is_empty() => {}
        _ => return Err(ApiError::BadRequest(MISSING_BODY.to_string())),
    }
    serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("Dados da requisição inválidos: {e}")))
}
