use thiserror::Error;

/// Failure talking to a Google API or preparing credentials for it.
#[derive(Debug, Error)]
pub enum Error {
    /// The service-account key material could not be used.
    #[error("invalid service account credentials: {0}")]
    Credentials(String),

    /// Signing the JWT assertion failed.
    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL construction failed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success status from the API, with the message it returned.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {message}")]
    Deserialization { message: String, body: String },
}

/// Pull a human-readable message out of a Google error body.
///
/// Handles both the API shape `{"error": {"message": ...}}` and the OAuth
/// shape `{"error": "...", "error_description": "..."}`; falls back to the
/// raw body.
pub fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    if let Some(message) = json
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(serde_json::Value::as_str)
    {
        return message.to_string();
    }
    match (
        json.get("error").and_then(serde_json::Value::as_str),
        json.get("error_description")
            .and_then(serde_json::Value::as_str),
    ) {
        (Some(code), Some(description)) => format!("{code}: {description}"),
        (Some(code), None) => code.to_string(),
        _ => body.trim().to_string(),
    }
}
