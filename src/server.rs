use crate::api::errors::ApiError;
use crate::api::{ga4, search_console, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/", get(service_status))
        .route("/health", get(health_check))
        .route("/ga4/accounts", get(ga4::list_accounts))
        .route("/ga4/query", post(ga4::query))
        .route("/ga4/pivot", post(ga4::pivot))
        .route("/search-console/sites", get(search_console::list_sites))
        .route("/search-console/query", post(search_console::query))
        .route("/search-console/verify", post(search_console::verify))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(axum::middleware::map_response(timeout_envelope))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /: Service identity and upstream readiness.
async fn service_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "Dex Analytics API - GPT Compatible",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "ga4_initialized": state.upstreams.analytics.is_ready(),
        "search_console_initialized": state.upstreams.search_console.is_ready(),
    }))
}

/// GET /health: Simple health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Endpoint não encontrado".to_string())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Método não permitido".to_string())
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    ApiError::Internal("Erro interno do servidor".to_string()).into_response()
}

/// Give the bare 408 produced by the timeout layer the JSON error body.
async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!("Request timed out");
        return ApiError::Timeout("Tempo limite da requisição excedido".to_string())
            .into_response();
    }
    response
}
