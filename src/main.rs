use dex_analytics::api::AppState;
use dex_analytics::config::Config;
use dex_analytics::google::Upstreams;
use dex_analytics::server;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dex_analytics=info,tower_http=info".into());
    let json_logs = std::env::var("DEX_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref().map(std::path::Path::new));

    tracing::info!(
        host = %config.host,
        port = config.port,
        skip_google_init = config.skip_google_init,
        credentials_present = config.google_credentials.is_some(),
        "Starting Dex Analytics"
    );

    let state = Arc::new(AppState {
        upstreams: Upstreams::from_config(&config),
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    });

    let app = server::build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %addr, "Listening");

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(());
    let serving = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, draining connections");
            let _ = shutdown_tx.send(());
        })
        .into_future();

    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let drain_deadline = async move {
        let _ = shutdown_rx.changed().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = serving => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Server error");
                std::process::exit(1);
            }
            tracing::info!("Server stopped");
        }
        () = drain_deadline => {
            tracing::warn!(
                timeout_secs = config.shutdown_timeout_secs,
                "Shutdown timeout elapsed, dropping open connections"
            );
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
