//! Clients for the upstream Google reporting services.

pub mod analytics;
pub mod auth;
pub mod error;
pub mod listing;
pub mod search_console;

use crate::config::Config;
use analytics::AnalyticsClient;
use auth::ServiceAccountKey;
use error::{error_message, Error};
use search_console::SearchConsoleClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Reason recorded when test mode disables the upstream clients.
pub const TEST_MODE_REASON: &str = "Modo de teste - Google APIs não disponíveis";

/// Decode a JSON response, turning non-success statuses into [`Error::Api`].
pub(crate) async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

/// An upstream client that is either ready or records why it is not.
pub enum UpstreamSlot<T> {
    Ready(T),
    Unavailable(String),
}

impl<T> UpstreamSlot<T> {
    /// Borrow the client, or the reason it was not initialized.
    pub fn get(&self) -> Result<&T, &str> {
        match self {
            Self::Ready(client) => Ok(client),
            Self::Unavailable(reason) => Err(reason),
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    fn from_result<E: std::fmt::Display>(service: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(client) => {
                tracing::info!(service, "Upstream client initialized");
                Self::Ready(client)
            }
            Err(e) => {
                tracing::error!(service, error = %e, "Upstream client initialization failed");
                Self::Unavailable(e.to_string())
            }
        }
    }
}

/// The long-lived upstream clients, built once before serving.
pub struct Upstreams {
    pub analytics: UpstreamSlot<AnalyticsClient>,
    pub search_console: UpstreamSlot<SearchConsoleClient>,
}

impl Upstreams {
    /// Both clients unavailable for the same reason.
    pub fn unavailable(reason: &str) -> Self {
        Self {
            analytics: UpstreamSlot::Unavailable(reason.to_string()),
            search_console: UpstreamSlot::Unavailable(reason.to_string()),
        }
    }

    /// Build the clients from configuration.
    ///
    /// Never fails: missing or unusable credentials leave the affected
    /// clients unavailable, and every request that needs them reports why.
    pub fn from_config(config: &Config) -> Self {
        if config.skip_google_init {
            tracing::warn!("SKIP_GOOGLE_INIT set, upstream clients disabled");
            return Self::unavailable(TEST_MODE_REASON);
        }

        let Some(credentials) = config.google_credentials.as_ref() else {
            tracing::error!("GOOGLE_CREDENTIALS not set, upstream clients disabled");
            return Self::unavailable("Variável GOOGLE_CREDENTIALS não encontrada");
        };

        let key = match ServiceAccountKey::from_json(credentials.expose()) {
            Ok(key) => key,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse GOOGLE_CREDENTIALS");
                return Self::unavailable(&e.to_string());
            }
        };
        tracing::info!(
            key_type = %key.key_type,
            client_email = %key.client_email,
            "Service account credentials parsed"
        );

        let http = match reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .user_agent(concat!("dex-analytics/", env!("CARGO_PKG_VERSION")))
            .build()
        {
            Ok(http) => http,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build HTTP client");
                return Self::unavailable(&e.to_string());
            }
        };

        Self {
            analytics: UpstreamSlot::from_result(
                "ga4",
                AnalyticsClient::new(
                    http.clone(),
                    &key,
                    &config.ga4_data_url,
                    &config.ga4_admin_url,
                ),
            ),
            search_console: UpstreamSlot::from_result(
                "search_console",
                SearchConsoleClient::new(http, &key, &config.search_console_url),
            ),
        }
    }
}
