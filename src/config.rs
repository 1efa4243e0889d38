use crate::google::analytics::{DEFAULT_ADMIN_URL, DEFAULT_DATA_URL};
use crate::google::search_console::DEFAULT_SEARCH_CONSOLE_URL;
use serde::Deserialize;
use std::path::Path;

/// Service-account key material. Never printed.
#[derive(Clone)]
pub struct Credentials(String);

impl Credentials {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credentials([redacted])")
    }
}

/// Application configuration loaded from environment variables or TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on handling one inbound request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Timeout applied to each outbound call to Google, in seconds.
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: 30).
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
    #[serde(default = "default_ga4_data_url")]
    pub ga4_data_url: String,
    #[serde(default = "default_ga4_admin_url")]
    pub ga4_admin_url: String,
    #[serde(default = "default_search_console_url")]
    pub search_console_url: String,
    /// Test mode: do not construct upstream clients at all.
    #[serde(default)]
    pub skip_google_init: bool,
    /// Only ever read from `GOOGLE_CREDENTIALS`, never from the file.
    #[serde(skip)]
    pub google_credentials: Option<Credentials>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_request_timeout_secs() -> u64 {
    60
}

const fn default_upstream_timeout_secs() -> u64 {
    30
}

const fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_ga4_data_url() -> String {
    DEFAULT_DATA_URL.to_string()
}

fn default_ga4_admin_url() -> String {
    DEFAULT_ADMIN_URL.to_string()
}

fn default_search_console_url() -> String {
    DEFAULT_SEARCH_CONSOLE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            ga4_data_url: default_ga4_data_url(),
            ga4_admin_url: default_ga4_admin_url(),
            search_console_url: default_search_console_url(),
            skip_google_init: false,
            google_credentials: None,
        }
    }
}

fn env_flag(val: &str) -> bool {
    !val.is_empty() && val != "0" && val.to_lowercase() != "false"
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults.
    ///
    /// Environment variables override file values:
    /// - `DEX_HOST` → host
    /// - `DEX_PORT` (or `PORT`) → port
    /// - `DEX_REQUEST_TIMEOUT` → request_timeout_secs
    /// - `DEX_UPSTREAM_TIMEOUT` → upstream_timeout_secs
    /// - `DEX_SHUTDOWN_TIMEOUT` → shutdown_timeout_secs
    /// - `DEX_GA4_DATA_URL` → ga4_data_url
    /// - `DEX_GA4_ADMIN_URL` → ga4_admin_url
    /// - `DEX_SEARCH_CONSOLE_URL` → search_console_url
    /// - `SKIP_GOOGLE_INIT` → skip_google_init
    /// - `GOOGLE_CREDENTIALS` → google_credentials
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut config =
            config_path.map_or_else(Self::default, |path| match std::fs::read_to_string(path) {
                Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse config file: {e}, using defaults");
                    Self::default()
                }),
                Err(e) => {
                    tracing::warn!("Failed to read config file: {e}, using defaults");
                    Self::default()
                }
            });

        // Environment variable overrides
        if let Ok(host) = std::env::var("DEX_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("DEX_PORT").or_else(|_| std::env::var("PORT")) {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        if let Ok(val) = std::env::var("DEX_REQUEST_TIMEOUT") {
            if let Ok(t) = val.parse() {
                config.request_timeout_secs = t;
            }
        }
        if let Ok(val) = std::env::var("DEX_UPSTREAM_TIMEOUT") {
            if let Ok(t) = val.parse() {
                config.upstream_timeout_secs = t;
            }
        }
        if let Ok(val) = std::env::var("DEX_SHUTDOWN_TIMEOUT") {
            if let Ok(t) = val.parse() {
                config.shutdown_timeout_secs = t;
            }
        }
        if let Ok(url) = std::env::var("DEX_GA4_DATA_URL") {
            config.ga4_data_url = url;
        }
        if let Ok(url) = std::env::var("DEX_GA4_ADMIN_URL") {
            config.ga4_admin_url = url;
        }
        if let Ok(url) = std::env::var("DEX_SEARCH_CONSOLE_URL") {
            config.search_console_url = url;
        }
        if let Ok(val) = std::env::var("SKIP_GOOGLE_INIT") {
            config.skip_google_init = env_flag(&val);
        }
        if let Ok(raw) = std::env::var("GOOGLE_CREDENTIALS") {
            if !raw.trim().is_empty() {
                config.google_credentials = Some(Credentials::new(raw));
            }
        }

        config
    }
}
