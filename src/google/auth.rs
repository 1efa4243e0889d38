use crate::google::error::Error;
use crate::google::read_json;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const ANALYTICS_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";
pub const WEBMASTERS_SCOPE: &str = "https://www.googleapis.com/auth/webmasters.readonly";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The subset of a Google service-account JSON key this service needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: String,
    pub client_email: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"[redacted]")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse a service-account key from its JSON text.
    pub fn from_json(raw: &str) -> Result<Self, Error> {
        serde_json::from_str(raw).map_err(|e| Error::Credentials(format!("malformed JSON: {e}")))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

const fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// OAuth2 access tokens for one scope, obtained with the JWT-bearer grant.
///
/// The last token is reused until it is within [`REFRESH_MARGIN`] of expiry.
pub struct TokenProvider {
    http: reqwest::Client,
    client_email: String,
    private_key_id: Option<String>,
    token_uri: String,
    encoding_key: EncodingKey,
    scope: &'static str,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Prepare a provider. Fails if the private key is not a valid RSA PEM.
    pub fn new(
        http: reqwest::Client,
        key: &ServiceAccountKey,
        scope: &'static str,
    ) -> Result<Self, Error> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| Error::Credentials(format!("unusable private key: {e}")))?;
        Ok(Self {
            http,
            client_email: key.client_email.clone(),
            private_key_id: key.private_key_id.clone(),
            token_uri: key.token_uri.clone(),
            encoding_key,
            scope,
            cached: Mutex::new(None),
        })
    }

    fn cached_token(&self) -> Option<String> {
        self.cached
            .lock()
            .as_ref()
            .filter(|t| t.expires_at > Instant::now() + REFRESH_MARGIN)
            .map(|t| t.token.clone())
    }

    /// Return a valid bearer token, exchanging a fresh assertion if needed.
    pub async fn access_token(&self) -> Result<String, Error> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *self.cached.lock() = Some(fresh);
        Ok(token)
    }

    async fn fetch(&self) -> Result<CachedToken, Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: self.scope,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.private_key_id);
        let assertion = jsonwebtoken::encode(&header, &claims, &self.encoding_key)?;

        tracing::debug!(scope = self.scope, token_uri = %self.token_uri, "Requesting access token");

        let resp = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let parsed: TokenResponse = read_json(resp).await?;

        Ok(CachedToken {
            token: parsed.access_token,
            expires_at: Instant::now() + Duration::from_secs(parsed.expires_in),
        })
    }
}
