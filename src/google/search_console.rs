use crate::google::auth::{ServiceAccountKey, TokenProvider, WEBMASTERS_SCOPE};
use crate::google::error::Error;
use crate::google::read_json;
use crate::report::request::SearchAnalyticsRequest;
use crate::report::response::SearchAnalyticsResponse;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SEARCH_CONSOLE_URL: &str = "https://searchconsole.googleapis.com";

/// A site the service account has access to.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    pub site_url: String,
    #[serde(default)]
    pub permission_level: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SitesList {
    #[serde(default)]
    site_entry: Vec<SiteEntry>,
}

/// Client for the Search Console (webmasters v3) API.
pub struct SearchConsoleClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenProvider,
}

/// Percent-encode a site URL as a single path segment (`/` and `:` included).
fn encode_site(site_url: &str) -> String {
    url::form_urlencoded::byte_serialize(site_url.as_bytes()).collect()
}

impl SearchConsoleClient {
    pub fn new(http: reqwest::Client, key: &ServiceAccountKey, base_url: &str) -> Result<Self, Error> {
        let tokens = TokenProvider::new(http.clone(), key, WEBMASTERS_SCOPE)?;
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            tokens,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/webmasters/v3/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        Ok(Url::parse(&full)?)
    }

    /// `GET sites`
    pub async fn list_sites(&self) -> Result<Vec<SiteEntry>, Error> {
        let url = self.endpoint("sites")?;
        let token = self.tokens.access_token().await?;
        let resp = self.http.get(url).bearer_auth(token).send().await?;
        let list: SitesList = read_json(resp).await?;
        Ok(list.site_entry)
    }

    /// `GET sites/{siteUrl}`
    pub async fn get_site(&self, site_url: &str) -> Result<SiteEntry, Error> {
        let url = self.endpoint(&format!("sites/{}", encode_site(site_url)))?;
        let token = self.tokens.access_token().await?;
        let resp = self.http.get(url).bearer_auth(token).send().await?;
        read_json(resp).await
    }

    /// `POST sites/{siteUrl}/searchAnalytics/query`
    pub async fn query(
        &self,
        request: &SearchAnalyticsRequest,
    ) -> Result<SearchAnalyticsResponse, Error> {
        let url = self.endpoint(&format!(
            "sites/{}/searchAnalytics/query",
            encode_site(&request.site_url)
        ))?;
        tracing::debug!(%url, "Sending Search Console query");
        let token = self.tokens.access_token().await?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        read_json(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_site() {
        assert_eq!(
            encode_site("https://example.com/"),
            "https%3A%2F%2Fexample.com%2F"
        );
        assert_eq!(
            encode_site("sc-domain:example.com"),
            "sc-domain%3Aexample.com"
        );
    }

    #[test]
    fn test_deserialize_sites_list() {
        let list: SitesList = serde_json::from_value(serde_json::json!({
            "siteEntry": [
                {"siteUrl": "https://example.com/", "permissionLevel": "siteOwner"},
                {"siteUrl": "sc-domain:example.org"}
            ]
        }))
        .unwrap();
        assert_eq!(list.site_entry.len(), 2);
        assert_eq!(
            list.site_entry[0].permission_level.as_deref(),
            Some("siteOwner")
        );
        assert!(list.site_entry[1].permission_level.is_none());
    }

    #[test]
    fn test_deserialize_empty_sites_list() {
        let list: SitesList = serde_json::from_str("{}").unwrap();
        assert!(list.site_entry.is_empty());
    }
}
