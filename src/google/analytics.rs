use crate::google::auth::{ServiceAccountKey, TokenProvider, ANALYTICS_SCOPE};
use crate::google::error::Error;
use crate::google::read_json;
use crate::report::request::{RunPivotReportRequest, RunReportRequest};
use crate::report::response::{RunPivotReportResponse, RunReportResponse};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_DATA_URL: &str = "https://analyticsdata.googleapis.com";
pub const DEFAULT_ADMIN_URL: &str = "https://analyticsadmin.googleapis.com";

const PAGE_SIZE: &str = "200";

/// A GA4 account as returned by the Admin API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// A GA4 property as returned by the Admin API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub property_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountsPage {
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertiesPage {
    #[serde(default)]
    properties: Vec<Property>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Client for the GA4 Data API (reports) and Admin API (accounts, properties).
pub struct AnalyticsClient {
    http: reqwest::Client,
    data_url: Url,
    admin_url: Url,
    tokens: TokenProvider,
}

impl AnalyticsClient {
    pub fn new(
        http: reqwest::Client,
        key: &ServiceAccountKey,
        data_url: &str,
        admin_url: &str,
    ) -> Result<Self, Error> {
        let tokens = TokenProvider::new(http.clone(), key, ANALYTICS_SCOPE)?;
        Ok(Self {
            http,
            data_url: Url::parse(data_url)?,
            admin_url: Url::parse(admin_url)?,
            tokens,
        })
    }

    fn endpoint(base: &Url, path: &str) -> Result<Url, Error> {
        let full = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&full)?)
    }

    /// `POST v1beta/{property}:runReport`
    pub async fn run_report(&self, request: &RunReportRequest) -> Result<RunReportResponse, Error> {
        let url = Self::endpoint(
            &self.data_url,
            &format!("v1beta/{}:runReport", request.property),
        )?;
        tracing::debug!(%url, "Sending GA4 report request");
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

    /// `POST v1beta/{property}:runPivotReport`
    pub async fn run_pivot_report(
        &self,
        request: &RunPivotReportRequest,
    ) -> Result<RunPivotReportResponse, Error> {
        let url = Self::endpoint(
            &self.data_url,
            &format!("v1beta/{}:runPivotReport", request.property),
        )?;
        tracing::debug!(%url, "Sending GA4 pivot request");
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

    /// List every account visible to the service account, following pages.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, Error> {
        let url = Self::endpoint(&self.admin_url, "v1beta/accounts")?;
        let mut accounts = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let token = self.tokens.access_token().await?;
            let mut req = self
                .http
                .get(url.clone())
                .bearer_auth(token)
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(page) = &page_token {
                req = req.query(&[("pageToken", page.as_str())]);
            }
            let page: AccountsPage = read_json(req.send().await?).await?;
            accounts.extend(page.accounts);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(accounts)
    }

    /// List the properties directly under `account` (e.g. `accounts/123`).
    pub async fn list_properties(&self, account: &str) -> Result<Vec<Property>, Error> {
        let url = Self::endpoint(&self.admin_url, "v1beta/properties")?;
        let filter = format!("parent:{account}");
        let mut properties = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let token = self.tokens.access_token().await?;
            let mut req = self
                .http
                .get(url.clone())
                .bearer_auth(token)
                .query(&[("filter", filter.as_str()), ("pageSize", PAGE_SIZE)]);
            if let Some(page) = &page_token {
                req = req.query(&[("pageToken", page.as_str())]);
            }
            let page: PropertiesPage = read_json(req.send().await?).await?;
            properties.extend(page.properties);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        Ok(properties)
    }
}
