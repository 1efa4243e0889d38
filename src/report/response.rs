//! Upstream report response shapes consumed by the formatters.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Value {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub dimension_values: Vec<Value>,
    #[serde(default)]
    pub metric_values: Vec<Value>,
}

impl Row {
    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.dimension_values.iter().map(|v| v.value.as_str())
    }

    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.metric_values.iter().map(|v| v.value.as_str())
    }
}

/// GA4 `runReport` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotDimensionHeader {
    #[serde(default)]
    pub dimension_values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotHeader {
    #[serde(default)]
    pub pivot_dimension_headers: Vec<PivotDimensionHeader>,
}

/// GA4 `runPivotReport` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPivotReportResponse {
    #[serde(default)]
    pub pivot_headers: Vec<PivotHeader>,
    #[serde(default)]
    pub dimension_headers: Vec<Header>,
    #[serde(default)]
    pub metric_headers: Vec<Header>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// One Search Console analytics row: dimension keys plus the fixed metrics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRow {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: Option<serde_json::Number>,
    #[serde(default)]
    pub impressions: Option<serde_json::Number>,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub position: f64,
}

/// Search Console `searchAnalytics.query` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchAnalyticsResponse {
    #[serde(default)]
    pub rows: Vec<SearchRow>,
}
