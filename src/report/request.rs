use crate::report::dates::resolve_date_now;
use crate::report::fields::{clean_fields, normalize_property_id, normalize_site_url};
use crate::report::filter::{FieldFilter, MatchType};
use crate::report::{QueryError, FLAT_ROW_CAP};
use serde::{Deserialize, Serialize};

/// A flat GA4 report query as received from the caller.
#[derive(Debug, Clone)]
pub struct ReportQuery {
    pub property_id: String,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub filter: Option<FieldFilter>,
    pub limit: Option<u32>,
}

/// A two-axis GA4 crosstab query.
#[derive(Debug, Clone)]
pub struct PivotQuery {
    pub property_id: String,
    pub dimensions: Vec<String>,
    pub pivot_dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub filter: Option<FieldFilter>,
    pub row_limit: u32,
}

// --- GA4 Data API request shapes (v1beta REST JSON) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFilter {
    pub value: String,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field_name: String,
    pub string_filter: StringFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpression {
    pub filter: Filter,
}

impl From<&FieldFilter> for FilterExpression {
    fn from(f: &FieldFilter) -> Self {
        Self {
            filter: Filter {
                field_name: f.field.clone(),
                string_filter: StringFilter {
                    value: f.value.clone(),
                    match_type: f.condition,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricOrderBy {
    pub metric_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub metric: MetricOrderBy,
    pub desc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pivot {
    pub field_names: Vec<String>,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_bys: Vec<OrderBy>,
}

/// Body of `POST v1beta/{property}:runReport`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    /// Resource name, sent in the URL path rather than the body.
    #[serde(skip)]
    pub property: String,
    pub date_ranges: Vec<DateRange>,
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_filter: Option<FilterExpression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Body of `POST v1beta/{property}:runPivotReport`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPivotReportRequest {
    #[serde(skip)]
    pub property: String,
    pub date_ranges: Vec<DateRange>,
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    pub pivots: Vec<Pivot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_filter: Option<FilterExpression>,
}

fn dimensions_of(names: &[String]) -> Vec<Dimension> {
    names
        .iter()
        .map(|name| Dimension { name: name.clone() })
        .collect()
}

fn metrics_of(names: &[String]) -> Vec<Metric> {
    names
        .iter()
        .map(|name| Metric { name: name.clone() })
        .collect()
}

fn date_range(start: &str, end: &str) -> DateRange {
    DateRange {
        start_date: resolve_date_now(start),
        end_date: resolve_date_now(end),
    }
}

/// Build a flat `runReport` request.
///
/// The row limit is clamped to [`FLAT_ROW_CAP`]; callers cannot raise it.
pub fn build_report_request(query: &ReportQuery) -> Result<RunReportRequest, QueryError> {
    let dimensions = clean_fields(&query.dimensions);
    let metrics = clean_fields(&query.metrics);
    if dimensions.is_empty() {
        return Err(QueryError::MissingField("dimensoes"));
    }
    if metrics.is_empty() {
        return Err(QueryError::MissingField("metricas"));
    }

    let property = normalize_property_id(&query.property_id);
    let limit = query.limit.unwrap_or(FLAT_ROW_CAP).clamp(1, FLAT_ROW_CAP);

    tracing::debug!(
        property = %property,
        ?dimensions,
        ?metrics,
        start = %query.start_date,
        end = %query.end_date,
        match_type = ?query.filter.as_ref().map(|f| f.condition),
        "Building GA4 report request"
    );

    Ok(RunReportRequest {
        property,
        date_ranges: vec![date_range(&query.start_date, &query.end_date)],
        dimensions: dimensions_of(&dimensions),
        metrics: metrics_of(&metrics),
        dimension_filter: query.filter.as_ref().map(FilterExpression::from),
        limit: Some(limit),
    })
}

/// Build a `runPivotReport` request with two axes.
///
/// The first axis groups by the primary dimensions; the second by the pivot
/// dimensions, ordered by the first metric descending so the largest pivot
/// values come first.
pub fn build_pivot_request(query: &PivotQuery) -> Result<RunPivotReportRequest, QueryError> {
    let primary = clean_fields(&query.dimensions);
    let pivot = clean_fields(&query.pivot_dimensions);
    let metrics = clean_fields(&query.metrics);
    if primary.is_empty() {
        return Err(QueryError::MissingField("dimensao_principal"));
    }
    if pivot.is_empty() {
        return Err(QueryError::MissingField("dimensao_pivot"));
    }
    let Some(leading_metric) = metrics.first().cloned() else {
        return Err(QueryError::MissingField("metricas"));
    };

    let property = normalize_property_id(&query.property_id);
    let all_dimensions: Vec<String> = primary.iter().chain(pivot.iter()).cloned().collect();

    tracing::debug!(
        property = %property,
        ?primary,
        ?pivot,
        ?metrics,
        row_limit = query.row_limit,
        "Building GA4 pivot request"
    );

    Ok(RunPivotReportRequest {
        property,
        date_ranges: vec![date_range(&query.start_date, &query.end_date)],
        dimensions: dimensions_of(&all_dimensions),
        metrics: metrics_of(&metrics),
        pivots: vec![
            Pivot {
                field_names: primary,
                limit: query.row_limit,
                order_bys: Vec::new(),
            },
            Pivot {
                field_names: pivot,
                limit: query.row_limit,
                order_bys: vec![OrderBy {
                    metric: MetricOrderBy {
                        metric_name: leading_metric,
                    },
                    desc: true,
                }],
            },
        ],
        dimension_filter: query.filter.as_ref().map(FilterExpression::from),
    })
}

// --- Search Console request shapes (webmasters v3 REST JSON) ---

/// One Search Console dimension filter, passed through as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub dimension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    pub expression: String,
}

impl SearchFilter {
    fn contains(dimension: &str, expression: &str) -> Self {
        Self {
            dimension: dimension.to_string(),
            operator: Some("contains".to_string()),
            expression: expression.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterGroup {
    pub filters: Vec<SearchFilter>,
}

/// Body of `POST webmasters/v3/sites/{site}/searchAnalytics/query`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsRequest {
    #[serde(skip)]
    pub site_url: String,
    pub start_date: String,
    pub end_date: String,
    pub dimensions: Vec<String>,
    pub row_limit: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimension_filter_groups: Vec<FilterGroup>,
}

/// A Search Console query as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub site_url: String,
    pub start_date: String,
    pub end_date: String,
    pub dimensions: Vec<String>,
    pub row_limit: u32,
    /// Shorthand for a `query contains <value>` filter.
    pub query_contains: Option<String>,
    /// Shorthand for a `page contains <value>` filter.
    pub page_contains: Option<String>,
    pub filters: Vec<SearchFilter>,
}

/// Build a `searchAnalytics.query` request.
///
/// Dates are resolved to `YYYY-MM-DD` since Search Console does not accept
/// relative expressions. Shorthand filters come first, then custom filters,
/// all in a single AND group.
pub fn build_search_request(query: &SearchQuery) -> SearchAnalyticsRequest {
    let mut filters = Vec::new();
    if let Some(q) = query.query_contains.as_deref().filter(|q| !q.is_empty()) {
        filters.push(SearchFilter::contains("query", q));
    }
    if let Some(p) = query.page_contains.as_deref().filter(|p| !p.is_empty()) {
        filters.push(SearchFilter::contains("page", p));
    }
    filters.extend(query.filters.iter().cloned());

    let dimension_filter_groups = if filters.is_empty() {
        Vec::new()
    } else {
        vec![FilterGroup { filters }]
    };

    SearchAnalyticsRequest {
        site_url: normalize_site_url(&query.site_url),
        start_date: resolve_date_now(&query.start_date),
        end_date: resolve_date_now(&query.end_date),
        dimensions: clean_fields(&query.dimensions),
        row_limit: query.row_limit,
        dimension_filter_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fields::split_fields;

    fn flat_query() -> ReportQuery {
        ReportQuery {
            property_id: "254018746".to_string(),
            dimensions: split_fields("country,city"),
            metrics: split_fields("sessions"),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
            filter: None,
            limit: None,
        }
    }

    fn pivot_query() -> PivotQuery {
        PivotQuery {
            property_id: "properties/1".to_string(),
            dimensions: vec!["country".to_string()],
            pivot_dimensions: vec!["deviceCategory".to_string()],
            metrics: vec!["sessions".to_string(), "totalUsers".to_string()],
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
            filter: None,
            row_limit: 30,
        }
    }

    #[test]
    fn test_flat_request_fields_in_order() {
        let req = build_report_request(&flat_query()).unwrap();
        assert_eq!(
            req.dimensions,
            vec![
                Dimension {
                    name: "country".to_string()
                },
                Dimension {
                    name: "city".to_string()
                }
            ]
        );
        assert_eq!(req.metrics.len(), 1);
        assert_eq!(req.metrics[0].name, "sessions");
    }

    #[test]
    fn test_flat_request_normalizes_property() {
        let req = build_report_request(&flat_query()).unwrap();
        assert_eq!(req.property, "properties/254018746");

        let mut query = flat_query();
        query.property_id = "properties/254018746".to_string();
        let req = build_report_request(&query).unwrap();
        assert_eq!(req.property, "properties/254018746");
    }

    #[test]
    fn test_flat_request_without_filter() {
        let req = build_report_request(&flat_query()).unwrap();
        assert!(req.dimension_filter.is_none());
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("dimensionFilter").is_none());
        assert!(json.get("property").is_none());
    }

    #[test]
    fn test_flat_request_with_filter() {
        let mut query = flat_query();
        query.filter = FieldFilter::from_parts("country", "Brazil", "começa com");
        let req = build_report_request(&query).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["dimensionFilter"],
            serde_json::json!({
                "filter": {
                    "fieldName": "country",
                    "stringFilter": {"value": "Brazil", "matchType": "BEGINS_WITH"}
                }
            })
        );
    }

    #[test]
    fn test_flat_request_wire_shape() {
        let req = build_report_request(&flat_query()).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["dateRanges"],
            serde_json::json!([{"startDate": "2024-01-01", "endDate": "2024-01-31"}])
        );
        assert_eq!(json["limit"], 100);
    }

    #[test]
    fn test_flat_request_limit_is_capped() {
        let mut query = flat_query();
        query.limit = Some(5000);
        assert_eq!(build_report_request(&query).unwrap().limit, Some(100));
        query.limit = Some(10);
        assert_eq!(build_report_request(&query).unwrap().limit, Some(10));
    }

    #[test]
    fn test_flat_request_rejects_empty_fields() {
        let mut query = flat_query();
        query.metrics = Vec::new();
        assert!(matches!(
            build_report_request(&query),
            Err(QueryError::MissingField("metricas"))
        ));

        let mut query = flat_query();
        query.dimensions = vec![" ".to_string()];
        assert!(matches!(
            build_report_request(&query),
            Err(QueryError::MissingField("dimensoes"))
        ));
    }

    #[test]
    fn test_pivot_request_combines_dimensions() {
        let req = build_pivot_request(&pivot_query()).unwrap();
        let names: Vec<&str> = req.dimensions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["country", "deviceCategory"]);
    }

    #[test]
    fn test_pivot_second_axis_sorted_by_first_metric() {
        let req = build_pivot_request(&pivot_query()).unwrap();
        assert_eq!(req.pivots.len(), 2);
        assert!(req.pivots[0].order_bys.is_empty());
        assert_eq!(req.pivots[0].limit, 30);
        assert_eq!(req.pivots[1].field_names, vec!["deviceCategory"]);
        assert_eq!(req.pivots[1].limit, 30);
        assert_eq!(
            req.pivots[1].order_bys,
            vec![OrderBy {
                metric: MetricOrderBy {
                    metric_name: "sessions".to_string()
                },
                desc: true,
            }]
        );
    }

    #[test]
    fn test_pivot_wire_shape() {
        let req = build_pivot_request(&pivot_query()).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["pivots"][0], serde_json::json!({"fieldNames": ["country"], "limit": 30}));
        assert_eq!(
            json["pivots"][1]["orderBys"],
            serde_json::json!([{"metric": {"metricName": "sessions"}, "desc": true}])
        );
    }

    #[test]
    fn test_pivot_request_requires_metric() {
        let mut query = pivot_query();
        query.metrics = Vec::new();
        assert!(build_pivot_request(&query).is_err());
    }

    #[test]
    fn test_search_request_shorthand_filters_first() {
        let query = SearchQuery {
            site_url: "example.com".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
            dimensions: vec!["query".to_string()],
            row_limit: 100,
            query_contains: Some("rust".to_string()),
            page_contains: Some("/blog".to_string()),
            filters: vec![SearchFilter {
                dimension: "country".to_string(),
                operator: Some("equals".to_string()),
                expression: "bra".to_string(),
            }],
        };
        let req = build_search_request(&query);
        assert_eq!(req.site_url, "https://example.com/");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json["dimensionFilterGroups"],
            serde_json::json!([{"filters": [
                {"dimension": "query", "operator": "contains", "expression": "rust"},
                {"dimension": "page", "operator": "contains", "expression": "/blog"},
                {"dimension": "country", "operator": "equals", "expression": "bra"}
            ]}])
        );
        assert_eq!(json["rowLimit"], 100);
        assert_eq!(json["startDate"], "2024-01-01");
    }

    #[test]
    fn test_search_request_without_filters() {
        let query = SearchQuery {
            site_url: "https://example.com/".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
            dimensions: vec!["page".to_string()],
            row_limit: 10,
            ..SearchQuery::default()
        };
        let json = serde_json::to_value(build_search_request(&query)).unwrap();
        assert!(json.get("dimensionFilterGroups").is_none());
    }

    #[test]
    fn test_search_request_resolves_relative_dates() {
        let query = SearchQuery {
            site_url: "example.com".to_string(),
            start_date: "30daysAgo".to_string(),
            end_date: "today".to_string(),
            dimensions: vec!["query".to_string()],
            row_limit: 100,
            ..SearchQuery::default()
        };
        let req = build_search_request(&query);
        assert_eq!(req.end_date, chrono::Utc::now().date_naive().to_string());
        assert_ne!(req.start_date, "30daysAgo");
    }
}
