use crate::report::request::{RunReportRequest, SearchQuery};
use crate::report::response::{Header, RunPivotReportResponse, RunReportResponse, SearchRow};
use crate::report::{FLAT_ROW_CAP, PIVOT_DISPLAY_CAP, TOP_RECORDS};
use serde::Serialize;
use serde_json::{Map, Value};

/// Column separator of the flat text table.
pub const DELIMITER: &str = " | ";

/// Text returned for a flat report with no rows.
pub const NO_ROWS_MESSAGE: &str = "Nenhum dado encontrado com esse filtro.";

/// A labeled record; keys keep their insertion order on the wire.
pub type Record = Map<String, Value>;

/// Render a header line followed by at most [`FLAT_ROW_CAP`] row lines.
pub fn format_table<H, R>(headers: &[H], rows: R) -> String
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<String>>,
{
    let header = headers
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(DELIMITER);
    let mut lines = vec![header];
    lines.extend(
        rows.into_iter()
            .take(FLAT_ROW_CAP as usize)
            .map(|row| row.join(DELIMITER)),
    );
    lines.join("\n")
}

/// Render a GA4 flat report as a pipe-delimited table.
///
/// Headers come from the request (dimensions, then metrics) so the column
/// order matches what the caller asked for.
pub fn format_report(request: &RunReportRequest, response: &RunReportResponse) -> String {
    if response.rows.is_empty() {
        return NO_ROWS_MESSAGE.to_string();
    }

    let headers: Vec<&str> = request
        .dimensions
        .iter()
        .map(|d| d.name.as_str())
        .chain(request.metrics.iter().map(|m| m.name.as_str()))
        .collect();

    let rows = response.rows.iter().map(|row| {
        row.dimensions()
            .chain(row.metrics())
            .map(String::from)
            .collect::<Vec<_>>()
    });

    format_table(&headers, rows)
}

/// Rebuild labeled records from a pipe-delimited table.
///
/// Lines whose column count differs from the header are skipped. Text with
/// no data lines (including [`NO_ROWS_MESSAGE`]) yields no records.
pub fn parse_table(text: &str) -> Vec<Record> {
    let mut lines = text.split('\n');
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(DELIMITER).collect();

    lines
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let values: Vec<&str> = line.split(DELIMITER).collect();
            (values.len() == headers.len()).then(|| {
                headers
                    .iter()
                    .zip(values)
                    .map(|(h, v)| ((*h).to_string(), Value::String(v.to_string())))
                    .collect()
            })
        })
        .collect()
}

/// Totals attached to a flat GA4 query result.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_sessoes: u64,
    pub top_paises: Vec<Record>,
}

/// Sum the `sessions` column and keep the leading records.
///
/// Values that do not parse as an unsigned integer count as zero.
pub fn summarize(records: &[Record]) -> ReportSummary {
    let total_sessoes = records
        .iter()
        .filter_map(|r| r.get("sessions").and_then(Value::as_str))
        .filter_map(|v| v.trim().parse::<u64>().ok())
        .sum();
    ReportSummary {
        total_sessoes,
        top_paises: records.iter().take(TOP_RECORDS).cloned().collect(),
    }
}

/// Display label for a Search Console dimension.
pub fn dimension_label(dimension: &str) -> String {
    match dimension {
        "query" => "Consulta".to_string(),
        "page" => "Página".to_string(),
        "country" => "País".to_string(),
        "device" => "Dispositivo".to_string(),
        "date" => "Data".to_string(),
        other => format!("Dimensão {other}"),
    }
}

fn number_or_zero(n: Option<&serde_json::Number>) -> Value {
    n.map_or_else(|| Value::from(0), |n| Value::Number(n.clone()))
}

/// Turn Search Console rows into records with display labels.
///
/// Clicks and impressions are always present; with `extra` the click-through
/// rate (as a percentage) and average position are appended, both with two
/// decimals.
pub fn format_search_rows(dimensions: &[String], rows: &[SearchRow], extra: bool) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            let mut record = Record::new();
            for (dimension, key) in dimensions.iter().zip(&row.keys) {
                record.insert(dimension_label(dimension), Value::String(key.clone()));
            }
            record.insert("Cliques".to_string(), number_or_zero(row.clicks.as_ref()));
            record.insert(
                "Impressões".to_string(),
                number_or_zero(row.impressions.as_ref()),
            );
            if extra {
                record.insert(
                    "CTR".to_string(),
                    Value::String(format!("{:.2}%", row.ctr * 100.0)),
                );
                record.insert(
                    "Posição Média".to_string(),
                    Value::String(format!("{:.2}", row.position)),
                );
            }
            record
        })
        .collect()
}

/// Describe the filters of a Search Console query, shorthands first.
pub fn describe_filters(query: &SearchQuery) -> Vec<String> {
    let mut applied = Vec::new();
    if let Some(q) = query.query_contains.as_deref().filter(|q| !q.is_empty()) {
        applied.push(format!("Query contém: '{q}'"));
    }
    if let Some(p) = query.page_contains.as_deref().filter(|p| !p.is_empty()) {
        applied.push(format!("Página contém: '{p}'"));
    }
    applied.extend(query.filters.iter().map(|f| {
        format!(
            "{} {} '{}'",
            f.dimension,
            f.operator.as_deref().unwrap_or("equals"),
            f.expression
        )
    }));
    applied
}

/// Render a GA4 pivot report as a multi-section text block.
pub fn format_pivot(response: &RunPivotReportResponse) -> String {
    let names = |headers: &[Header]| {
        headers
            .iter()
            .map(|h| h.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = vec![
        "Resultados da consulta pivot:".to_string(),
        format!("Dimensões: {}", names(&response.dimension_headers)),
        format!("Métricas: {}", names(&response.metric_headers)),
    ];

    if !response.pivot_headers.is_empty() {
        lines.push("\nCabeçalhos de Pivot:".to_string());
        for (i, pivot) in response.pivot_headers.iter().enumerate() {
            lines.push(format!("Pivot {}:", i + 1));
            for (j, header) in pivot.pivot_dimension_headers.iter().enumerate() {
                let values: Vec<&str> = header
                    .dimension_values
                    .iter()
                    .map(|v| v.value.as_str())
                    .collect();
                lines.push(format!("  Cabeçalho {}: {}", j + 1, values.join(DELIMITER)));
            }
        }
    }

    if response.rows.is_empty() {
        lines.push("\nNenhum dado encontrado.".to_string());
    } else {
        lines.push("\nDados:".to_string());
        for (i, row) in response.rows.iter().take(PIVOT_DISPLAY_CAP).enumerate() {
            let dims: Vec<&str> = row.dimensions().collect();
            let mets: Vec<&str> = row.metrics().collect();
            lines.push(format!(
                "Linha {}: {} => {}",
                i + 1,
                dims.join(DELIMITER),
                mets.join(DELIMITER)
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::request::{build_report_request, ReportQuery};
    use crate::report::response::{PivotDimensionHeader, PivotHeader, Row};

    fn row(dims: &[&str], mets: &[&str]) -> Row {
        let values = |vs: &[&str]| {
            vs.iter()
                .map(|v| crate::report::response::Value {
                    value: (*v).to_string(),
                })
                .collect()
        };
        Row {
            dimension_values: values(dims),
            metric_values: values(mets),
        }
    }

    fn request() -> RunReportRequest {
        build_report_request(&ReportQuery {
            property_id: "1".to_string(),
            dimensions: vec!["country".to_string()],
            metrics: vec!["sessions".to_string()],
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
            filter: None,
            limit: None,
        })
        .unwrap()
    }

    #[test]
    fn test_format_single_row() {
        let response = RunReportResponse {
            rows: vec![row(&["BR"], &["120"])],
        };
        assert_eq!(
            format_report(&request(), &response),
            "country | sessions\nBR | 120"
        );
    }

    #[test]
    fn test_format_truncates_to_cap() {
        let response = RunReportResponse {
            rows: (0..150).map(|i| row(&["BR"], &[i.to_string().as_str()])).collect(),
        };
        let text = format_report(&request(), &response);
        assert_eq!(text.lines().count(), 101);
        assert!(text.ends_with("BR | 99"));
    }

    #[test]
    fn test_format_empty_response() {
        let text = format_report(&request(), &RunReportResponse::default());
        assert_eq!(text, NO_ROWS_MESSAGE);
        assert!(parse_table(&text).is_empty());
    }

    #[test]
    fn test_parse_table() {
        let records = parse_table("country | sessions\nBR | 120\n\nUS | 80");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["country"], "BR");
        assert_eq!(records[0]["sessions"], "120");
        assert_eq!(records[1]["country"], "US");
    }

    #[test]
    fn test_parse_table_skips_ragged_rows() {
        let records = parse_table("country | sessions\nBR | 120 | extra\nUS | 80");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["country"], "US");
    }

    #[test]
    fn test_parse_table_preserves_column_order() {
        let records = parse_table("sessions | country\n5 | BR");
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["sessions", "country"]);
    }

    #[test]
    fn test_summarize() {
        let text = format_table(
            &["country", "sessions"],
            (0..12).map(|i| vec![format!("C{i}"), "10".to_string()]),
        );
        let records = parse_table(&text);
        let summary = summarize(&records);
        assert_eq!(summary.total_sessoes, 120);
        assert_eq!(summary.top_paises.len(), 10);
    }

    #[test]
    fn test_summarize_without_sessions_column() {
        let records = parse_table("country | totalUsers\nBR | 7");
        assert_eq!(summarize(&records).total_sessoes, 0);
    }

    #[test]
    fn test_dimension_labels() {
        assert_eq!(dimension_label("query"), "Consulta");
        assert_eq!(dimension_label("page"), "Página");
        assert_eq!(dimension_label("country"), "País");
        assert_eq!(dimension_label("device"), "Dispositivo");
        assert_eq!(dimension_label("date"), "Data");
        assert_eq!(dimension_label("searchAppearance"), "Dimensão searchAppearance");
    }

    fn search_row() -> SearchRow {
        serde_json::from_value(serde_json::json!({
            "keys": ["rust async", "https://example.com/blog/"],
            "clicks": 12,
            "impressions": 340,
            "ctr": 0.035294,
            "position": 4.256
        }))
        .unwrap()
    }

    #[test]
    fn test_search_rows_with_extra_metrics() {
        let dims = vec!["query".to_string(), "page".to_string()];
        let records = format_search_rows(&dims, &[search_row()], true);
        let r = &records[0];
        assert_eq!(r["Consulta"], "rust async");
        assert_eq!(r["Página"], "https://example.com/blog/");
        assert_eq!(r["Cliques"], 12);
        assert_eq!(r["Impressões"], 340);
        assert_eq!(r["CTR"], "3.53%");
        assert_eq!(r["Posição Média"], "4.26");
    }

    #[test]
    fn test_search_rows_without_extra_metrics() {
        let dims = vec!["query".to_string()];
        let records = format_search_rows(&dims, &[search_row()], false);
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, vec!["Consulta", "Cliques", "Impressões"]);
    }

    #[test]
    fn test_search_rows_missing_metrics_default_to_zero() {
        let row: SearchRow = serde_json::from_str(r#"{"keys": ["x"]}"#).unwrap();
        let records = format_search_rows(&["query".to_string()], &[row], true);
        assert_eq!(records[0]["Cliques"], 0);
        assert_eq!(records[0]["CTR"], "0.00%");
        assert_eq!(records[0]["Posição Média"], "0.00");
    }

    fn pivot_response(rows: Vec<Row>) -> RunPivotReportResponse {
        RunPivotReportResponse {
            pivot_headers: vec![PivotHeader {
                pivot_dimension_headers: vec![
                    PivotDimensionHeader {
                        dimension_values: vec![crate::report::response::Value {
                            value: "mobile".to_string(),
                        }],
                    },
                    PivotDimensionHeader {
                        dimension_values: vec![crate::report::response::Value {
                            value: "desktop".to_string(),
                        }],
                    },
                ],
            }],
            dimension_headers: vec![
                Header {
                    name: "country".to_string(),
                },
                Header {
                    name: "deviceCategory".to_string(),
                },
            ],
            metric_headers: vec![Header {
                name: "sessions".to_string(),
            }],
            rows,
        }
    }

    #[test]
    fn test_format_pivot() {
        let text = format_pivot(&pivot_response(vec![row(&["BR", "mobile"], &["42"])]));
        assert_eq!(
            text,
            "Resultados da consulta pivot:\n\
             Dimensões: country, deviceCategory\n\
             Métricas: sessions\n\
             \n\
             Cabeçalhos de Pivot:\n\
             Pivot 1:\n  \
             Cabeçalho 1: mobile\n  \
             Cabeçalho 2: desktop\n\
             \n\
             Dados:\n\
             Linha 1: BR | mobile => 42"
        );
    }

    #[test]
    fn test_format_pivot_no_rows() {
        let text = format_pivot(&pivot_response(Vec::new()));
        assert!(text.ends_with("\n\nNenhum dado encontrado."));
        assert!(!text.contains("Dados:"));
    }

    #[test]
    fn test_format_pivot_caps_rows() {
        let rows = (0..80).map(|i| row(&["BR"], &[i.to_string().as_str()])).collect();
        let text = format_pivot(&pivot_response(rows));
        assert_eq!(text.lines().filter(|l| l.starts_with("Linha ")).count(), 50);
    }

    #[test]
    fn test_format_pivot_without_pivot_headers() {
        let mut response = pivot_response(vec![row(&["BR"], &["1"])]);
        response.pivot_headers.clear();
        assert!(!format_pivot(&response).contains("Cabeçalhos de Pivot:"));
    }

    #[test]
    fn test_describe_filters() {
        let query = SearchQuery {
            site_url: "example.com".to_string(),
            query_contains: Some("rust".to_string()),
            page_contains: Some(String::new()),
            filters: vec![
                crate::report::request::SearchFilter {
                    dimension: "country".to_string(),
                    operator: None,
                    expression: "bra".to_string(),
                },
                crate::report::request::SearchFilter {
                    dimension: "page".to_string(),
                    operator: Some("notContains".to_string()),
                    expression: "/tag/".to_string(),
                },
            ],
            ..SearchQuery::default()
        };
        assert_eq!(
            describe_filters(&query),
            vec![
                "Query contém: 'rust'",
                "country equals 'bra'",
                "page notContains '/tag/'",
            ]
        );
    }
}
