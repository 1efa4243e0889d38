use crate::api::errors::ApiError;
use crate::api::{parse_body, AppState};
use crate::google::analytics::AnalyticsClient;
use crate::google::listing::list_ga4_accounts;
use crate::report::fields::{deserialize_field_list, deserialize_id, null_as_default};
use crate::report::filter::FieldFilter;
use crate::report::format::{format_pivot, format_report, parse_table, summarize};
use crate::report::request::{build_pivot_request, build_report_request, PivotQuery, ReportQuery};
use crate::report::PIVOT_DEFAULT_ROWS;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// One entry of `filtros`. Only the first entry of a GA4 request is used.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub campo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub valor: String,
    /// Absent or `null` means `igual`.
    #[serde(default)]
    pub condicao: Option<String>,
}

impl FilterParams {
    fn condition(&self) -> &str {
        self.condicao.as_deref().unwrap_or(DEFAULT_CONDITION)
    }
}

const DEFAULT_CONDITION: &str = "igual";
const DEFAULT_START_DATE: &str = "7daysAgo";
const DEFAULT_END_DATE: &str = "today";

fn first_filter(filtros: &[FilterParams]) -> Option<FieldFilter> {
    filtros
        .first()
        .and_then(|f| FieldFilter::from_parts(&f.campo, &f.valor, f.condition()))
}

fn date_or(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string())
}

/// Body of `POST /ga4/query`.
#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub property_id: String,
    #[serde(default, deserialize_with = "deserialize_field_list")]
    pub dimensoes: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_field_list")]
    pub metricas: Vec<String>,
    /// Absent or `null` means `7daysAgo`.
    #[serde(default)]
    pub data_inicio: Option<String>,
    /// Absent or `null` means `today`.
    #[serde(default)]
    pub data_fim: Option<String>,
    #[serde(default)]
    pub limite: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filtros: Vec<FilterParams>,
}

/// Body of `POST /ga4/pivot`.
#[derive(Debug, Deserialize)]
pub struct PivotBody {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub property_id: String,
    #[serde(default, deserialize_with = "deserialize_field_list")]
    pub dimensao_principal: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_field_list")]
    pub dimensao_pivot: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_field_list")]
    pub metricas: Vec<String>,
    #[serde(default)]
    pub data_inicio: Option<String>,
    #[serde(default)]
    pub data_fim: Option<String>,
    /// Absent or `null` means [`PIVOT_DEFAULT_ROWS`].
    #[serde(default)]
    pub limite_linhas: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filtros: Vec<FilterParams>,
}

fn analytics_client(state: &AppState) -> Result<&AnalyticsClient, ApiError> {
    state
        .upstreams
        .analytics
        .get()
        .map_err(|reason| ApiError::Unavailable(format!("Serviço GA4 não inicializado: {reason}")))
}

/// GET /ga4/accounts: Accounts and their properties.
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let client = analytics_client(&state)?;
    tracing::info!("Listing GA4 accounts");

    let contas = list_ga4_accounts(client)
        .await
        .map_err(|e| ApiError::Upstream(format!("Erro ao listar contas GA4: {e}")))?;

    Ok(Json(json!({
        "sucesso": true,
        "mensagem": "Contas e propriedades listadas com sucesso",
        "contas": contas,
    })))
}

/// POST /ga4/query: Flat report returned as labeled records plus a summary.
pub async fn query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body: QueryBody = parse_body(body)?;
    if body.property_id.is_empty() {
        return Err(ApiError::BadRequest("property_id é obrigatório".to_string()));
    }
    let data_inicio = date_or(body.data_inicio, DEFAULT_START_DATE);
    let data_fim = date_or(body.data_fim, DEFAULT_END_DATE);

    let request = build_report_request(&ReportQuery {
        property_id: body.property_id.clone(),
        dimensions: body.dimensoes,
        metrics: body.metricas,
        start_date: data_inicio.clone(),
        end_date: data_fim.clone(),
        filter: first_filter(&body.filtros),
        limit: body.limite,
    })?;
    let client = analytics_client(&state)?;

    tracing::info!(
        property = %request.property,
        dimensions = request.dimensions.len(),
        metrics = request.metrics.len(),
        filtered = request.dimension_filter.is_some(),
        "GA4 query"
    );

    let response = client
        .run_report(&request)
        .await
        .map_err(|e| ApiError::Upstream(format!("Consulta GA4 falhou: {e}")))?;

    let dados = parse_table(&format_report(&request, &response));
    let summary = summarize(&dados);
    let total = dados.len();
    let periodo = format!("{data_inicio} a {data_fim}");
    let message = format!(
        "Consulta GA4 realizada com sucesso para {}. Encontrados {} resultados no período de {}.",
        body.property_id, total, periodo
    );

    Ok(Json(json!({
        "sucesso": true,
        "resumo": {
            "total_sessoes": summary.total_sessoes,
            "periodo": periodo,
            "property_id": body.property_id,
            "top_paises": summary.top_paises,
        },
        "dados": dados,
        "total_resultados": total,
        "message": message,
    })))
}

/// POST /ga4/pivot: Pivot report rendered as text.
pub async fn pivot(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body: PivotBody = parse_body(body)?;
    if body.property_id.is_empty()
        || body.dimensao_principal.is_empty()
        || body.dimensao_pivot.is_empty()
        || body.metricas.is_empty()
    {
        return Err(ApiError::BadRequest(
            "property_id, dimensao_principal, dimensao_pivot e metricas são obrigatórios"
                .to_string(),
        ));
    }

    let data_inicio = date_or(body.data_inicio, DEFAULT_START_DATE);
    let data_fim = date_or(body.data_fim, DEFAULT_END_DATE);
    let row_limit = body.limite_linhas.unwrap_or(PIVOT_DEFAULT_ROWS);

    let request = build_pivot_request(&PivotQuery {
        property_id: body.property_id.clone(),
        dimensions: body.dimensao_principal,
        pivot_dimensions: body.dimensao_pivot,
        metrics: body.metricas,
        start_date: data_inicio.clone(),
        end_date: data_fim.clone(),
        filter: first_filter(&body.filtros),
        row_limit,
    })?;
    let client = analytics_client(&state)?;

    tracing::info!(
        property = %request.property,
        row_limit,
        filtered = request.dimension_filter.is_some(),
        "GA4 pivot query"
    );

    let response = client
        .run_pivot_report(&request)
        .await
        .map_err(|e| ApiError::Upstream(format!("Consulta GA4 pivot falhou: {e}")))?;

    Ok(Json(json!({
        "sucesso": true,
        "resultado": format_pivot(&response),
        "periodo": format!("{data_inicio} a {data_fim}"),
        "property_id": body.property_id,
    })))
}
