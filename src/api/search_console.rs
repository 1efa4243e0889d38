use crate::api::errors::ApiError;
use crate::api::{parse_body, AppState};
use crate::google::listing::list_sites as list_search_console_sites;
use crate::google::search_console::SearchConsoleClient;
use crate::report::fields::{deserialize_field_list, normalize_site_url, null_as_default};
use crate::report::format::{describe_filters, format_search_rows};
use crate::report::request::{build_search_request, SearchFilter, SearchQuery};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Row limit applied when the caller does not send `limite`.
const DEFAULT_ROW_LIMIT: u32 = 100;

const DEFAULT_START_DATE: &str = "30daysAgo";
const DEFAULT_END_DATE: &str = "today";

/// Body of `POST /search-console/query`.
#[derive(Debug, Deserialize)]
pub struct QueryBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub site_url: String,
    /// Absent or `null` means `30daysAgo`.
    #[serde(default)]
    pub data_inicio: Option<String>,
    /// Absent or `null` means `today`.
    #[serde(default)]
    pub data_fim: Option<String>,
    /// Empty means `["query"]`.
    #[serde(default, deserialize_with = "deserialize_field_list")]
    pub dimensoes: Vec<String>,
    /// Absent or `null` means `true`.
    #[serde(default)]
    pub metrica_extra: Option<bool>,
    /// Absent or `null` means [`DEFAULT_ROW_LIMIT`].
    #[serde(default)]
    pub limite: Option<u32>,
    #[serde(default)]
    pub query_filtro: Option<String>,
    #[serde(default)]
    pub pagina_filtro: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filtros: Vec<SearchFilter>,
}

/// Body of `POST /search-console/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub site_url: String,
}

fn search_console_client(state: &AppState) -> Result<&SearchConsoleClient, ApiError> {
    state.upstreams.search_console.get().map_err(|reason| {
        ApiError::Unavailable(format!("Serviço Search Console não inicializado: {reason}"))
    })
}

fn require_site_url(site_url: &str) -> Result<(), ApiError> {
    if site_url.trim().is_empty() {
        return Err(ApiError::BadRequest("site_url é obrigatório".to_string()));
    }
    Ok(())
}

/// GET /search-console/sites
pub async fn list_sites(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let client = search_console_client(&state)?;
    tracing::info!("Listing Search Console sites");

    let sites = list_search_console_sites(client)
        .await
        .map_err(|e| ApiError::Upstream(format!("Erro ao listar sites do Search Console: {e}")))?;

    Ok(Json(json!({
        "sucesso": true,
        "mensagem": format!("Encontrados {} sites no Search Console", sites.len()),
        "sites": sites,
    })))
}

/// POST /search-console/query
///
/// `query_filtro` and `pagina_filtro` become `contains` filters ahead of the
/// caller's own `filtros`; all of them must match.
pub async fn query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body: QueryBody = parse_body(body)?;
    require_site_url(&body.site_url)?;

    let dimensions = if body.dimensoes.is_empty() {
        vec!["query".to_string()]
    } else {
        body.dimensoes
    };
    let query = SearchQuery {
        site_url: body.site_url,
        start_date: body
            .data_inicio
            .unwrap_or_else(|| DEFAULT_START_DATE.to_string()),
        end_date: body.data_fim.unwrap_or_else(|| DEFAULT_END_DATE.to_string()),
        dimensions,
        row_limit: body.limite.unwrap_or(DEFAULT_ROW_LIMIT),
        query_contains: body.query_filtro,
        page_contains: body.pagina_filtro,
        filters: body.filtros,
    };
    let request = build_search_request(&query);
    let client = search_console_client(&state)?;

    tracing::info!(
        site = %request.site_url,
        dimensions = ?request.dimensions,
        filters = request.dimension_filter_groups.first().map_or(0, |g| g.filters.len()),
        "Search Console query"
    );

    let response = client
        .query(&request)
        .await
        .map_err(|e| ApiError::Upstream(format!("Erro na consulta Search Console: {e}")))?;

    let dados = format_search_rows(
        &request.dimensions,
        &response.rows,
        body.metrica_extra.unwrap_or(true),
    );
    tracing::debug!(rows = dados.len(), "Search Console query completed");

    Ok(Json(json!({
        "sucesso": true,
        "site": request.site_url,
        "periodo": format!("{} a {}", request.start_date, request.end_date),
        "dimensoes": request.dimensions,
        "filtros_aplicados": describe_filters(&query),
        "total_resultados": dados.len(),
        "dados": dados,
    })))
}

/// POST /search-console/verify
///
/// A site the account cannot see is reported in a `sucesso: false` body
/// with status 200, not as an error status.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let body: VerifyBody = parse_body(body)?;
    require_site_url(&body.site_url)?;
    let client = search_console_client(&state)?;

    let site_url = normalize_site_url(&body.site_url);
    tracing::info!(site = %site_url, "Verifying Search Console site");

    match client.get_site(&site_url).await {
        Ok(entry) => Ok(Json(json!({
            "sucesso": true,
            "site_url": entry.site_url,
            "nivel_permissao": entry.permission_level,
            "mensagem": format!("Site {site_url} está disponível no Search Console"),
        }))),
        Err(e) => {
            tracing::warn!(site = %site_url, error = %e, "Site verification failed");
            Ok(Json(json!({
                "sucesso": false,
                "site_url": site_url,
                "erro": format!("Site não encontrado ou sem permissão: {e}"),
            })))
        }
    }
}
