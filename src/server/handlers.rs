use axum::extract::{Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use subtle::ConstantTimeEq;

use crate::export::{render_csv, EXPORT_FILENAME};
use crate::search::{find_reference, search_within_radius, SearchError, SearchHit};

use super::state::AppState;
use super::static_files;

const DEFAULT_RADIUS_KM: f64 = 10.0;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── Access gate ─────────────────────────────────────────────────

fn key_matches(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

fn key_from_query(query: Option<&str>) -> Option<&str> {
    query?.split('&').find_map(|pair| pair.strip_prefix("key="))
}

/// Shared-secret gate in front of the API routes. No-op when no key is
/// configured. The static shell stays open so the page can prompt.
pub(super) async fn require_access_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(ref expected) = state.access_key else {
        return next.run(request).await;
    };

    let from_header = request
        .headers()
        .get("x-access-key")
        .and_then(|v| v.to_str().ok());
    let provided = from_header.or_else(|| key_from_query(request.uri().query()));

    match provided {
        Some(key) if key_matches(expected, key) => next.run(request).await,
        _ => api_error(StatusCode::UNAUTHORIZED, "Missing or invalid access key").into_response(),
    }
}

// ─── Static file handlers ────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(static_files::INDEX_HTML)
}

pub async fn style() -> Response {
    (
        [(header::CONTENT_TYPE, "text/css")],
        static_files::STYLE_CSS,
    )
        .into_response()
}

pub async fn script() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        static_files::APP_JS,
    )
        .into_response()
}

// ─── GET /api/search ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub radius: Option<f64>,
}

#[derive(Serialize)]
struct ReferenceDto {
    name: String,
    postal_code: String,
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
pub struct SearchResponse {
    reference: ReferenceDto,
    radius_km: f64,
    count: usize,
    source: String,
    hits: Vec<SearchHit>,
}

fn resolve_and_search(
    state: &AppState,
    params: &SearchQuery,
) -> Result<(ReferenceDto, f64, Vec<SearchHit>), ApiError> {
    let query = params.query.as_deref().unwrap_or("").trim();
    if query.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'query' parameter"));
    }
    let radius_km = params.radius.unwrap_or(DEFAULT_RADIUS_KM);

    let reference = find_reference(&state.catalog, query)
        .map_err(|e| api_error(StatusCode::NOT_FOUND, format!("{}", e)))?;

    let hits = search_within_radius(&state.catalog, &reference, radius_km).map_err(|e| match e {
        SearchError::InvalidRadius(_) => api_error(StatusCode::BAD_REQUEST, format!("{}", e)),
        SearchError::NotFound(_) => api_error(StatusCode::NOT_FOUND, format!("{}", e)),
    })?;

    let dto = ReferenceDto {
        name: reference.settlement.name.clone(),
        postal_code: reference.settlement.postal_code.clone(),
        lat: reference.settlement.lat,
        lon: reference.settlement.lon,
    };
    Ok((dto, radius_km, hits))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();

    let (reference, radius_km, hits) = resolve_and_search(&state, &params)?;

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] GET /api/search?query={} radius={} -> {} hits ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        reference.name,
        radius_km,
        hits.len(),
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(Json(SearchResponse {
        count: hits.len(),
        source: state.catalog.source.to_string(),
        reference,
        radius_km,
        hits,
    }))
}

// ─── GET /api/export ─────────────────────────────────────────────

pub async fn export(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let start = Instant::now();

    let (reference, radius_km, hits) = resolve_and_search(&state, &params)?;

    let document = render_csv(&hits)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{}", e)))?;

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] GET /api/export?query={} radius={} -> {} rows ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        reference.name,
        radius_km,
        hits.len(),
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        document,
    )
        .into_response())
}

// ─── GET /api/settlements ────────────────────────────────────────

#[derive(Serialize)]
pub struct CatalogInfo {
    count: usize,
    source: String,
}

pub async fn settlements(State(state): State<Arc<AppState>>) -> Json<CatalogInfo> {
    Json(CatalogInfo {
        count: state.catalog.len(),
        source: state.catalog.source.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches() {
        assert!(key_matches("secret", "secret"));
        assert!(!key_matches("secret", "Secret"));
        assert!(!key_matches("secret", "secre"));
        assert!(!key_matches("secret", ""));
    }

    #[test]
    fn test_key_from_query() {
        assert_eq!(key_from_query(Some("query=Paris&key=abc")), Some("abc"));
        assert_eq!(key_from_query(Some("key=abc&radius=10")), Some("abc"));
        assert_eq!(key_from_query(Some("query=Paris")), None);
        assert_eq!(key_from_query(None), None);
    }
}
