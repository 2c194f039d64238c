// HTTP request handlers
use crate::domain::tenant::Tenant;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::json_response;
use crate::infrastructure::proxy_gateway::GraphQlPayload;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Body of `POST /api/newrelic`. Everything except `tenant` is forwarded to the vendor.
#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(flatten)]
    pub payload: GraphQlPayload,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Check if client accepts Brotli compression
fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}

async fn respond<T: Serialize>(headers: &HeaderMap, data: &T) -> Response {
    match json_response(StatusCode::OK, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

fn parse_tenant(raw: &str) -> Result<Tenant, ApiError> {
    Ok(raw.parse::<Tenant>()?)
}

/// Forward a GraphQL payload to NewRelic with the tenant's API key.
/// The tenant comes from the body, or from `x-tenant` for older clients.
pub async fn proxy_newrelic(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ProxyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let tenant = request
        .tenant
        .or_else(|| {
            headers
                .get("x-tenant")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_default();

    let data = state.gateway.forward(&tenant, &request.payload).await?;
    Ok(respond(&headers, &json!({ "data": data })).await)
}

pub async fn tenant_stats(
    Path(tenant): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let tenant = parse_tenant(&tenant)?;
    let stats = state
        .refresh_service
        .dashboard()
        .fetch_dashboard_data(tenant)
        .await?;
    Ok(respond(&headers, &stats).await)
}

pub async fn tenant_charts(
    Path(tenant): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let tenant = parse_tenant(&tenant)?;
    let charts = state.refresh_service.dashboard().fetch_chart_data(tenant).await;
    Ok(respond(&headers, &charts).await)
}

pub async fn tenant_kiosks(
    Path(tenant): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let tenant = parse_tenant(&tenant)?;
    let overview = state.refresh_service.dashboard().fetch_kiosk_overview(tenant).await;
    Ok(respond(&headers, &overview).await)
}

pub async fn tenant_disconnected(
    Path(tenant): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let tenant = parse_tenant(&tenant)?;
    let disconnected = state
        .refresh_service
        .dashboard()
        .fetch_disconnected_kiosks(tenant)
        .await;
    Ok(respond(&headers, &json!({ "disconnectedKiosks": disconnected })).await)
}

pub async fn tenant_last_failed(
    Path(tenant): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let tenant = parse_tenant(&tenant)?;
    let event = state.refresh_service.dashboard().fetch_last_failed_event(tenant).await;
    Ok(respond(&headers, &event).await)
}

pub async fn tenant_connection(
    Path(tenant): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let tenant = parse_tenant(&tenant)?;
    let connected = state.refresh_service.dashboard().check_connection(tenant).await;
    Ok(Json(json!({ "tenant": tenant.code(), "connected": connected })))
}

pub async fn tenant_snapshot(
    Path(tenant): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let tenant = parse_tenant(&tenant)?;
    let snapshot = state.refresh_service.build_snapshot(tenant).await;
    Ok(respond(&headers, &snapshot).await)
}

/// Stream snapshots as NDJSON, one per refresh interval (progressive dashboard updates)
pub async fn stream_tenant(
    Path(tenant): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let tenant = parse_tenant(&tenant)?;
    tracing::info!(tenant = %tenant, interval_secs = state.refresh_interval.as_secs(), "snapshot stream opened");

    let rx = state.refresh_service.stream(tenant, state.refresh_interval);
    Ok(stream_from_receiver(rx).into_response())
}

/// Fallback for unmatched routes, in the same `{error}` shape as API failures
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
}
