// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::analytics_repository::AnalyticsRepository;
use crate::application::dashboard_service::DashboardService;
use crate::application::refresh_service::RefreshService;
use crate::domain::tenant::Tenant;
use crate::infrastructure::config::{load_app_config, DataSource};
use crate::infrastructure::mock_repository::MockAnalyticsRepository;
use crate::infrastructure::nerdgraph_repository::NerdGraphRepository;
use crate::infrastructure::proxy_gateway::{HttpVendorTransport, ProxyGateway};
use crate::infrastructure::query_catalog::QueryCatalog;
use crate::infrastructure::us_geo::UsStates;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    health_check, not_found, proxy_newrelic, stream_tenant, tenant_charts, tenant_connection,
    tenant_disconnected, tenant_kiosks, tenant_last_failed, tenant_snapshot, tenant_stats,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let credentials = app_config.credentials();
    for tenant in Tenant::ALL {
        tracing::info!(
            tenant = tenant.display_name(),
            configured = credentials.is_configured(tenant),
            "tenant API key"
        );
    }

    // Create gateway and repository (infrastructure layer)
    let transport = Arc::new(HttpVendorTransport::new(app_config.vendor.endpoint.clone()));
    let gateway = ProxyGateway::new(credentials, transport);
    let catalog = QueryCatalog::new(app_config.vendor.timezone.clone());
    let repository: Arc<dyn AnalyticsRepository> = match app_config.vendor.data_source {
        DataSource::NewRelic => Arc::new(NerdGraphRepository::new(gateway.clone())),
        DataSource::Mock => {
            tracing::warn!("serving canned dashboard data, NerdGraph is not queried");
            Arc::new(MockAnalyticsRepository::new(catalog.clone()))
        }
    };

    // Create services (application layer)
    let dashboard_service = DashboardService::new(repository, catalog, Arc::new(UsStates));
    let refresh_service = RefreshService::new(dashboard_service);

    // Create application state
    let state = Arc::new(AppState {
        gateway,
        refresh_service,
        refresh_interval: app_config.refresh_interval(),
    });

    // Build router (presentation layer)
    // JSON bodies are compressed in the response builders, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/newrelic", post(proxy_newrelic))
        .route("/api/tenants/:tenant/stats", get(tenant_stats))
        .route("/api/tenants/:tenant/charts", get(tenant_charts))
        .route("/api/tenants/:tenant/kiosks", get(tenant_kiosks))
        .route("/api/tenants/:tenant/disconnected", get(tenant_disconnected))
        .route("/api/tenants/:tenant/last-failed", get(tenant_last_failed))
        .route("/api/tenants/:tenant/connection", get(tenant_connection))
        .route("/api/tenants/:tenant/snapshot", get(tenant_snapshot))
        .route("/api/tenants/:tenant/stream", get(stream_tenant))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid server.bind_addr {:?}", app_config.server.bind_addr))?;
    tracing::info!("Starting kiosk-health-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
