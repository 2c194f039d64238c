// Repository trait for analytics vendor access
use crate::domain::error::GatewayError;
use crate::domain::query_row::QueryRow;
use crate::domain::tenant::Tenant;
use async_trait::async_trait;

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Run an NRQL query for a tenant and return its result rows
    async fn run_nrql(&self, tenant: Tenant, nrql: &str) -> Result<Vec<QueryRow>, GatewayError>;

    /// Whether the data source currently answers for this tenant
    async fn is_connected(&self, tenant: Tenant) -> bool;
}
