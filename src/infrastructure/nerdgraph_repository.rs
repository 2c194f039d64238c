// NerdGraph repository - wraps NRQL in GraphQL and unwraps the result envelope
use crate::application::analytics_repository::AnalyticsRepository;
use crate::domain::error::GatewayError;
use crate::domain::query_row::QueryRow;
use crate::domain::tenant::Tenant;
use crate::infrastructure::proxy_gateway::{GraphQlPayload, ProxyGateway};
use async_trait::async_trait;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct NerdGraphRepository {
    gateway: ProxyGateway,
}

impl NerdGraphRepository {
    pub fn new(gateway: ProxyGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AnalyticsRepository for NerdGraphRepository {
    async fn run_nrql(&self, tenant: Tenant, nrql: &str) -> Result<Vec<QueryRow>, GatewayError> {
        let credential = self
            .gateway
            .credentials()
            .get(tenant)
            .ok_or_else(|| GatewayError::CredentialNotFound {
                tenant: tenant.code().to_string(),
            })?;

        let payload = GraphQlPayload::new(build_nerdgraph_query(&credential.account_id, nrql))
            .with_variables(json!({ "accountId": credential.account_id }));

        let data = self.gateway.forward(tenant.code(), &payload).await?;
        let rows = extract_results(data);
        tracing::debug!(tenant = %tenant, rows = rows.len(), "NRQL query returned");
        Ok(rows)
    }

    async fn is_connected(&self, tenant: Tenant) -> bool {
        match self.gateway.check_connection(tenant.code()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(tenant = %tenant, "NewRelic connection check failed: {}", e);
                false
            }
        }
    }
}

/// Embed an NRQL string in a NerdGraph `nrql(query: "...")` request.
/// The NRQL is flattened to one line with quotes escaped.
pub fn build_nerdgraph_query(account_id: &str, nrql: &str) -> String {
    let flattened = nrql.split_whitespace().collect::<Vec<_>>().join(" ");
    let escaped = flattened.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "{{ actor {{ account(id: {}) {{ nrql(query: \"{}\") {{ results }} }} }} }}",
        account_id, escaped
    )
}

/// Pull `actor.account.nrql.results` out of the `data` payload; anything missing yields no rows
pub fn extract_results(mut data: Value) -> Vec<QueryRow> {
    match data.pointer_mut("/actor/account/nrql/results").map(Value::take) {
        Some(Value::Array(rows)) => rows.into_iter().filter_map(QueryRow::from_value).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tenant::TenantCredentials;
    use crate::infrastructure::proxy_gateway::testing::RecordingTransport;
    use std::sync::Arc;

    #[test]
    fn test_build_query_flattens_and_escapes() {
        let nrql = "FROM KioskAlertEvent\n   SELECT count(*)\n  WHERE alert_message LIKE '%Attribute name \"amount\"%'  ";
        let query = build_nerdgraph_query("4502664", nrql);

        assert_eq!(
            query,
            "{ actor { account(id: 4502664) { nrql(query: \"FROM KioskAlertEvent SELECT count(*) WHERE alert_message LIKE '%Attribute name \\\"amount\\\"%'\") { results } } } }"
        );
    }

    #[test]
    fn test_extract_results() {
        let data = json!({"actor": {"account": {"nrql": {"results": [{"count": 3}, 7, {"count": 4}]}}}});
        let rows = extract_results(data);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].count(), 4);

        assert!(extract_results(json!({"actor": {"account": null}})).is_empty());
        assert!(extract_results(Value::Null).is_empty());
    }

    #[tokio::test]
    async fn test_run_nrql_uses_tenant_account() {
        let transport = Arc::new(RecordingTransport::responding(
            200,
            json!({"data": {"actor": {"account": {"nrql": {"results": [{"uniqueCount.storeName": 42}]}}}}}),
        ));
        let gateway = ProxyGateway::new(
            TenantCredentials::new().with(Tenant::Plkus, "999", "key-plk"),
            transport.clone(),
        );
        let repo = NerdGraphRepository::new(gateway);

        let rows = repo.run_nrql(Tenant::Plkus, "FROM KioskStatusEvent SELECT uniqueCount(storeName)").await.unwrap();
        assert_eq!(rows[0].count_of(&["uniqueCount.storeName"]), 42);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].0, "key-plk");
        assert!(calls[0].1.query.contains("account(id: 999)"));
        assert_eq!(calls[0].1.variables, Some(json!({"accountId": "999"})));
    }

    #[tokio::test]
    async fn test_is_connected_follows_gateway() {
        let ok = Arc::new(RecordingTransport::responding(200, json!({"data": {"actor": {"user": {"name": "ops"}}}})));
        let repo = NerdGraphRepository::new(ProxyGateway::new(
            TenantCredentials::new().with(Tenant::Bkus, "111", "key-bk"),
            ok.clone(),
        ));
        assert!(repo.is_connected(Tenant::Bkus).await);
        assert!(!repo.is_connected(Tenant::Plkus).await);
        assert_eq!(ok.call_count(), 1);

        let down = NerdGraphRepository::new(ProxyGateway::new(
            TenantCredentials::new().with(Tenant::Bkus, "111", "key-bk"),
            Arc::new(RecordingTransport::unreachable()),
        ));
        assert!(!down.is_connected(Tenant::Bkus).await);
    }

    #[tokio::test]
    async fn test_run_nrql_without_credential() {
        let transport = Arc::new(RecordingTransport::responding(200, json!({"data": {}})));
        let repo = NerdGraphRepository::new(ProxyGateway::new(TenantCredentials::new(), transport.clone()));

        let err = repo.run_nrql(Tenant::Bkus, "SELECT 1").await.unwrap_err();
        assert!(matches!(err, GatewayError::CredentialNotFound { .. }));
        assert_eq!(transport.call_count(), 0);
    }
}
