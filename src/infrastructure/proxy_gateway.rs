// Proxy gateway - per-tenant credential routing and vendor error normalization
use crate::domain::error::GatewayError;
use crate::domain::tenant::TenantCredentials;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Smallest query every valid key can answer
pub const CONNECTION_QUERY: &str = "{ actor { user { name } } }";

/// GraphQL request body forwarded to the vendor as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlPayload {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    /// Other GraphQL members (`operationName`, `extensions`, ...), passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GraphQlPayload {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
            extra: Map::new(),
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Raw vendor answer, before any interpretation
#[derive(Debug, Clone)]
pub struct VendorResponse {
    pub status: u16,
    pub body: String,
}

/// Outbound leg of the proxy. Errors mean no response was received at all.
#[async_trait]
pub trait VendorTransport: Send + Sync {
    async fn post(&self, api_key: &str, payload: &GraphQlPayload) -> anyhow::Result<VendorResponse>;
}

/// reqwest-backed transport posting to the NerdGraph endpoint
#[derive(Debug, Clone)]
pub struct HttpVendorTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpVendorTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl VendorTransport for HttpVendorTransport {
    async fn post(&self, api_key: &str, payload: &GraphQlPayload) -> anyhow::Result<VendorResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("API-Key", api_key)
            .json(payload)
            .send()
            .await
            .context("Failed to send request to NewRelic")?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read NewRelic response body")?;

        Ok(VendorResponse { status, body })
    }
}

#[derive(Clone)]
pub struct ProxyGateway {
    credentials: TenantCredentials,
    transport: Arc<dyn VendorTransport>,
}

impl ProxyGateway {
    pub fn new(credentials: TenantCredentials, transport: Arc<dyn VendorTransport>) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    pub fn credentials(&self) -> &TenantCredentials {
        &self.credentials
    }

    /// Forward a GraphQL payload on behalf of `tenant` and return the `data` member.
    pub async fn forward(&self, tenant: &str, payload: &GraphQlPayload) -> Result<Value, GatewayError> {
        let Some(credential) = self.credentials.lookup(tenant) else {
            tracing::warn!(tenant, "rejecting request: no API key configured");
            return Err(GatewayError::CredentialNotFound {
                tenant: tenant.to_string(),
            });
        };

        tracing::debug!(tenant, query_len = payload.query.len(), "forwarding query to NewRelic");

        let response = self
            .transport
            .post(&credential.api_key, payload)
            .await
            .map_err(|e| {
                tracing::error!(tenant, "NewRelic transport failure: {:#}", e);
                GatewayError::Transport(format!("{:#}", e))
            })?;

        let result = interpret_response(response);
        if let Err(e) = &result {
            if e.is_client_error() {
                tracing::warn!(tenant, "NewRelic rejected query: {}", e);
            } else {
                tracing::error!(tenant, "NewRelic request failed: {}", e);
            }
        }
        result
    }

    /// Round-trip a trivial query with the tenant's key
    pub async fn check_connection(&self, tenant: &str) -> Result<(), GatewayError> {
        self.forward(tenant, &GraphQlPayload::new(CONNECTION_QUERY)).await?;
        Ok(())
    }
}

fn interpret_response(response: VendorResponse) -> Result<Value, GatewayError> {
    if !(200..300).contains(&response.status) {
        return Err(GatewayError::Upstream {
            status: response.status,
            body: response.body,
        });
    }

    let mut envelope: Value = serde_json::from_str(&response.body)
        .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

    // GraphQL reports query problems with a 200 and an `errors` member
    if let Some(errors) = envelope.get("errors").filter(|e| !e.is_null()) {
        return Err(GatewayError::Query {
            details: errors.clone(),
        });
    }

    Ok(envelope
        .get_mut("data")
        .map(Value::take)
        .unwrap_or(Value::Null))
}
