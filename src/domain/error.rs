// Failure taxonomy for vendor access
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Tenant unknown or has no API key configured. Client error, never retried.
    #[error("API key not configured for tenant {tenant}")]
    CredentialNotFound { tenant: String },

    /// Vendor answered with a non-2xx status
    #[error("NewRelic API error: status {status}")]
    Upstream { status: u16, body: String },

    /// Vendor answered 200 with a GraphQL `errors` member; the query itself is malformed
    #[error("NerdGraph query error")]
    Query { details: Value },

    /// No response was received
    #[error("failed to reach NewRelic: {0}")]
    Transport(String),

    #[error("unreadable NewRelic response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::CredentialNotFound { .. } | GatewayError::Query { .. }
        )
    }
}
