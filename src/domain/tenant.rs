// Tenant and credential domain models
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Retail brands sharing the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tenant {
    #[serde(rename = "BKUS")]
    Bkus,
    #[serde(rename = "PLKUS")]
    Plkus,
}

impl Tenant {
    pub const ALL: [Tenant; 2] = [Tenant::Bkus, Tenant::Plkus];

    pub fn code(&self) -> &'static str {
        match self {
            Tenant::Bkus => "BKUS",
            Tenant::Plkus => "PLKUS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tenant::Bkus => "BK-US",
            Tenant::Plkus => "PLK-US",
        }
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tenant: {0}")]
pub struct UnknownTenant(pub String);

impl FromStr for Tenant {
    type Err = UnknownTenant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "").as_str() {
            "BKUS" => Ok(Tenant::Bkus),
            "PLKUS" => Ok(Tenant::Plkus),
            _ => Err(UnknownTenant(s.to_string())),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct TenantCredential {
    pub tenant: Tenant,
    pub account_id: String,
    pub api_key: String,
}

// Keeps API keys out of logs.
impl fmt::Debug for TenantCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantCredential")
            .field("tenant", &self.tenant)
            .field("account_id", &self.account_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Credentials for every configured tenant, built once at startup
#[derive(Debug, Clone, Default)]
pub struct TenantCredentials {
    entries: HashMap<Tenant, TenantCredential>,
}

impl TenantCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a credential. Blank keys are ignored so that the tenant stays unconfigured.
    pub fn with(mut self, tenant: Tenant, account_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        if !api_key.trim().is_empty() {
            self.entries.insert(
                tenant,
                TenantCredential {
                    tenant,
                    account_id: account_id.into(),
                    api_key,
                },
            );
        }
        self
    }

    pub fn get(&self, tenant: Tenant) -> Option<&TenantCredential> {
        self.entries.get(&tenant)
    }

    /// Resolves a raw tenant code, as received on the wire
    pub fn lookup(&self, code: &str) -> Option<&TenantCredential> {
        code.parse::<Tenant>().ok().and_then(|t| self.get(t))
    }

    pub fn is_configured(&self, tenant: Tenant) -> bool {
        self.entries.contains_key(&tenant)
    }
}
