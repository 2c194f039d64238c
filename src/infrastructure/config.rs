use crate::domain::tenant::{Tenant, TenantCredentials};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const MAX_REFRESH_MINUTES: u64 = 24 * 60;

pub const DEFAULT_VENDOR_ENDPOINT: &str = "https://api.newrelic.com/graphql";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub vendor: VendorSettings,
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub tenants: HashMap<String, TenantSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct VendorSettings {
    pub endpoint: String,
    pub timezone: String,
    #[serde(default)]
    pub data_source: DataSource,
}

/// Where dashboard rows come from
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    NewRelic,
    /// Canned rows, no credentials needed
    Mock,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    pub interval_minutes: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TenantSettings {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub api_key: String,
}

impl AppConfig {
    /// Credentials for every tenant that has an API key
    pub fn credentials(&self) -> TenantCredentials {
        Tenant::ALL.iter().fold(TenantCredentials::new(), |creds, tenant| {
            match self.tenant_settings(*tenant) {
                Some(settings) => creds.with(*tenant, settings.account_id.clone(), settings.api_key.clone()),
                None => creds,
            }
        })
    }

    // Environment keys arrive lowercased, file keys may not.
    fn tenant_settings(&self, tenant: Tenant) -> Option<&TenantSettings> {
        self.tenants
            .iter()
            .find(|(code, _)| code.parse::<Tenant>().ok() == Some(tenant))
            .map(|(_, settings)| settings)
    }

    pub fn refresh_interval(&self) -> Duration {
        let minutes = self.refresh.interval_minutes.clamp(1, MAX_REFRESH_MINUTES);
        Duration::from_secs(minutes.saturating_mul(60))
    }
}

/// Defaults, then `config/dashboard.{toml,yaml,json}` if present, then `KIOSK__*`
/// environment variables, then the legacy per-tenant `NEWRELIC_*` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let mut builder = config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:3053")?
        .set_default("vendor.endpoint", DEFAULT_VENDOR_ENDPOINT)?
        .set_default("vendor.timezone", "America/Los_Angeles")?
        .set_default("vendor.data_source", "newrelic")?
        .set_default("refresh.interval_minutes", 15)?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("KIOSK").separator("__"));

    for tenant in Tenant::ALL {
        let key = tenant.code().to_lowercase();
        builder = builder
            .set_override_option(
                format!("tenants.{}.account_id", key),
                std::env::var(format!("NEWRELIC_ACCOUNT_ID_{}", tenant.code())).ok(),
            )?
            .set_override_option(
                format!("tenants.{}.api_key", key),
                std::env::var(format!("NEWRELIC_API_KEY_{}", tenant.code())).ok(),
            )?;
    }

    Ok(builder.build()?.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
