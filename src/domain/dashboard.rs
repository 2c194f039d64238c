// Dashboard domain models
use super::chart::{AlertMap, CategoricalPoint, StateHealth, TimeSeriesPoint};
use super::tenant::Tenant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_stores: u64,
    pub total_kiosks: u64,
    pub online_stores: u64,
    pub offline_stores: u64,
    pub online_kiosks: u64,
    pub offline_kiosks: u64,
}

impl DashboardStats {
    /// Share of kiosks reporting online, as a percentage of all kiosks with a status
    pub fn kiosk_availability(&self) -> Option<f64> {
        let total = self.online_kiosks + self.offline_kiosks;
        (total > 0).then(|| self.online_kiosks as f64 / total as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataBundle {
    pub order_failure_trend: Vec<TimeSeriesPoint>,
    pub type_of_issues: Vec<CategoricalPoint>,
    pub order_failure_types: Vec<CategoricalPoint>,
    pub alert_heatmap: AlertMap,
    pub order_failure_by_pos: Vec<CategoricalPoint>,
    pub order_failure_types_today: Vec<CategoricalPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KioskStatus {
    Online,
    Offline,
}

impl KioskStatus {
    /// Anything but an explicit ONLINE is treated as offline
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("ONLINE") => KioskStatus::Online,
            _ => KioskStatus::Offline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskRecord {
    pub store_name: String,
    pub kiosk_name: String,
    pub status: KioskStatus,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskOverview {
    pub kiosks: Vec<KioskRecord>,
    pub online: u64,
    pub offline: u64,
    pub states: Vec<StateHealth>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastFailedEvent {
    pub timestamp: Option<i64>,
    pub label: Option<String>,
}

/// Everything one refresh of a tenant dashboard produces
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub tenant: Tenant,
    pub generated_at: DateTime<Utc>,
    pub stats: Option<DashboardStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats_error: Option<String>,
    pub charts: ChartDataBundle,
    pub kiosks: KioskOverview,
    pub disconnected_kiosks: u64,
    pub last_failed: LastFailedEvent,
}
