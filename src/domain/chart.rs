// Chart-ready point records
use serde::{Deserialize, Serialize};

/// Bar chart entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalPoint {
    #[serde(rename = "type")]
    pub category: String,
    pub count: u64,
}

impl CategoricalPoint {
    pub fn new(category: impl Into<String>, count: u64) -> Self {
        Self {
            category: category.into(),
            count,
        }
    }
}

/// Line chart entry. `timestamp` is epoch milliseconds at UTC midnight, or the
/// original row index when the row carried no usable date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub timestamp: i64,
    pub count: u64,
}

impl TimeSeriesPoint {
    pub fn new(date: String, timestamp: i64, count: u64) -> Self {
        Self {
            date,
            timestamp,
            count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A single normalized alert row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub alerts: u64,
}

/// Choropleth bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAlerts {
    pub state: String,
    pub alerts: u64,
}

/// Marker bucket, only produced for states with known coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMarker {
    pub state: String,
    pub coordinates: Coordinates,
    pub alerts: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertMap {
    pub states: Vec<StateAlerts>,
    pub markers: Vec<StateMarker>,
}

impl AlertMap {
    pub fn total_alerts(&self) -> u64 {
        self.states.iter().map(|s| s.alerts).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthTier {
    Healthy,
    Warning,
    Critical,
}

impl HealthTier {
    /// Bands: below 5% healthy, 5% through 10% warning, above 10% critical
    pub fn from_offline_percent(percent: f64) -> Self {
        if percent > 10.0 {
            HealthTier::Critical
        } else if percent >= 5.0 {
            HealthTier::Warning
        } else {
            HealthTier::Healthy
        }
    }
}

/// Per-state kiosk availability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateHealth {
    pub state: String,
    pub online: u64,
    pub offline: u64,
    pub total: u64,
    pub offline_percent: f64,
    pub tier: HealthTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}
