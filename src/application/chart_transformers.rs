// Chart transformers - reshape vendor rows into chart-ready records
//
// Every function here is pure: same rows in, same records out.
use crate::domain::chart::{
    AlertMap, CategoricalPoint, GeoPoint, HealthTier, StateAlerts, StateHealth, StateMarker,
    TimeSeriesPoint,
};
use crate::domain::dashboard::{KioskRecord, KioskStatus};
use crate::domain::geo::GeoReference;
use crate::domain::query_row::{Facet, QueryRow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

pub const MAX_CATEGORIES: usize = 10;
pub const MAX_LABEL_CHARS: usize = 20;
const OTHER_CATEGORY: &str = "Other";

const DATE_FIELDS: &[&str] = &["Date of timestamp", "dateOf(timestamp)", "date"];
const ALERT_FIELDS: &[&str] = &["Alerts", "alerts", "count(*)", "count"];

/// Bar chart shape: top categories by count, longest labels clipped
pub fn to_categories(rows: &[QueryRow]) -> Vec<CategoricalPoint> {
    let mut points: Vec<CategoricalPoint> = rows
        .iter()
        .filter_map(|row| {
            let label = row.facet()?.label();
            let trimmed = label.trim();
            if trimmed.is_empty() || trimmed == OTHER_CATEGORY {
                return None;
            }
            Some(CategoricalPoint::new(
                trimmed.chars().take(MAX_LABEL_CHARS).collect::<String>(),
                row.count(),
            ))
        })
        .collect();

    points.sort_by(|a, b| b.count.cmp(&a.count));
    points.truncate(MAX_CATEGORIES);
    points
}

/// Line chart shape, ascending by day.
///
/// Rows without a usable date are labelled `Day N` (1-based position in the input) and
/// keyed by their index so they keep their relative order.
pub fn to_time_series(rows: &[QueryRow]) -> Vec<TimeSeriesPoint> {
    let mut points: Vec<TimeSeriesPoint> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| match row_date(row) {
            Some(date) => TimeSeriesPoint::new(
                date.format("%b-%d").to_string(),
                midnight_millis(date),
                row.count(),
            ),
            None => TimeSeriesPoint::new(format!("Day {}", index + 1), index as i64, row.count()),
        })
        .collect();

    points.sort_by_key(|p| p.timestamp);
    points
}

fn row_date(row: &QueryRow) -> Option<NaiveDate> {
    let text = row.text(DATE_FIELDS).or_else(|| match row.get("facet") {
        Some(serde_json::Value::String(s)) => Some(s.as_str()),
        _ => None,
    });

    if let Some(date) = text.and_then(parse_date) {
        return Some(date);
    }

    row.number(&["beginTimeSeconds"])
        .filter(|secs| secs.is_finite())
        .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
        .map(|dt| dt.date_naive())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn midnight_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// Normalize alert rows. Rows without a state or without alerts are skipped.
pub fn to_geo_points(rows: &[QueryRow], geo: &dyn GeoReference) -> Vec<GeoPoint> {
    rows.iter()
        .filter_map(|row| {
            let (city, state) = row_location(row);
            let state = geo.canonical_state(&state?)?;
            let alerts = row.count_of(ALERT_FIELDS);
            if alerts == 0 {
                return None;
            }
            Some(GeoPoint {
                state,
                city: city.filter(|c| !c.trim().is_empty()),
                alerts,
            })
        })
        .collect()
}

// Composite facet [city, state] wins, then explicit fields, then a scalar facet as the state.
fn row_location(row: &QueryRow) -> (Option<String>, Option<String>) {
    match row.facet() {
        Some(facet @ Facet::Composite(_)) => (
            facet.city().map(str::to_string),
            facet.state().map(str::to_string),
        ),
        scalar => match row.text(&["state"]) {
            Some(state) => (row.text(&["city"]).map(str::to_string), Some(state.to_string())),
            None => (None, scalar.and_then(|f| f.state().map(str::to_string))),
        },
    }
}

/// Sum alerts per canonical state for the choropleth, plus markers for states with
/// known coordinates.
pub fn to_alert_map(rows: &[QueryRow], geo: &dyn GeoReference) -> AlertMap {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for point in to_geo_points(rows, geo) {
        *totals.entry(point.state).or_default() += point.alerts;
    }

    let mut states: Vec<StateAlerts> = totals
        .into_iter()
        .map(|(state, alerts)| StateAlerts { state, alerts })
        .collect();
    states.sort_by(|a, b| b.alerts.cmp(&a.alerts).then_with(|| a.state.cmp(&b.state)));

    let markers = states
        .iter()
        .filter_map(|s| {
            geo.coordinates(&s.state).map(|coordinates| StateMarker {
                state: s.state.clone(),
                coordinates,
                alerts: s.alerts,
            })
        })
        .collect();

    AlertMap { states, markers }
}

/// Kiosk rows faceted by (storeName, kioskName)
pub fn to_kiosk_records(rows: &[QueryRow]) -> Vec<KioskRecord> {
    rows.iter()
        .map(|row| {
            let (store_name, kiosk_name) = match row.facet() {
                Some(Facet::Composite(parts)) => (
                    parts.first().cloned().unwrap_or_default(),
                    parts.get(1).cloned().unwrap_or_default(),
                ),
                Some(Facet::Scalar(store)) => (store, String::new()),
                None => (
                    row.text(&["storeName"]).unwrap_or_default().to_string(),
                    row.text(&["kioskName"]).unwrap_or_default().to_string(),
                ),
            };

            KioskRecord {
                store_name,
                kiosk_name,
                status: KioskStatus::parse(row.text(&["status", "latest.status"])),
                city: row.text(&["city", "latest.city"]).map(str::to_string),
                state: row.text(&["state", "latest.state"]).map(str::to_string),
            }
        })
        .collect()
}

/// Per-state online/offline split with its health tier, ordered by state name
pub fn to_state_health(records: &[KioskRecord], geo: &dyn GeoReference) -> Vec<StateHealth> {
    let mut counts: HashMap<String, (u64, u64)> = HashMap::new();
    for record in records {
        let Some(state) = record.state.as_deref().and_then(|s| geo.canonical_state(s)) else {
            continue;
        };
        let entry = counts.entry(state).or_default();
        match record.status {
            KioskStatus::Online => entry.0 += 1,
            KioskStatus::Offline => entry.1 += 1,
        }
    }

    let mut states: Vec<StateHealth> = counts
        .into_iter()
        .map(|(state, (online, offline))| {
            let total = online + offline;
            let offline_percent = if total == 0 {
                0.0
            } else {
                offline as f64 / total as f64 * 100.0
            };
            StateHealth {
                coordinates: geo.coordinates(&state),
                state,
                online,
                offline,
                total,
                offline_percent,
                tier: HealthTier::from_offline_percent(offline_percent),
            }
        })
        .collect();

    states.sort_by(|a, b| a.state.cmp(&b.state));
    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::us_geo::UsStates;
    use serde_json::{json, Value};

    fn rows(value: Value) -> Vec<QueryRow> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_categories_drop_other_and_sort_descending() {
        let input = rows(json!([
            {"facet": "Other", "count": 5},
            {"facet": "A", "count": 3},
            {"facet": "B", "count": 9}
        ]));

        assert_eq!(
            to_categories(&input),
            vec![CategoricalPoint::new("B", 9), CategoricalPoint::new("A", 3)]
        );
    }

    #[test]
    fn test_categories_truncate_and_cap() {
        let mut items = vec![json!({"facet": "Network Issues (Connection refused/reset)", "count(*)": 100})];
        items.push(json!({"facet": "", "count": 50}));
        items.push(json!({"count": 40}));
        for i in 0..12 {
            items.push(json!({"facet": format!("cat-{}", i), "count": i}));
        }

        let points = to_categories(&rows(Value::Array(items)));
        assert_eq!(points.len(), MAX_CATEGORIES);
        assert_eq!(points[0].category, "Network Issues (Conn");
        assert_eq!(points[0].category.chars().count(), MAX_LABEL_CHARS);
        assert_eq!(points[1].category, "cat-11");
    }

    #[test]
    fn test_time_series_from_dates_and_seconds() {
        let input = rows(json!([
            {"Date of timestamp": "2025-12-14", "count": 4},
            {"beginTimeSeconds": 1765497600, "count(*)": 2},
            {"facet": "December 13, 2025", "count": 7}
        ]));

        let points = to_time_series(&input);
        let labels: Vec<&str> = points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(labels, vec!["Dec-12", "Dec-13", "Dec-14"]);
        assert_eq!(points[0].timestamp, 1765497600 * 1000);
        assert_eq!(points[0].count, 2);
        assert_eq!(points[2].timestamp % 86_400_000, 0);
    }

    #[test]
    fn test_time_series_fallback_label_uses_index() {
        let input = rows(json!([
            {"date": "2025-12-14", "count": 1},
            {"date": "2025-12-15", "count": 2},
            {"date": "not a date", "count": 3}
        ]));

        let points = to_time_series(&input);
        assert_eq!(points[0].date, "Day 3");
        assert_eq!(points[0].timestamp, 2);
        assert_eq!(points[0].count, 3);
        assert_eq!(points[1].date, "Dec-14");
    }

    #[test]
    fn test_transformers_are_repeatable() {
        let input = rows(json!([
            {"facet": ["Dallas", "TX"], "Alerts": 3},
            {"facet": "B", "count": 9, "date": "bad"}
        ]));

        assert_eq!(to_categories(&input), to_categories(&input));
        assert_eq!(to_time_series(&input), to_time_series(&input));
        assert_eq!(to_alert_map(&input, &UsStates), to_alert_map(&input, &UsStates));
    }

    #[test]
    fn test_alert_map_merges_cities_into_state() {
        let input = rows(json!([
            {"facet": ["Dallas", "TX"], "Alerts": 3},
            {"facet": ["Austin", "TX"], "Alerts": 2}
        ]));

        let map = to_alert_map(&input, &UsStates);
        assert_eq!(
            map.states,
            vec![StateAlerts {
                state: "Texas".to_string(),
                alerts: 5
            }]
        );
        assert_eq!(map.markers.len(), 1);
        assert_eq!(map.markers[0].alerts, 5);
    }

    #[test]
    fn test_alert_map_merges_abbreviation_and_name() {
        let input = rows(json!([
            {"facet": ["Fresno", "CA"], "Alerts": 1},
            {"state": "california", "city": "Oakland", "count": 4},
            {"facet": "California", "count(*)": 2}
        ]));

        let map = to_alert_map(&input, &UsStates);
        assert_eq!(map.states.len(), 1);
        assert_eq!(map.states[0].state, "California");
        assert_eq!(map.total_alerts(), 7);
    }

    #[test]
    fn test_unknown_state_kept_in_choropleth_only() {
        let input = rows(json!([
            {"facet": ["Toronto", "Ontario"], "Alerts": 6},
            {"facet": ["Dallas", "TX"], "Alerts": 2},
            {"facet": ["Nowhere", ""], "Alerts": 9},
            {"facet": ["Austin", "TX"], "Alerts": 0}
        ]));

        let map = to_alert_map(&input, &UsStates);
        let states: Vec<&str> = map.states.iter().map(|s| s.state.as_str()).collect();
        assert_eq!(states, vec!["Ontario", "Texas"]);
        assert_eq!(map.markers.len(), 1);
        assert_eq!(map.markers[0].state, "Texas");
    }

    #[test]
    fn test_geo_points_keep_city() {
        let points = to_geo_points(&rows(json!([{"facet": ["Dallas", "tx"], "Alerts": 3}])), &UsStates);
        assert_eq!(
            points,
            vec![GeoPoint {
                state: "Texas".to_string(),
                city: Some("Dallas".to_string()),
                alerts: 3
            }]
        );
    }

    #[test]
    fn test_kiosk_records_from_faceted_rows() {
        let records = to_kiosk_records(&rows(json!([
            {"facet": ["Store 12", "K1"], "status": "ONLINE", "city": "Austin", "state": "TX"},
            {"facet": ["Store 12", "K2"], "latest.status": "OFFLINE", "state": "TX"},
            {"facet": ["Store 40", "K1"]}
        ])));

        assert_eq!(records[0].store_name, "Store 12");
        assert_eq!(records[0].kiosk_name, "K1");
        assert_eq!(records[0].status, KioskStatus::Online);
        assert_eq!(records[1].status, KioskStatus::Offline);
        assert_eq!(records[2].status, KioskStatus::Offline);
        assert_eq!(records[2].state, None);
    }

    fn kiosks(state: &str, online: usize, offline: usize) -> Vec<KioskRecord> {
        let make = |status| KioskRecord {
            store_name: "s".to_string(),
            kiosk_name: "k".to_string(),
            status,
            city: None,
            state: Some(state.to_string()),
        };
        std::iter::repeat_with(|| make(KioskStatus::Online))
            .take(online)
            .chain(std::iter::repeat_with(|| make(KioskStatus::Offline)).take(offline))
            .collect()
    }

    #[test]
    fn test_state_health_tiers_at_band_edges() {
        let mut records = kiosks("TX", 95, 5);
        records.extend(kiosks("CA", 90, 10));
        records.extend(kiosks("NY", 89, 11));
        records.extend(kiosks("FL", 97, 3));

        let health = to_state_health(&records, &UsStates);
        let tier = |name: &str| health.iter().find(|h| h.state == name).map(|h| h.tier);

        assert_eq!(tier("Texas"), Some(HealthTier::Warning));
        assert_eq!(tier("California"), Some(HealthTier::Warning));
        assert_eq!(tier("New York"), Some(HealthTier::Critical));
        assert_eq!(tier("Florida"), Some(HealthTier::Healthy));
    }

    #[test]
    fn test_state_health_merges_spellings() {
        let mut records = kiosks("TX", 1, 0);
        records.extend(kiosks("texas", 0, 1));

        let health = to_state_health(&records, &UsStates);
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].total, 2);
        assert_eq!(health[0].offline_percent, 50.0);
        assert!(health[0].coordinates.is_some());
    }
}
