// Dashboard service - Use case for aggregating tenant metrics
use crate::application::analytics_repository::AnalyticsRepository;
use crate::application::chart_transformers::{
    to_alert_map, to_categories, to_kiosk_records, to_state_health, to_time_series,
};
use crate::domain::dashboard::{
    ChartDataBundle, DashboardStats, KioskOverview, KioskRecord, KioskStatus, LastFailedEvent,
};
use crate::domain::error::GatewayError;
use crate::domain::geo::GeoReference;
use crate::domain::query_row::QueryRow;
use crate::domain::tenant::Tenant;
use crate::infrastructure::query_catalog::{QueryCatalog, QueryKind};
use std::sync::Arc;

const HOST_COUNT_FIELDS: &[&str] = &["uniqueCount.fullHostname", "result"];

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn AnalyticsRepository>,
    catalog: QueryCatalog,
    geo: Arc<dyn GeoReference>,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn AnalyticsRepository>,
        catalog: QueryCatalog,
        geo: Arc<dyn GeoReference>,
    ) -> Self {
        Self {
            repository,
            catalog,
            geo,
        }
    }

    /// Headline counts. Any failing query fails the whole call.
    pub async fn fetch_dashboard_data(&self, tenant: Tenant) -> Result<DashboardStats, GatewayError> {
        let (stores, kiosks, store_status, kiosk_status) = tokio::try_join!(
            self.query(tenant, QueryKind::TotalStores),
            self.query(tenant, QueryKind::TotalKiosks),
            self.query(tenant, QueryKind::StoreStatus),
            self.query(tenant, QueryKind::KioskStatus),
        )?;

        Ok(DashboardStats {
            total_stores: first_count(&stores, "uniqueCount.storeName"),
            total_kiosks: first_count(&kiosks, "uniqueCount.concat(storeName, kioskName)"),
            online_stores: first_count(&store_status, "onlineStores"),
            offline_stores: first_count(&store_status, "offlineStores"),
            online_kiosks: first_count(&kiosk_status, "onlineKiosks"),
            offline_kiosks: first_count(&kiosk_status, "offlineKiosks"),
        })
    }

    /// All chart series. A failing series is logged and left empty so the others still render.
    pub async fn fetch_chart_data(&self, tenant: Tenant) -> ChartDataBundle {
        let (trend, issues, failure_types, heatmap, by_pos, types_today) = tokio::join!(
            self.query_or_empty(tenant, QueryKind::OrderFailureTrend),
            self.query_or_empty(tenant, QueryKind::TypeOfIssues),
            self.query_or_empty(tenant, QueryKind::OrderFailureTypes),
            self.query_or_empty(tenant, QueryKind::AlertHeatmap),
            self.query_or_empty(tenant, QueryKind::OrderFailureByPos),
            self.query_or_empty(tenant, QueryKind::OrderFailureTypesToday),
        );

        ChartDataBundle {
            order_failure_trend: to_time_series(&trend),
            type_of_issues: to_categories(&issues),
            order_failure_types: to_categories(&failure_types),
            alert_heatmap: to_alert_map(&heatmap, self.geo.as_ref()),
            order_failure_by_pos: to_categories(&by_pos),
            order_failure_types_today: to_categories(&types_today),
        }
    }

    /// Latest status per (store, kiosk); empty when the query fails
    pub async fn fetch_kiosk_locations(&self, tenant: Tenant) -> Vec<KioskRecord> {
        let rows = self.query_or_empty(tenant, QueryKind::KioskLocations).await;
        let records = to_kiosk_records(&rows);

        tracing::debug!(
            tenant = %tenant,
            total = records.len(),
            online = records.iter().filter(|k| k.status == KioskStatus::Online).count(),
            "fetched kiosk locations"
        );
        records
    }

    pub async fn fetch_kiosk_overview(&self, tenant: Tenant) -> KioskOverview {
        let kiosks = self.fetch_kiosk_locations(tenant).await;
        let online = kiosks.iter().filter(|k| k.status == KioskStatus::Online).count() as u64;
        let offline = kiosks.len() as u64 - online;
        let states = to_state_health(&kiosks, self.geo.as_ref());

        KioskOverview {
            kiosks,
            online,
            offline,
            states,
        }
    }

    /// Hosts that stopped reporting compared with one week earlier; 0 on failure
    pub async fn fetch_disconnected_kiosks(&self, tenant: Tenant) -> u64 {
        let rows = self.query_or_empty(tenant, QueryKind::DisconnectedKiosks).await;
        match period_counts(&rows) {
            Some((current, previous)) => {
                let disconnected = disconnected_kiosks(current, previous);
                tracing::debug!(tenant = %tenant, current, previous, disconnected, "disconnected kiosks");
                disconnected
            }
            None => 0,
        }
    }

    pub async fn fetch_last_failed_event(&self, tenant: Tenant) -> LastFailedEvent {
        let rows = self.query_or_empty(tenant, QueryKind::LastFailedOrder).await;
        rows.first().map(last_failed_event).unwrap_or_default()
    }

    pub async fn check_connection(&self, tenant: Tenant) -> bool {
        let connected = self.repository.is_connected(tenant).await;
        tracing::debug!(tenant = %tenant, connected, "connection check");
        connected
    }

    async fn query(&self, tenant: Tenant, kind: QueryKind) -> Result<Vec<QueryRow>, GatewayError> {
        let nrql = self.catalog.nrql(tenant, kind);
        self.repository.run_nrql(tenant, &nrql).await.map_err(|e| {
            tracing::error!(tenant = %tenant, query = %kind, "query failed: {}", e);
            e
        })
    }

    async fn query_or_empty(&self, tenant: Tenant, kind: QueryKind) -> Vec<QueryRow> {
        self.query(tenant, kind).await.unwrap_or_default()
    }
}

fn first_count(rows: &[QueryRow], field: &str) -> u64 {
    rows.first().map(|r| r.count_of(&[field])).unwrap_or(0)
}

/// `max(0, previous - current)`: more hosts now than before is not a negative count
pub fn disconnected_kiosks(current: u64, previous: u64) -> u64 {
    previous.saturating_sub(current)
}

/// Current and previous host counts of a `COMPARE WITH` result.
///
/// Rows tagged with `comparison` are matched by tag; untagged rows are read
/// positionally, current first.
fn period_counts(rows: &[QueryRow]) -> Option<(u64, u64)> {
    if rows.len() < 2 {
        return None;
    }

    let tagged = |tag: &str| {
        rows.iter()
            .find(|r| r.text(&["comparison"]).is_some_and(|c| c.eq_ignore_ascii_case(tag)))
    };

    let (current, previous) = match (tagged("current"), tagged("previous")) {
        (Some(current), Some(previous)) => (current, previous),
        _ => (&rows[0], &rows[1]),
    };

    Some((
        current.count_of(HOST_COUNT_FIELDS),
        previous.count_of(HOST_COUNT_FIELDS),
    ))
}

fn last_failed_event(row: &QueryRow) -> LastFailedEvent {
    LastFailedEvent {
        timestamp: row
            .number(&["latest.timestamp", "latest(timestamp)"])
            .filter(|t| t.is_finite())
            .map(|t| t as i64),
        label: row
            .text(&["latest.storeName", "latest(storeName)"])
            .map(str::to_string),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedRepository;
    use super::*;
    use crate::infrastructure::us_geo::UsStates;
    use serde_json::json;

    fn service(repo: ScriptedRepository) -> DashboardService {
        DashboardService::new(
            Arc::new(repo),
            QueryCatalog::new("America/Los_Angeles"),
            Arc::new(UsStates),
        )
    }

    fn stats_repo() -> ScriptedRepository {
        ScriptedRepository::default()
            .answer("SELECT uniqueCount(storeName)", json!([{"uniqueCount.storeName": 120}]))
            .answer(
                "uniqueCount(concat(storeName, kioskName))",
                json!([{"uniqueCount.concat(storeName, kioskName)": 480}]),
            )
            .answer("AS onlineStores", json!([{"onlineStores": 118, "offlineStores": 2}]))
            .answer("AS onlineKiosks", json!([{"onlineKiosks": 470}]))
    }

    #[test]
    fn test_disconnected_kiosks_clamps_negative_delta() {
        assert_eq!(disconnected_kiosks(60, 50), 0);
        assert_eq!(disconnected_kiosks(50, 60), 10);
        assert_eq!(disconnected_kiosks(0, 0), 0);
    }

    #[test]
    fn test_period_counts_prefers_comparison_tag() {
        let rows: Vec<QueryRow> = serde_json::from_value(json!([
            {"comparison": "previous", "uniqueCount.fullHostname": 60},
            {"comparison": "current", "uniqueCount.fullHostname": 50}
        ]))
        .unwrap();
        assert_eq!(period_counts(&rows), Some((50, 60)));

        let untagged: Vec<QueryRow> =
            serde_json::from_value(json!([{"result": 50}, {"result": 60}])).unwrap();
        assert_eq!(period_counts(&untagged), Some((50, 60)));

        let single: Vec<QueryRow> = serde_json::from_value(json!([{"result": 50}])).unwrap();
        assert_eq!(period_counts(&single), None);
    }

    #[tokio::test]
    async fn test_dashboard_data_defaults_missing_fields() {
        let stats = service(stats_repo()).fetch_dashboard_data(Tenant::Bkus).await.unwrap();

        assert_eq!(
            stats,
            DashboardStats {
                total_stores: 120,
                total_kiosks: 480,
                online_stores: 118,
                offline_stores: 2,
                online_kiosks: 470,
                offline_kiosks: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_dashboard_data_fails_fast() {
        let repo = ScriptedRepository::default()
            .fail("AS onlineKiosks", 500)
            .answer("SELECT uniqueCount(storeName)", json!([{"uniqueCount.storeName": 1}]))
            .answer("uniqueCount(concat", json!([]))
            .answer("AS onlineStores", json!([]));

        let err = service(repo).fetch_dashboard_data(Tenant::Plkus).await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_chart_data_keeps_healthy_series_when_one_fails() {
        let repo = ScriptedRepository::default()
            .fail("FACET pos_make", 502)
            .answer(
                "FACET dateOf(timestamp)",
                json!([{"Date of timestamp": "2025-12-14", "count(*)": 4}]),
            )
            .answer("FACET alert_category_name", json!([{"facet": "Order", "count": 12}]))
            .answer("FACET city, state", json!([{"facet": ["Dallas", "TX"], "Alerts": 3}]))
            .answer(
                "SINCE today UNTIL now LIMIT MAX",
                json!([{"facet": "POS Error", "count": 2}]),
            )
            .answer(
                "SINCE last week UNTIL now LIMIT MAX",
                json!([{"facet": "Total mismatch", "count": 5}, {"facet": "Other", "count": 50}]),
            );

        let bundle = service(repo).fetch_chart_data(Tenant::Plkus).await;

        assert!(bundle.order_failure_by_pos.is_empty());
        assert_eq!(bundle.order_failure_trend.len(), 1);
        assert_eq!(bundle.order_failure_trend[0].date, "Dec-14");
        assert_eq!(bundle.type_of_issues[0].category, "Order");
        assert_eq!(bundle.alert_heatmap.states[0].state, "Texas");
        assert_eq!(bundle.order_failure_types_today[0].category, "POS Error");
        assert_eq!(bundle.order_failure_types.len(), 1);
        assert_eq!(bundle.order_failure_types[0].category, "Total mismatch");
    }

    #[tokio::test]
    async fn test_chart_data_survives_total_outage() {
        let bundle = service(ScriptedRepository::default()).fetch_chart_data(Tenant::Bkus).await;
        assert_eq!(bundle, ChartDataBundle::default());
    }

    #[tokio::test]
    async fn test_disconnected_and_last_failed() {
        let repo = ScriptedRepository::default()
            .answer(
                "COMPARE WITH 1 week ago",
                json!([{"uniqueCount.fullHostname": 50}, {"uniqueCount.fullHostname": 60}]),
            )
            .answer(
                "latest(timestamp)",
                json!([{"latest.timestamp": 1765700000000i64, "latest.storeName": "Store 7"}]),
            );
        let svc = service(repo);

        assert_eq!(svc.fetch_disconnected_kiosks(Tenant::Bkus).await, 10);
        assert_eq!(
            svc.fetch_last_failed_event(Tenant::Bkus).await,
            LastFailedEvent {
                timestamp: Some(1765700000000),
                label: Some("Store 7".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_best_effort_defaults_on_failure() {
        let svc = service(ScriptedRepository::default());

        assert_eq!(svc.fetch_disconnected_kiosks(Tenant::Bkus).await, 0);
        assert_eq!(svc.fetch_last_failed_event(Tenant::Bkus).await, LastFailedEvent::default());
        assert!(svc.fetch_kiosk_locations(Tenant::Bkus).await.is_empty());
    }

    #[tokio::test]
    async fn test_kiosk_overview_counts_and_states() {
        let repo = ScriptedRepository::default().answer(
            "FACET storeName, kioskName WITH",
            json!([
                {"facet": ["S1", "K1"], "status": "ONLINE", "state": "TX"},
                {"facet": ["S1", "K2"], "status": "OFFLINE", "state": "TX"},
                {"facet": ["S2", "K1"], "status": "ONLINE", "state": "CA"}
            ]),
        );

        let overview = service(repo).fetch_kiosk_overview(Tenant::Bkus).await;
        assert_eq!(overview.online, 2);
        assert_eq!(overview.offline, 1);
        assert_eq!(overview.states.len(), 2);
        assert_eq!(overview.states[1].state, "Texas");
        assert_eq!(overview.states[1].offline_percent, 50.0);
    }
}
