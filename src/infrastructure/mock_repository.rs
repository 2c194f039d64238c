// Mock repository - canned vendor rows for running without NewRelic credentials
use crate::application::analytics_repository::AnalyticsRepository;
use crate::domain::error::GatewayError;
use crate::domain::query_row::QueryRow;
use crate::domain::tenant::Tenant;
use crate::infrastructure::query_catalog::{QueryCatalog, QueryKind};
use async_trait::async_trait;
use chrono::{Days, Utc};
use serde_json::{json, Value};

const TREND_DAYS: u64 = 7;

/// Answers catalog queries with stable, plausible rows shaped like NerdGraph results.
/// Unknown NRQL gets no rows.
#[derive(Debug, Clone)]
pub struct MockAnalyticsRepository {
    catalog: QueryCatalog,
}

impl MockAnalyticsRepository {
    pub fn new(catalog: QueryCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl AnalyticsRepository for MockAnalyticsRepository {
    async fn run_nrql(&self, tenant: Tenant, nrql: &str) -> Result<Vec<QueryRow>, GatewayError> {
        let rows = match self.catalog.kind_of(tenant, nrql) {
            Some(kind) => mock_rows(tenant, kind),
            None => {
                tracing::debug!(tenant = %tenant, "mock source has no rows for ad-hoc NRQL");
                Value::Array(Vec::new())
            }
        };

        Ok(match rows {
            Value::Array(rows) => rows.into_iter().filter_map(QueryRow::from_value).collect(),
            _ => Vec::new(),
        })
    }

    async fn is_connected(&self, _tenant: Tenant) -> bool {
        true
    }
}

// PLKUS is the smaller estate
fn scale(tenant: Tenant, n: u64) -> u64 {
    match tenant {
        Tenant::Bkus => n,
        Tenant::Plkus => n * 3 / 5,
    }
}

fn mock_rows(tenant: Tenant, kind: QueryKind) -> Value {
    let s = |n| scale(tenant, n);

    match kind {
        QueryKind::TotalStores => json!([{ "uniqueCount.storeName": s(128) }]),
        QueryKind::TotalKiosks => json!([{ "uniqueCount.concat(storeName, kioskName)": s(410) }]),
        QueryKind::StoreStatus => json!([{ "onlineStores": s(123), "offlineStores": s(5) }]),
        QueryKind::KioskStatus => json!([{ "onlineKiosks": s(395), "offlineKiosks": s(15) }]),
        QueryKind::OrderFailureTrend => trend_rows(tenant),
        QueryKind::TypeOfIssues => json!([
            { "facet": "Order", "count": s(84) },
            { "facet": "CalcTotal", "count": s(31) },
            { "facet": "Payment", "count": s(22) },
            { "facet": "Hardware", "count": s(9) }
        ]),
        QueryKind::OrderFailureTypes => failure_type_rows(tenant, 1),
        QueryKind::OrderFailureTypesToday => failure_type_rows(tenant, 7),
        QueryKind::AlertHeatmap => json!([
            { "facet": ["Los Angeles", "CA"], "Alerts": s(42) },
            { "facet": ["San Diego", "CA"], "Alerts": s(11) },
            { "facet": ["Houston", "TX"], "Alerts": s(35) },
            { "facet": ["Miami", "FL"], "Alerts": s(27) },
            { "facet": ["Chicago", "IL"], "Alerts": s(19) },
            { "facet": ["Columbus", "OH"], "Alerts": s(8) }
        ]),
        QueryKind::KioskLocations => json!([
            { "facet": ["Store 1001", "Kiosk 1"], "status": "ONLINE", "city": "Los Angeles", "state": "CA" },
            { "facet": ["Store 1001", "Kiosk 2"], "status": "ONLINE", "city": "Los Angeles", "state": "CA" },
            { "facet": ["Store 1017", "Kiosk 1"], "status": "OFFLINE", "city": "Houston", "state": "TX" },
            { "facet": ["Store 1017", "Kiosk 2"], "status": "ONLINE", "city": "Houston", "state": "TX" },
            { "facet": ["Store 1042", "Kiosk 1"], "status": "ONLINE", "city": "Miami", "state": "FL" },
            { "facet": ["Store 1058", "Kiosk 1"], "status": "ONLINE", "city": "Chicago", "state": "IL" }
        ]),
        QueryKind::OrderFailureByPos => json!([
            { "facet": "Micros", "count": s(61) },
            { "facet": "NCR Aloha", "count": s(44) },
            { "facet": "Sicom", "count": s(18) }
        ]),
        QueryKind::DisconnectedKiosks => json!([
            { "comparison": "current", "uniqueCount.fullHostname": s(402) },
            { "comparison": "previous", "uniqueCount.fullHostname": s(410) }
        ]),
        QueryKind::LastFailedOrder => json!([{
            "latest.timestamp": Utc::now().timestamp_millis() - 12 * 60 * 1000,
            "latest.storeName": "Store 1042"
        }]),
    }
}

// One row per day ending today, oldest first
fn trend_rows(tenant: Tenant) -> Value {
    let today = Utc::now().date_naive();
    let rows = (0..TREND_DAYS)
        .rev()
        .filter_map(|days_ago| {
            let date = today.checked_sub_days(Days::new(days_ago))?;
            Some(json!({
                "Date of timestamp": date.format("%Y-%m-%d").to_string(),
                "count(*)": scale(tenant, 40 + (days_ago * 17) % 35),
            }))
        })
        .collect();
    Value::Array(rows)
}

fn failure_type_rows(tenant: Tenant, divisor: u64) -> Value {
    let mut rows = vec![
        ("POS Error", 120),
        ("Network Connection Timeout", 95),
        ("Total mismatch", 48),
        ("Item out of stock or inactive", 37),
        ("Coupon configuration error", 12),
    ];
    match tenant {
        Tenant::Bkus => rows.push(("Unclassified", 6)),
        Tenant::Plkus => rows.extend([("Bad Order Payload", 21), ("Other", 9)]),
    }

    Value::Array(
        rows.into_iter()
            .map(|(facet, count)| json!({ "facet": facet, "count": scale(tenant, count / divisor) }))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::DashboardService;
    use crate::infrastructure::us_geo::UsStates;
    use std::sync::Arc;

    fn service() -> DashboardService {
        let catalog = QueryCatalog::new("America/Los_Angeles");
        DashboardService::new(
            Arc::new(MockAnalyticsRepository::new(catalog.clone())),
            catalog,
            Arc::new(UsStates),
        )
    }

    #[tokio::test]
    async fn test_mock_feeds_every_dashboard_section() {
        let svc = service();

        let stats = svc.fetch_dashboard_data(Tenant::Bkus).await.unwrap();
        assert_eq!(stats.total_stores, 128);
        assert_eq!(stats.online_kiosks + stats.offline_kiosks, stats.total_kiosks);

        let charts = svc.fetch_chart_data(Tenant::Bkus).await;
        assert_eq!(charts.order_failure_trend.len(), TREND_DAYS as usize);
        assert_eq!(charts.order_failure_types[0].category, "POS Error");
        assert_eq!(charts.alert_heatmap.states[0].state, "California");
        assert_eq!(charts.alert_heatmap.states[0].alerts, 53);
        assert!(!charts.type_of_issues.is_empty());
        assert!(!charts.order_failure_by_pos.is_empty());
        assert!(!charts.order_failure_types_today.is_empty());

        let overview = svc.fetch_kiosk_overview(Tenant::Bkus).await;
        assert_eq!((overview.online, overview.offline), (5, 1));

        assert_eq!(svc.fetch_disconnected_kiosks(Tenant::Bkus).await, 8);
        assert_eq!(
            svc.fetch_last_failed_event(Tenant::Bkus).await.label.as_deref(),
            Some("Store 1042")
        );
        assert!(svc.check_connection(Tenant::Plkus).await);
    }

    #[tokio::test]
    async fn test_mock_tenants_differ_and_other_is_dropped() {
        let svc = service();
        let bk = svc.fetch_dashboard_data(Tenant::Bkus).await.unwrap();
        let plk = svc.fetch_dashboard_data(Tenant::Plkus).await.unwrap();
        assert!(plk.total_stores < bk.total_stores);

        let charts = svc.fetch_chart_data(Tenant::Plkus).await;
        assert!(charts.order_failure_types.iter().any(|p| p.category == "Bad Order Payload"));
        assert!(charts.order_failure_types.iter().all(|p| p.category != "Other"));
    }

    #[tokio::test]
    async fn test_ad_hoc_nrql_returns_no_rows() {
        let repo = MockAnalyticsRepository::new(QueryCatalog::new("UTC"));
        let rows = repo.run_nrql(Tenant::Bkus, "FROM Transaction SELECT count(*)").await.unwrap();
        assert!(rows.is_empty());
    }
}
