// Refresh service - Periodic snapshots pushed over a channel
use crate::application::dashboard_service::DashboardService;
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::tenant::Tenant;
use chrono::Utc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

const SNAPSHOT_BUFFER: usize = 4;

#[derive(Clone)]
pub struct RefreshService {
    dashboard: DashboardService,
}

impl RefreshService {
    pub fn new(dashboard: DashboardService) -> Self {
        Self { dashboard }
    }

    pub fn dashboard(&self) -> &DashboardService {
        &self.dashboard
    }

    /// Build every dashboard section for one tenant.
    /// Stats failures are carried in `stats_error`; all other sections are best-effort.
    pub async fn build_snapshot(&self, tenant: Tenant) -> DashboardSnapshot {
        let start_time = Instant::now();

        let (stats, charts, kiosks, disconnected_kiosks, last_failed) = tokio::join!(
            self.dashboard.fetch_dashboard_data(tenant),
            self.dashboard.fetch_chart_data(tenant),
            self.dashboard.fetch_kiosk_overview(tenant),
            self.dashboard.fetch_disconnected_kiosks(tenant),
            self.dashboard.fetch_last_failed_event(tenant),
        );

        let (stats, stats_error) = match stats {
            Ok(stats) => (Some(stats), None),
            Err(e) => (None, Some(e.to_string())),
        };

        tracing::info!(
            tenant = %tenant,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            availability = ?stats.and_then(|s| s.kiosk_availability()),
            alerts_today = charts.alert_heatmap.total_alerts(),
            "snapshot built"
        );

        DashboardSnapshot {
            tenant,
            generated_at: Utc::now(),
            stats,
            stats_error,
            charts,
            kiosks,
            disconnected_kiosks,
            last_failed,
        }
    }

    /// Emit a snapshot immediately and then once per `every`.
    ///
    /// Each tick builds its snapshot in its own task, so a slow refresh never delays the
    /// next one. The ticker stops once the receiver is dropped.
    pub fn stream(&self, tenant: Tenant, every: Duration) -> mpsc::Receiver<DashboardSnapshot> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
        let service = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = IntervalStream::new(interval);

            while ticks.next().await.is_some() {
                if tx.is_closed() {
                    break;
                }

                let tx = tx.clone();
                let service = service.clone();
                tokio::spawn(async move {
                    let snapshot = service.build_snapshot(tenant).await;
                    if tx.send(snapshot).await.is_err() {
                        tracing::debug!(tenant = %tenant, "stream client went away");
                    }
                });
            }

            tracing::info!(tenant = %tenant, "snapshot stream closed");
        });

        rx
    }
}
