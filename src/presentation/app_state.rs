// Application state for HTTP handlers
use crate::application::refresh_service::RefreshService;
use crate::infrastructure::proxy_gateway::ProxyGateway;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub gateway: ProxyGateway,
    pub refresh_service: RefreshService,
    pub refresh_interval: Duration,
}
