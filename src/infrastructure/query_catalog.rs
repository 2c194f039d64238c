// NRQL query definitions for both tenants
use crate::domain::tenant::Tenant;
use crate::infrastructure::config::prepare_query;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    TotalStores,
    TotalKiosks,
    StoreStatus,
    KioskStatus,
    OrderFailureTrend,
    TypeOfIssues,
    OrderFailureTypes,
    AlertHeatmap,
    KioskLocations,
    OrderFailureByPos,
    OrderFailureTypesToday,
    DisconnectedKiosks,
    LastFailedOrder,
}

impl QueryKind {
    pub const ALL: [QueryKind; 13] = [
        QueryKind::TotalStores,
        QueryKind::TotalKiosks,
        QueryKind::StoreStatus,
        QueryKind::KioskStatus,
        QueryKind::OrderFailureTrend,
        QueryKind::TypeOfIssues,
        QueryKind::OrderFailureTypes,
        QueryKind::AlertHeatmap,
        QueryKind::KioskLocations,
        QueryKind::OrderFailureByPos,
        QueryKind::OrderFailureTypesToday,
        QueryKind::DisconnectedKiosks,
        QueryKind::LastFailedOrder,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QueryKind::TotalStores => "totalStores",
            QueryKind::TotalKiosks => "totalKiosks",
            QueryKind::StoreStatus => "storeStatus",
            QueryKind::KioskStatus => "kioskStatus",
            QueryKind::OrderFailureTrend => "orderFailureTrend",
            QueryKind::TypeOfIssues => "typeOfIssues",
            QueryKind::OrderFailureTypes => "orderFailureTypes",
            QueryKind::AlertHeatmap => "alertHeatmap",
            QueryKind::KioskLocations => "kioskLocations",
            QueryKind::OrderFailureByPos => "orderFailureByPOS",
            QueryKind::OrderFailureTypesToday => "orderFailureTypesToday",
            QueryKind::DisconnectedKiosks => "disconnectedKiosks",
            QueryKind::LastFailedOrder => "lastFailedOrder",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! order_alerts {
    () => {
        "FROM KioskAlertEvent SELECT count(*) \
         WHERE store_online = 1 AND alert_category_name IN ('Order', 'CalcTotal') "
    };
}

macro_rules! bkus_failure_cases {
    () => {
        "FACET cases( \
         WHERE alert_message LIKE '%INSERT%' AS 'POS Error', \
         WHERE alert_message LIKE '%Could not calculate order due to critical error%' AS 'POS Error', \
         WHERE alert_message LIKE '%ErrorCode: 101%' AS 'POS Error', \
         WHERE alert_message LIKE '%TERMINAL UPDATE IN PROGRESS%' AS 'POS Error', \
         WHERE alert_message LIKE '%TERMINAL IS NOT CONFIGURED TO SERVE KIOSK%' AS 'POS Error', \
         WHERE alert_message LIKE '%SOAPFaultException error was: Server was unable to process request%' AS 'POS Error', \
         WHERE alert_message LIKE '%ErrorCode: 1 Description: Internal result code: 117%' AS 'POS Error', \
         WHERE alert_message LIKE '%ErrorCode: 2 Description: Internal Service Error%' AS 'POS Error', \
         WHERE alert_message LIKE '%SubtotalMismatchException%' AS 'Total mismatch', \
         WHERE alert_message LIKE '%SocketTimeoutException%' AS 'Network Connection Timeout', \
         WHERE alert_message LIKE '%encountered Read timed out%' AS 'Network Connection Timeout', \
         WHERE alert_message LIKE '%Connection timed out%' AS 'Network Connection Timeout', \
         WHERE alert_message LIKE '%Place order failed - 0%' AS 'Network Connection Timeout', \
         WHERE alert_message LIKE '%java.net.SocketException: Connection%' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%ConnectException: Connection %' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%java.net.UnknownHostException%' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%No route to host%' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%Connection reset%' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%PLU IS INACTIVE Expected: 30000026%' AS 'Donation-plu exception', \
         WHERE alert_message LIKE '%SKUMapException%' AS 'Skumap Error', \
         WHERE alert_message LIKE '%NullPointerException error was: null -> Triggered at com.tillster.kiosk.skumapper.SkuNode.<init>%' AS 'Skumap Error', \
         WHERE alert_message LIKE '%ErrorCode: 109%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%Failed to get modifier group id of modifier%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%Failed to get component id%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%INVALID ORDER ITEM - PLU IS INACTIVE%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%INVALID COUPON - AMOUNT%' AS 'Coupon configuration error', \
         WHERE alert_message LIKE '%Attribute name \"amount\"%' AS 'Coupon configuration error', \
         WHERE alert_message LIKE '%INVALID COUPON%' AS 'Coupon configuration error', \
         WHERE alert_message LIKE '%' AS 'Unclassified') "
    };
}

macro_rules! plkus_failure_cases {
    () => {
        "FACET cases( \
         WHERE alert_message LIKE '%INSERT%' AS 'POS Error', \
         WHERE alert_message LIKE '%TERMINAL UPDATE IN PROGRESS%' AS 'POS Error', \
         WHERE alert_message LIKE '%TERMINAL IS NOT CONFIGURED%' AS 'POS Error', \
         WHERE alert_message LIKE '%Employee is not logged in%' AS 'POS Error', \
         WHERE alert_message LIKE '%SOAPFaultException error was: Server was unable to process request%' AS 'POS Error', \
         WHERE alert_message LIKE '%ErrorCode: 1 Description: Internal result code: 117%' AS 'POS Error', \
         WHERE alert_message LIKE '%ErrorCode: 2 Description: Internal Service Error%' AS 'POS Error', \
         WHERE alert_message LIKE '%Property is not available%' AS 'POS Error', \
         WHERE alert_message LIKE '%Employee Object Number % is in training mode, operation not allowed%' AS 'POS Error', \
         WHERE alert_message LIKE '%Menu item definition not found for MenuItem%' AS 'POS Error', \
         WHERE alert_message LIKE '%Service Timeout Detail: The service timed out waiting for the request to be processed%' AS 'POS Error', \
         WHERE alert_message LIKE '%SubtotalMismatchException%' AS 'Total mismatch', \
         WHERE alert_message LIKE '%ORDER SUBTOTAL DOES MATCH SICOM%' AS 'Total mismatch', \
         WHERE alert_message LIKE '%SocketTimeoutException%' AS 'Network Connection Timeout', \
         WHERE alert_message LIKE '%ErrorCode: 101%' AS 'Network Connection Timeout', \
         WHERE alert_message LIKE '%encountered Read timed out%' AS 'Network Connection Timeout', \
         WHERE alert_message LIKE '%Connection timed out%' AS 'Network Connection Timeout', \
         WHERE alert_message LIKE '%Place order failed - 0%' AS 'Network Connection Timeout', \
         WHERE alert_message LIKE '%java.net.SocketException: Connection%' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%ConnectException: Connection %' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%java.net.UnknownHostException%' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%No route to host%' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%Connection reset%' AS 'Network Issues (Connection refused/reset)', \
         WHERE alert_message LIKE '%PLU IS INACTIVE Expected: 30000026%' AS 'Donation-plu exception', \
         WHERE alert_message LIKE '%SKUMapException%' AS 'Skumap Error', \
         WHERE alert_message LIKE '%NullPointerException error was: null -> Triggered at com.tillster.kiosk.skumapper.SkuNode.<init>%' AS 'Skumap Error', \
         WHERE alert_message LIKE '%ErrorCode: 109%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%Failed to get modifier group id of modifier%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%Failed to get component id%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%INVALID ORDER ITEM - PLU IS INACTIVE%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%Item unavailable%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%Cannot be ordered : Out of MenuItem%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%menu_item_availability_insufficient%' AS 'Item out of stock or inactive', \
         WHERE alert_message LIKE '%INVALID COUPON - AMOUNT%' AS 'Coupon configuration error', \
         WHERE alert_message LIKE '%Attribute name \"amount\"%' AS 'Coupon configuration error', \
         WHERE alert_message LIKE '%INVALID COUPON%' AS 'Coupon configuration error', \
         WHERE alert_message LIKE '%INVALID ORDER VALUE MEAL%' AS 'Bad Order Payload', \
         WHERE alert_message LIKE '%Modifier requirements not met%' AS 'Bad Order Payload', \
         WHERE alert_message LIKE '%check_calculator_internal_error, message=Value cannot be null%' AS 'Bad Order Payload', \
         WHERE alert_message LIKE '%Order number is invalid%' AS 'Bad Order Payload', \
         WHERE alert_message LIKE '%INVALID ORDER TAX%' AS 'Bad Order Payload', \
         WHERE alert_message LIKE '%ORDER SUBTOTAL DOES MATCH%' AS 'Bad Order Payload', \
         WHERE alert_message LIKE '%After apply payments, there is a pending balance%' AS 'Bad Order Payload', \
         WHERE alert_message LIKE '%' AS 'Other') "
    };
}

// Both tenants publish the same event schema; only the failure classification differs.
const TOTAL_STORES: &str = "FROM KioskStatusEvent SELECT uniqueCount(storeName) \
    WHERE status IN ('OFFLINE','ONLINE') WITH TIMEZONE '${timezone}' SINCE 1 hour ago LIMIT MAX";

const TOTAL_KIOSKS: &str = "FROM KioskStatusEvent SELECT uniqueCount(concat(storeName, kioskName)) \
    WHERE status IN ('OFFLINE','ONLINE') WITH TIMEZONE '${timezone}' SINCE 1 hour ago LIMIT MAX";

const STORE_STATUS: &str = "SELECT \
    filter(count(*), WHERE latestStatus = 'ONLINE') AS onlineStores, \
    filter(count(*), WHERE latestStatus = 'OFFLINE') AS offlineStores \
    FROM (SELECT latest(status) AS latestStatus FROM KioskStatusEvent FACET storeName LIMIT MAX) \
    WITH TIMEZONE '${timezone}' SINCE 1 hour ago LIMIT MAX";

const KIOSK_STATUS: &str = "SELECT \
    filter(count(*), WHERE latestStatus = 'ONLINE') AS onlineKiosks, \
    filter(count(*), WHERE latestStatus = 'OFFLINE') AS offlineKiosks \
    FROM (SELECT latest(status) AS latestStatus FROM KioskStatusEvent FACET storeName, kioskName LIMIT MAX) \
    WITH TIMEZONE '${timezone}' SINCE 1 hour ago LIMIT MAX";

const ORDER_FAILURE_TREND: &str = concat!(
    order_alerts!(),
    "WITH TIMEZONE '${timezone}' FACET dateOf(timestamp) SINCE last week UNTIL now LIMIT MAX"
);

const TYPE_OF_ISSUES: &str = "FROM KioskAlertEvent SELECT count(*) \
    WHERE alert_level = '1' AND store_online = 1 FACET alert_category_name \
    WITH TIMEZONE '${timezone}' SINCE today UNTIL now LIMIT MAX";

const ALERT_HEATMAP: &str = "FROM KioskAlertEvent SELECT count(*) AS 'Alerts' \
    WHERE store_online = 1 AND alert_category_name IN ('Order', 'CalcTotal') AND alert_level = '1' \
    WITH TIMEZONE '${timezone}' SINCE today UNTIL now FACET city, state LIMIT MAX";

const KIOSK_LOCATIONS: &str = "SELECT latest(status) AS status, latest(city) AS city, latest(state) AS state \
    FROM KioskStatusEvent FACET storeName, kioskName \
    WITH TIMEZONE '${timezone}' SINCE 1 hour ago UNTIL now LIMIT MAX";

const ORDER_FAILURE_BY_POS: &str = concat!(
    order_alerts!(),
    "FACET pos_make WITH TIMEZONE '${timezone}' SINCE last week UNTIL now LIMIT MAX"
);

const DISCONNECTED_KIOSKS: &str = "FROM SystemSample SELECT uniqueCount(fullHostname) \
    WITH TIMEZONE '${timezone}' SINCE 1 DAY AGO COMPARE WITH 1 week ago";

const LAST_FAILED_ORDER: &str = concat!(
    "FROM KioskAlertEvent SELECT latest(timestamp), latest(storeName) ",
    "WHERE store_online = 1 AND alert_category_name IN ('Order', 'CalcTotal') ",
    "WITH TIMEZONE '${timezone}' SINCE today UNTIL now LIMIT MAX"
);

const BKUS_ORDER_FAILURE_TYPES: &str = concat!(
    order_alerts!(),
    bkus_failure_cases!(),
    "WITH TIMEZONE '${timezone}' SINCE last week UNTIL now LIMIT MAX"
);

const BKUS_ORDER_FAILURE_TYPES_TODAY: &str = concat!(
    order_alerts!(),
    bkus_failure_cases!(),
    "WITH TIMEZONE '${timezone}' SINCE today UNTIL now LIMIT MAX"
);

const PLKUS_ORDER_FAILURE_TYPES: &str = concat!(
    order_alerts!(),
    plkus_failure_cases!(),
    "WITH TIMEZONE '${timezone}' SINCE last week UNTIL now LIMIT MAX"
);

const PLKUS_ORDER_FAILURE_TYPES_TODAY: &str = concat!(
    order_alerts!(),
    plkus_failure_cases!(),
    "WITH TIMEZONE '${timezone}' SINCE today UNTIL now LIMIT MAX"
);

/// Per-tenant NRQL strings with `${timezone}` substituted
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    vars: HashMap<String, String>,
}

impl QueryCatalog {
    pub fn new(timezone: impl Into<String>) -> Self {
        let mut vars = HashMap::new();
        vars.insert("timezone".to_string(), timezone.into());
        Self { vars }
    }

    pub fn nrql(&self, tenant: Tenant, kind: QueryKind) -> String {
        prepare_query(Self::template(tenant, kind), &self.vars)
    }

    /// Reverse lookup: which catalog query this NRQL text is
    pub fn kind_of(&self, tenant: Tenant, nrql: &str) -> Option<QueryKind> {
        QueryKind::ALL
            .into_iter()
            .find(|kind| self.nrql(tenant, *kind) == nrql)
    }

    fn template(tenant: Tenant, kind: QueryKind) -> &'static str {
        match (kind, tenant) {
            (QueryKind::TotalStores, _) => TOTAL_STORES,
            (QueryKind::TotalKiosks, _) => TOTAL_KIOSKS,
            (QueryKind::StoreStatus, _) => STORE_STATUS,
            (QueryKind::KioskStatus, _) => KIOSK_STATUS,
            (QueryKind::OrderFailureTrend, _) => ORDER_FAILURE_TREND,
            (QueryKind::TypeOfIssues, _) => TYPE_OF_ISSUES,
            (QueryKind::AlertHeatmap, _) => ALERT_HEATMAP,
            (QueryKind::KioskLocations, _) => KIOSK_LOCATIONS,
            (QueryKind::OrderFailureByPos, _) => ORDER_FAILURE_BY_POS,
            (QueryKind::DisconnectedKiosks, _) => DISCONNECTED_KIOSKS,
            (QueryKind::LastFailedOrder, _) => LAST_FAILED_ORDER,
            (QueryKind::OrderFailureTypes, Tenant::Bkus) => BKUS_ORDER_FAILURE_TYPES,
            (QueryKind::OrderFailureTypes, Tenant::Plkus) => PLKUS_ORDER_FAILURE_TYPES,
            (QueryKind::OrderFailureTypesToday, Tenant::Bkus) => BKUS_ORDER_FAILURE_TYPES_TODAY,
            (QueryKind::OrderFailureTypesToday, Tenant::Plkus) => PLKUS_ORDER_FAILURE_TYPES_TODAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timezone_is_substituted() {
        let catalog = QueryCatalog::new("America/New_York");
        let nrql = catalog.nrql(Tenant::Bkus, QueryKind::TotalStores);
        assert!(nrql.contains("WITH TIMEZONE 'America/New_York'"));
        assert!(!nrql.contains("${timezone}"));
    }

    #[test]
    fn test_failure_classification_differs_per_tenant() {
        let catalog = QueryCatalog::new("America/Los_Angeles");
        let bk = catalog.nrql(Tenant::Bkus, QueryKind::OrderFailureTypes);
        let plk = catalog.nrql(Tenant::Plkus, QueryKind::OrderFailureTypes);

        assert!(bk.contains("AS 'Unclassified'"));
        assert!(plk.contains("AS 'Bad Order Payload'"));
        assert!(plk.contains("AS 'Other'"));
        assert_eq!(
            catalog.nrql(Tenant::Bkus, QueryKind::AlertHeatmap),
            catalog.nrql(Tenant::Plkus, QueryKind::AlertHeatmap)
        );
    }

    #[test]
    fn test_kind_of_round_trips_every_query() {
        let catalog = QueryCatalog::new("America/Los_Angeles");
        for tenant in Tenant::ALL {
            for kind in QueryKind::ALL {
                assert_eq!(catalog.kind_of(tenant, &catalog.nrql(tenant, kind)), Some(kind));
            }
        }
        assert_eq!(catalog.kind_of(Tenant::Bkus, "SELECT 1"), None);
    }

    #[test]
    fn test_today_variant_uses_today_window() {
        let catalog = QueryCatalog::new("UTC");
        let nrql = catalog.nrql(Tenant::Plkus, QueryKind::OrderFailureTypesToday);
        assert!(nrql.ends_with("SINCE today UNTIL now LIMIT MAX"));
    }
}
