use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("proxy_requests_total", "Total number of generate requests").unwrap();
    pub static ref QUOTA_DENIED: Counter =
        register_counter!("proxy_quota_denied_total", "Requests rejected by the quota ledger").unwrap();
    pub static ref UPSTREAM_FAILURES: Counter =
        register_counter!("proxy_upstream_failures_total", "Admitted requests that failed upstream").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "proxy_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref QUOTA_RECORDS: Gauge =
        register_gauge!("proxy_quota_records", "Identifiers currently tracked by the quota ledger").unwrap();
}
