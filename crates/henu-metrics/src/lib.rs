//! Metrics collection and Prometheus exporter for henu-rs.
//!
//! Covers entitlement verdicts, recorded downloads, identity sync, team
//! applications and HTTP request latency.

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Initialize Prometheus metrics exporter.
///
/// Starts an HTTP server on the given address to expose metrics.
/// Returns an error message if binding fails.
pub fn init_prometheus(listen: &str) -> Result<(), String> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| format!("invalid metrics listen address: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install prometheus exporter: {}", e))?;

    Ok(())
}

// ============================================================================
// Metric Names
// ============================================================================

/// Entitlement evaluations by outcome ("allowed" or a deny code).
pub const VERDICTS_TOTAL: &str = "henu_verdicts_total";
/// Download record attempts by result ("success", "denied", "failure").
pub const DOWNLOADS_TOTAL: &str = "henu_downloads_total";
/// Downloads whose ledger event committed but counter update failed.
pub const PARTIAL_WRITES_TOTAL: &str = "henu_partial_writes_total";
/// Identity sync runs by outcome ("created", "refreshed", "failed").
pub const IDENTITY_SYNC_TOTAL: &str = "henu_identity_sync_total";
/// Sign-in attempts by result ("success", "rejected", "error").
pub const SIGN_INS_TOTAL: &str = "henu_sign_ins_total";
/// Team applications accepted, labelled by whether the team was notified.
pub const APPLICATIONS_TOTAL: &str = "henu_applications_total";
/// HTTP requests by route and status.
pub const HTTP_REQUESTS_TOTAL: &str = "henu_http_requests_total";
/// HTTP request latency histogram (seconds).
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "henu_http_request_duration_seconds";
/// Total number of errors by type.
pub const ERRORS_TOTAL: &str = "henu_errors_total";

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record an entitlement evaluation.
#[inline]
pub fn record_verdict(outcome: &'static str) {
    counter!(VERDICTS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a download attempt.
#[inline]
pub fn record_download(result: &'static str) {
    counter!(DOWNLOADS_TOTAL, "result" => result).increment(1);
}

#[inline]
pub fn record_partial_write() {
    counter!(PARTIAL_WRITES_TOTAL).increment(1);
    record_error(ERROR_PARTIAL_WRITE);
}

/// Record an identity sync run.
#[inline]
pub fn record_identity_sync(outcome: &'static str) {
    counter!(IDENTITY_SYNC_TOTAL, "outcome" => outcome).increment(1);
}

#[inline]
pub fn record_sign_in(result: &'static str) {
    counter!(SIGN_INS_TOTAL, "result" => result).increment(1);
}

/// Record an accepted team application.
#[inline]
pub fn record_application(notified: bool) {
    let notified = if notified { "true" } else { "false" };
    counter!(APPLICATIONS_TOTAL, "notified" => notified).increment(1);
}

/// Record a finished HTTP request. `route` is the matched path template.
#[inline]
pub fn record_http_request(route: &str, status: u16, duration_secs: f64) {
    counter!(
        HTTP_REQUESTS_TOTAL,
        "route" => route.to_owned(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(HTTP_REQUEST_DURATION_SECONDS, "route" => route.to_owned()).record(duration_secs);
}

/// Record an error by type.
#[inline]
pub fn record_error(error_type: &'static str) {
    counter!(ERRORS_TOTAL, "type" => error_type).increment(1);
}

// ============================================================================
// Error Type Constants (re-exported from henu-core)
// ============================================================================

pub use henu_core::{
    ERROR_AUTH, ERROR_CONFIG, ERROR_IO, ERROR_NOTIFY, ERROR_PARTIAL_WRITE, ERROR_QUOTA_EXCEEDED,
    ERROR_STORE_UNAVAILABLE, ERROR_UNKNOWN_ACCOUNT, ERROR_UNVERIFIED_EMAIL, ERROR_VALIDATION,
};
