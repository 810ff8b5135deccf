//! Metrics for the actor service.
//!
//! Naming follows Prometheus conventions:
//! - `actor_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! - `operation`: the eight facade operations plus `verify_access`
//! - `status`: success, error
//! - `error_category`: four values, see [`super::ErrorCategory`]
//! - `error_code`: bounded by [`crate::errors::AcError::code`]
//! - `table`: actors, refresh_tokens

use metrics::{counter, histogram};
use std::time::Duration;

// ============================================================================
// Operation Metrics
// ============================================================================

/// Record a facade operation's duration and outcome
///
/// Metric: `actor_operation_duration_seconds`, `actor_operations_total`
/// Labels: `operation`, `status`
pub fn record_operation(operation: &'static str, status: &'static str, duration: Duration) {
    histogram!("actor_operation_duration_seconds", "operation" => operation, "status" => status)
        .record(duration.as_secs_f64());

    counter!("actor_operations_total", "operation" => operation, "status" => status)
        .increment(1);
}

/// Record token issuance
///
/// Metric: `actor_tokens_issued_total`
/// Labels: `actor_type`
pub fn record_token_issued(actor_type: &'static str) {
    counter!("actor_tokens_issued_total", "actor_type" => actor_type).increment(1);
}

/// Record token validation result
///
/// Metric: `actor_token_validations_total`
/// Labels: `status`, `error_category`
pub fn record_token_validation(status: &'static str, error_category: Option<&'static str>) {
    let category = error_category.unwrap_or("none");
    counter!("actor_token_validations_total", "status" => status, "error_category" => category)
        .increment(1);
}

/// Record a revocation sweep
///
/// Metric: `actor_refresh_tokens_revoked_total`
pub fn record_tokens_revoked(count: u64) {
    counter!("actor_refresh_tokens_revoked_total").increment(count);
}

// ============================================================================
// Storage Metrics
// ============================================================================

/// Record database query execution
///
/// Metric: `actor_db_query_duration_seconds`, `actor_db_queries_total`
/// Labels: `operation`, `table`, `status`
pub fn record_db_query(
    operation: &'static str,
    table: &'static str,
    status: &'static str,
    duration: Duration,
) {
    histogram!("actor_db_query_duration_seconds", "operation" => operation, "table" => table)
        .record(duration.as_secs_f64());

    counter!("actor_db_queries_total", "operation" => operation, "table" => table, "status" => status)
        .increment(1);
}

// ============================================================================
// Crypto Metrics
// ============================================================================

/// Record bcrypt operation duration
///
/// Metric: `actor_bcrypt_duration_seconds`
/// Labels: `operation` (hash, verify)
pub fn record_bcrypt_duration(operation: &'static str, duration: Duration) {
    histogram!("actor_bcrypt_duration_seconds", "operation" => operation)
        .record(duration.as_secs_f64());
}

/// Record a lookup against the identity provider's key set cache
///
/// Metric: `actor_jwks_requests_total`
/// Labels: `cache_status` (hit, miss, error)
pub fn record_jwks_request(cache_status: &'static str) {
    counter!("actor_jwks_requests_total", "cache_status" => cache_status).increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by category
///
/// Metric: `actor_errors_total`
/// Labels: `operation`, `error_category`, `error_code`
pub fn record_error(
    operation: &'static str,
    error_category: &'static str,
    error_code: &'static str,
) {
    counter!("actor_errors_total",
        "operation" => operation,
        "error_category" => error_category,
        "error_code" => error_code
    )
    .increment(1);
}
