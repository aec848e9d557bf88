// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for zonesync.
//!
//! All metrics carry the namespace prefix `zonesync_`.
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Runs by mode and outcome, and their duration
//! - **Change Metrics** - Record set changes planned or applied
//! - **Provider Metrics** - Raw record operations sent to providers, and provider errors
//!
//! # Example
//!
//! ```rust,no_run
//! use zonesync::metrics::{gather_metrics, record_reconciliation_success};
//!
//! record_reconciliation_success("record_set", true, std::time::Duration::from_millis(250));
//! println!("{}", gather_metrics().unwrap_or_default());
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all zonesync metrics
const METRICS_NAMESPACE: &str = "zonesync";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by mode and status
///
/// Labels:
/// - `mode`: `record_set` or `record_sets`
/// - `status`: Outcome (`changed`, `unchanged`, `error`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconciliations by mode and status",
    );
    let counter = CounterVec::new(opts, &["mode", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconciliations in seconds
///
/// Labels:
/// - `mode`: `record_set` or `record_sets`
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by mode",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["mode"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Change Metrics
// ============================================================================

/// Total number of record set changes
///
/// Labels:
/// - `action`: `create`, `update` or `delete`
/// - `check_mode`: `true` when the change was only simulated
pub static RECORD_SET_CHANGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_record_set_changes_total"),
        "Total number of record set changes by action",
    );
    let counter = CounterVec::new(opts, &["action", "check_mode"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Provider Metrics
// ============================================================================

/// Total number of raw record operations sent to a provider
///
/// Labels:
/// - `provider`: Provider name
/// - `operation`: `create`, `update`, `delete` or `bulk`
pub static RECORD_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_record_operations_total"),
        "Total number of raw record operations by provider and operation",
    );
    let counter = CounterVec::new(opts, &["provider", "operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of failed provider API requests
///
/// Labels:
/// - `provider`: Provider name
/// - `reason`: Reason string from [`crate::http_errors`]
pub static PROVIDER_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_provider_errors_total"),
        "Total number of failed provider API requests by reason",
    );
    let counter = CounterVec::new(opts, &["provider", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
///
/// # Arguments
/// * `mode` - `record_set` or `record_sets`
/// * `changed` - Whether the run changed (or would change) the zone
/// * `duration` - Duration of the reconciliation
pub fn record_reconciliation_success(mode: &str, changed: bool, duration: Duration) {
    let status = if changed { "changed" } else { "unchanged" };
    RECONCILIATION_TOTAL
        .with_label_values(&[mode, status])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[mode])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
pub fn record_reconciliation_error(mode: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[mode, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[mode])
        .observe(duration.as_secs_f64());
}

/// Record record set changes of one kind
pub fn record_set_changes(action: &str, count: usize, check_mode: bool) {
    if count == 0 {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    RECORD_SET_CHANGES_TOTAL
        .with_label_values(&[action, if check_mode { "true" } else { "false" }])
        .inc_by(count as f64);
}

/// Record one raw record operation sent to a provider
pub fn record_operation(provider: &str, operation: &str) {
    RECORD_OPERATIONS_TOTAL
        .with_label_values(&[provider, operation])
        .inc();
}

/// Record a failed provider request
///
/// # Arguments
/// * `provider` - Provider name
/// * `reason` - Stable reason string (e.g. `NotFound`, `RateLimited`)
pub fn record_provider_error(provider: &str, reason: &str) {
    PROVIDER_ERRORS_TOTAL
        .with_label_values(&[provider, reason])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_reconciliation_success() {
        let mode = "test_success";
        record_reconciliation_success(mode, true, Duration::from_millis(500));

        let counter = RECONCILIATION_TOTAL.with_label_values(&[mode, "changed"]);
        assert!(counter.get() > 0.0);

        let histogram = RECONCILIATION_DURATION_SECONDS.with_label_values(&[mode]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_reconciliation_error() {
        let mode = "test_error";
        record_reconciliation_error(mode, Duration::from_millis(250));

        let counter = RECONCILIATION_TOTAL.with_label_values(&[mode, "error"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn test_record_set_changes_skips_zero() {
        record_set_changes("test_noop", 0, false);
        record_set_changes("test_create", 3, true);

        let counter = RECORD_SET_CHANGES_TOTAL.with_label_values(&["test_create", "true"]);
        assert!(counter.get() >= 3.0);
        let counter = RECORD_SET_CHANGES_TOTAL.with_label_values(&["test_noop", "false"]);
        assert!(counter.get() == 0.0);
    }

    #[test]
    fn test_record_provider_error() {
        record_provider_error("test_provider", "RateLimited");
        let counter = PROVIDER_ERRORS_TOTAL.with_label_values(&["test_provider", "RateLimited"]);
        assert!(counter.get() > 0.0);
    }

    #[test]
    fn test_gather_metrics() {
        record_reconciliation_success("gather_test", false, Duration::from_millis(100));
        record_operation("gather_test", "create");

        let metrics_text = gather_metrics().unwrap();
        assert!(metrics_text.contains("zonesync_reconciliations_total"));
        assert!(metrics_text.contains("zonesync_record_operations_total"));
    }
}
