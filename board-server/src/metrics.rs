//! Prometheus metrics for the relay.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// Metric names as constants for consistency
const WS_CONNECTIONS_ACTIVE: &str = "board_ws_connections_active";
const FRAMES_RELAYED_TOTAL: &str = "board_frames_relayed_total";
const FRAMES_DROPPED_TOTAL: &str = "board_frames_dropped_total";
const FANOUT_DELIVERIES_TOTAL: &str = "board_fanout_deliveries_total";
const VALIDATION_FAILURES_TOTAL: &str = "board_validation_failures_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Increment active WebSocket connections.
pub fn inc_ws_connections() {
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
}

/// Decrement active WebSocket connections.
pub fn dec_ws_connections() {
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
}

/// Record a frame accepted for fan-out.
///
/// # Arguments
///
/// * `kind` - "text" or "binary"
/// * `deliveries` - Number of peers the frame was queued for
pub fn record_relayed(kind: &'static str, deliveries: usize) {
    counter!(FRAMES_RELAYED_TOTAL, "kind" => kind).increment(1);
    counter!(FANOUT_DELIVERIES_TOTAL).increment(u64::try_from(deliveries).unwrap_or(u64::MAX));
}

/// Record a frame that was not relayed.
///
/// # Arguments
///
/// * `reason` - Why the frame was dropped (`too_large`, `queue_full`)
pub fn record_dropped(reason: &'static str) {
    counter!(FRAMES_DROPPED_TOTAL, "reason" => reason).increment(1);
}

/// Record an input validation failure.
///
/// # Arguments
///
/// * `validation_type` - Type of validation that failed (`board_id`, `message_size`)
pub fn record_validation_failure(validation_type: &'static str) {
    counter!(VALIDATION_FAILURES_TOTAL, "type" => validation_type).increment(1);
}
