//! Metrics collection using metrics-rs.

use metrics::{Counter, Gauge, Unit, counter, gauge};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

// Metric names as constants for consistency
const AUX_PADS_REQUESTED: &str = "tagmux_aux_pads_requested";
const AUX_PADS_PENDING: &str = "tagmux_aux_pads_pending";
const TAGS_COLLECTED: &str = "tagmux_tags_collected";
const UNITS_REJECTED: &str = "tagmux_units_rejected";
const TAG_EVENTS_EMITTED: &str = "tagmux_tag_events_emitted";
const BUFFERS_FORWARDED: &str = "tagmux_buffers_forwarded";
const BYTES_FORWARDED: &str = "tagmux_bytes_forwarded";

/// Initialize metrics descriptions.
///
/// Call this once at application startup before using any metrics.
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return; // Already initialized
    }

    metrics::describe_counter!(
        AUX_PADS_REQUESTED,
        Unit::Count,
        "Total number of auxiliary pads requested"
    );
    metrics::describe_gauge!(
        AUX_PADS_PENDING,
        Unit::Count,
        "Auxiliary pads that have not reached end-of-stream"
    );
    metrics::describe_counter!(
        TAGS_COLLECTED,
        Unit::Count,
        "Auxiliary data units converted into tags"
    );
    metrics::describe_counter!(
        UNITS_REJECTED,
        Unit::Count,
        "Auxiliary data units dropped as unsupported or late"
    );
    metrics::describe_counter!(
        TAG_EVENTS_EMITTED,
        Unit::Count,
        "Tag events pushed downstream"
    );
    metrics::describe_counter!(
        BUFFERS_FORWARDED,
        Unit::Count,
        "Primary buffers forwarded downstream"
    );
    metrics::describe_counter!(BYTES_FORWARDED, Unit::Bytes, "Primary bytes forwarded downstream");
}

/// Metrics collector for one tag muxer instance.
///
/// Handles are resolved once with the element label attached.
#[derive(Clone)]
pub struct MuxMetrics {
    element: String,
    aux_requested: Counter,
    aux_pending: Gauge,
    tags_collected: Counter,
    units_rejected: Counter,
    tag_events: Counter,
    buffers_forwarded: Counter,
    bytes_forwarded: Counter,
}

impl MuxMetrics {
    /// Create a collector labelled with the element name.
    pub fn new(element: &str) -> Self {
        let label = element.to_string();
        Self {
            element: label.clone(),
            aux_requested: counter!(AUX_PADS_REQUESTED, "element" => label.clone()),
            aux_pending: gauge!(AUX_PADS_PENDING, "element" => label.clone()),
            tags_collected: counter!(TAGS_COLLECTED, "element" => label.clone()),
            units_rejected: counter!(UNITS_REJECTED, "element" => label.clone()),
            tag_events: counter!(TAG_EVENTS_EMITTED, "element" => label.clone()),
            buffers_forwarded: counter!(BUFFERS_FORWARDED, "element" => label.clone()),
            bytes_forwarded: counter!(BYTES_FORWARDED, "element" => label),
        }
    }

    /// Record a new auxiliary pad and the resulting pending count.
    #[inline]
    pub fn record_aux_requested(&self, pending: usize) {
        self.aux_requested.increment(1);
        self.aux_pending.set(pending as f64);
    }

    /// Record the pending count after an auxiliary pad ended.
    #[inline]
    pub fn record_pending(&self, pending: usize) {
        self.aux_pending.set(pending as f64);
    }

    /// Record a data unit turned into a tag.
    #[inline]
    pub fn record_tag_collected(&self) {
        self.tags_collected.increment(1);
    }

    /// Record a dropped auxiliary data unit.
    #[inline]
    pub fn record_rejected(&self) {
        self.units_rejected.increment(1);
    }

    /// Record the tag event being pushed.
    #[inline]
    pub fn record_tag_event(&self) {
        self.tag_events.increment(1);
    }

    /// Record a forwarded primary buffer.
    #[inline]
    pub fn record_forwarded(&self, bytes: usize) {
        self.buffers_forwarded.increment(1);
        self.bytes_forwarded.increment(bytes as u64);
    }

    /// Get the element name.
    pub fn element(&self) -> &str {
        &self.element
    }
}

impl std::fmt::Debug for MuxMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MuxMetrics")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}
