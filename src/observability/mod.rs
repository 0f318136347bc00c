//! Observability features: metrics and tracing.
//!
//! - **Metrics**: Counters and gauges via `metrics-rs`
//! - **Tracing**: Structured logging and spans via `tracing`
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `tagmux_aux_pads_requested` | Counter | Auxiliary pads requested |
//! | `tagmux_aux_pads_pending` | Gauge | Auxiliary pads still streaming |
//! | `tagmux_tags_collected` | Counter | Auxiliary units turned into tags |
//! | `tagmux_units_rejected` | Counter | Auxiliary units dropped |
//! | `tagmux_tag_events_emitted` | Counter | Tag events pushed downstream |
//! | `tagmux_buffers_forwarded` | Counter | Primary buffers forwarded |
//! | `tagmux_bytes_forwarded` | Counter | Primary bytes forwarded |
//!
//! All metrics carry an `element` label. No exporter is installed by this
//! crate; without a recorder the handles are no-ops.
//!
//! ## Example
//!
//! ```rust
//! use tagmux::observability::init_metrics;
//!
//! // Initialize metric descriptions (call once at startup)
//! init_metrics();
//! ```

mod metrics;
mod tracing_support;

pub use metrics::{MuxMetrics, init_metrics};
pub use tracing_support::{
    span_element, span_pad, trace_buffer_forwarded, trace_eos, trace_state_change,
};
