//! Tracing integration for structured logging and spans.

use tracing::{Level, Span, span};

/// Create a span for element processing.
///
/// # Example
///
/// ```rust
/// use tagmux::observability::span_element;
///
/// let span = span_element("addtagmux0", "AddTagMux");
/// let _guard = span.enter();
/// ```
#[inline]
pub fn span_element(element: &str, element_type: &str) -> Span {
    span!(
        Level::DEBUG,
        "element",
        element = %element,
        element_type = %element_type
    )
}

/// Create a span for work on one pad of an element.
#[inline]
pub fn span_pad(element: &str, pad: &str) -> Span {
    span!(Level::TRACE, "pad", element = %element, pad = %pad)
}

/// Log a buffer being forwarded.
#[inline]
pub fn trace_buffer_forwarded(element: &str, pad: &str, size: usize, sequence: u64) {
    tracing::trace!(
        element = %element,
        pad = %pad,
        size = size,
        sequence = sequence,
        "buffer forwarded"
    );
}

/// Log end-of-stream on a pad.
#[inline]
pub fn trace_eos(element: &str, pad: &str, pending: usize) {
    tracing::debug!(
        element = %element,
        pad = %pad,
        pending = pending,
        "end of stream"
    );
}

/// Log element state change.
#[inline]
pub fn trace_state_change(element: &str, from: &str, to: &str) {
    tracing::debug!(
        element = %element,
        from = %from,
        to = %to,
        "element state changed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_creation() {
        // These should not panic
        let _span = span_element("addtagmux0", "AddTagMux");
        let _span = span_pad("addtagmux0", "aux-in-0");
    }

    #[test]
    fn test_trace_functions() {
        // These should not panic even without a subscriber
        trace_buffer_forwarded("addtagmux0", "primary-out", 100, 0);
        trace_eos("addtagmux0", "aux-in-0", 0);
        trace_state_change("addtagmux0", "ready", "paused");
    }
}
