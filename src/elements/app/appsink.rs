//! AppSink element for extracting data to application code.
//!
//! Records everything pushed into it, buffers and events alike, in arrival
//! order, so application code can inspect what a stage produced.

use crate::buffer::Buffer;
use crate::element::Downstream;
use crate::error::{FlowError, FlowResult, FlowSuccess};
use crate::event::{Event, PipelineItem};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A sink that collects pushed buffers and events.
///
/// AppSink implements [`Downstream`] and can be linked after any output
/// pad. It is safe to push from several threads while another thread
/// waits for items.
///
/// # Example
///
/// ```rust
/// use tagmux::buffer::Buffer;
/// use tagmux::element::Downstream;
/// use tagmux::elements::AppSink;
/// use tagmux::event::Event;
///
/// let sink = AppSink::new();
/// sink.push(Buffer::from_static(b"hello")).unwrap();
/// sink.push_event(Event::Eos);
///
/// assert_eq!(sink.buffers().len(), 1);
/// assert!(sink.is_eos());
/// ```
pub struct AppSink {
    name: String,
    state: Mutex<AppSinkState>,
    item_available: Condvar,
}

#[derive(Default)]
struct AppSinkState {
    items: Vec<PipelineItem>,
    accept_events: bool,
    flow_error: Option<FlowError>,
    eos: bool,
    total_bytes: u64,
}

/// Statistics for an AppSink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppSinkStats {
    /// Buffers received.
    pub buffers: usize,
    /// Events received.
    pub events: usize,
    /// Payload bytes received.
    pub bytes: u64,
    /// Whether end-of-stream has been received.
    pub eos: bool,
}

impl AppSink {
    /// Create a new AppSink that accepts everything.
    pub fn new() -> Self {
        Self {
            name: "appsink".to_string(),
            state: Mutex::new(AppSinkState {
                accept_events: true,
                ..Default::default()
            }),
            item_available: Condvar::new(),
        }
    }

    /// Set a custom name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set whether pushed events are accepted.
    ///
    /// Rejected events are still recorded.
    pub fn with_event_acceptance(self, accept: bool) -> Self {
        self.state.lock().accept_events = accept;
        self
    }

    /// Refuse every buffer with `error`.
    pub fn with_flow_error(self, error: FlowError) -> Self {
        self.state.lock().flow_error = Some(error);
        self
    }

    /// Everything received, in order.
    pub fn items(&self) -> Vec<PipelineItem> {
        self.state.lock().items.clone()
    }

    /// Buffers received, in order.
    pub fn buffers(&self) -> Vec<Buffer> {
        self.state
            .lock()
            .items
            .iter()
            .filter_map(PipelineItem::as_buffer)
            .cloned()
            .collect()
    }

    /// Events received, in order.
    pub fn events(&self) -> Vec<Event> {
        self.state
            .lock()
            .items
            .iter()
            .filter_map(PipelineItem::as_event)
            .cloned()
            .collect()
    }

    /// Number of items received.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Check if nothing has been received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if end-of-stream has been received.
    pub fn is_eos(&self) -> bool {
        self.state.lock().eos
    }

    /// Wait until at least `count` items have arrived.
    ///
    /// Returns `false` if the timeout expired first.
    pub fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.items.len() < count {
            if self.item_available.wait_until(&mut state, deadline).timed_out() {
                return state.items.len() >= count;
            }
        }
        true
    }

    /// Discard everything received so far.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.items.clear();
        state.eos = false;
        state.total_bytes = 0;
    }

    /// Get statistics.
    pub fn stats(&self) -> AppSinkStats {
        let state = self.state.lock();
        let buffers = state.items.iter().filter(|i| i.is_buffer()).count();
        AppSinkStats {
            buffers,
            events: state.items.len() - buffers,
            bytes: state.total_bytes,
            eos: state.eos,
        }
    }
}

impl Default for AppSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Downstream for AppSink {
    fn push(&self, buffer: Buffer) -> FlowResult {
        let mut state = self.state.lock();
        if let Some(error) = state.flow_error {
            return Err(error);
        }
        if state.eos {
            return Err(FlowError::Eos);
        }
        state.total_bytes += buffer.len() as u64;
        state.items.push(PipelineItem::Buffer(buffer));
        self.item_available.notify_all();
        Ok(FlowSuccess::Ok)
    }

    fn push_event(&self, event: Event) -> bool {
        let mut state = self.state.lock();
        if state.accept_events && matches!(event, Event::Eos) {
            state.eos = true;
        }
        state.items.push(PipelineItem::Event(event));
        self.item_available.notify_all();
        state.accept_events
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_records_in_order() {
        let sink = AppSink::new();
        sink.push_event(Event::Eos);
        sink.clear();

        sink.push(Buffer::from_static(b"a")).unwrap();
        assert!(sink.push_event(Event::FlushStart));
        sink.push(Buffer::from_static(b"bc")).unwrap();

        let items = sink.items();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_buffer());
        assert!(items[1].is_event());
        assert!(items[2].is_buffer());

        let stats = sink.stats();
        assert_eq!(stats.buffers, 2);
        assert_eq!(stats.events, 1);
        assert_eq!(stats.bytes, 3);
        assert!(!stats.eos);
    }

    #[test]
    fn test_eos_refuses_buffers() {
        let sink = AppSink::new();
        assert!(sink.push_event(Event::Eos));
        assert!(sink.is_eos());
        assert_eq!(sink.push(Buffer::from_static(b"late")), Err(FlowError::Eos));
    }

    #[test]
    fn test_rejecting_sink() {
        let sink = AppSink::new()
            .with_name("picky")
            .with_event_acceptance(false)
            .with_flow_error(FlowError::Flushing);

        assert!(!sink.push_event(Event::Eos));
        assert!(!sink.is_eos());
        assert_eq!(sink.events().len(), 1);
        assert_eq!(sink.push(Buffer::from_static(b"x")), Err(FlowError::Flushing));
        assert_eq!(Downstream::name(&sink), "picky");
    }

    #[test]
    fn test_wait_for() {
        let sink = Arc::new(AppSink::new());
        assert!(!sink.wait_for(1, Duration::from_millis(10)));

        let pusher = {
            let sink = Arc::clone(&sink);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                sink.push(Buffer::from_static(b"x")).unwrap();
            })
        };

        assert!(sink.wait_for(1, Duration::from_secs(5)));
        pusher.join().unwrap();
    }
}
