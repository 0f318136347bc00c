//! DataSrc element serving byte ranges from inline data.
//!
//! Similar to GStreamer's dataurisrc, but accepts raw bytes directly and
//! answers pull-mode range requests.

use crate::buffer::Buffer;
use crate::element::Upstream;
use crate::error::FlowError;
use crate::event::Event;
use crate::metadata::Metadata;
use bytes::Bytes;
use parking_lot::Mutex;

/// A pull-mode source over inline data.
///
/// Range reads share the backing storage; no bytes are copied. Events
/// sent upstream to the source are recorded.
///
/// # Example
///
/// ```rust
/// use tagmux::element::Upstream;
/// use tagmux::elements::DataSrc;
///
/// let src = DataSrc::from_static(b"hello world");
/// assert_eq!(src.pull_range(6, 5).unwrap().as_bytes(), b"world");
/// ```
pub struct DataSrc {
    name: String,
    data: Bytes,
    events: Mutex<Vec<Event>>,
}

impl DataSrc {
    /// Create a DataSrc from any byte container.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            name: "datasrc".to_string(),
            data: data.into(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Create a DataSrc from static data.
    pub fn from_static(data: &'static [u8]) -> Self {
        Self::from_bytes(Bytes::from_static(data))
    }

    /// Create a DataSrc from a string.
    pub fn from_string(data: &str) -> Self {
        Self::from_bytes(data.as_bytes().to_vec())
    }

    /// Set a custom name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Total size of the data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Events received from downstream, in order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}

impl Upstream for DataSrc {
    /// Serve `length` bytes from `offset`, short at the end of the data.
    ///
    /// Reading at or past the end returns [`FlowError::Eos`].
    fn pull_range(&self, offset: u64, length: usize) -> Result<Buffer, FlowError> {
        let start = usize::try_from(offset).map_err(|_| FlowError::Eos)?;
        if start >= self.data.len() {
            return Err(FlowError::Eos);
        }
        let end = start.saturating_add(length).min(self.data.len());

        let metadata = Metadata::new().with_offset(offset, (end - start) as u64);
        Ok(Buffer::new(self.data.slice(start..end), metadata))
    }

    fn push_event(&self, event: Event) -> bool {
        tracing::trace!(element = %self.name, event = event.name(), "upstream event");
        self.events.lock().push(event);
        true
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SeekEvent;

    #[test]
    fn test_pull_range() {
        let src = DataSrc::from_string("hello world");

        let buf = src.pull_range(0, 5).unwrap();
        assert_eq!(buf.as_bytes(), b"hello");
        assert_eq!(buf.metadata().offset, Some(0));
        assert_eq!(buf.metadata().offset_end, Some(5));

        // Short read at the end
        assert_eq!(src.pull_range(6, 100).unwrap().as_bytes(), b"world");
        assert_eq!(src.pull_range(11, 1), Err(FlowError::Eos));
    }

    #[test]
    fn test_ranges_share_storage() {
        let src = DataSrc::from_static(b"0123456789");
        let a = src.pull_range(0, 10).unwrap();
        let b = src.pull_range(0, 10).unwrap();
        assert!(a.shares_payload(&b));
    }

    #[test]
    fn test_records_events() {
        let src = DataSrc::from_static(b"x").with_name("src0");
        assert!(src.push_event(Event::Seek(SeekEvent::new_bytes(0))));
        assert_eq!(src.events().len(), 1);
        assert_eq!(Upstream::name(&src), "src0");
        assert_eq!(src.len(), 1);
        assert!(!src.is_empty());
    }
}
