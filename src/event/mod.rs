//! Events and tagging system for pipelines.
//!
//! Events are out-of-band messages that flow alongside buffers: caps,
//! segments, tags, end-of-stream, and upstream requests such as seeks.
//!
//! # Event Types
//!
//! Events are categorized by their flow direction:
//!
//! - **Downstream events**: Flow with data (stream-start, caps, segment, tags, EOS)
//! - **Upstream events**: Flow against data (seek)
//! - **Bidirectional events**: Can flow either way (flush)
//!
//! # Example
//!
//! ```rust
//! use tagmux::event::{Event, TagList, TagMergeMode, TagsEvent};
//!
//! let mut tags = TagList::new();
//! tags.add("title", "My Video", TagMergeMode::Append);
//!
//! let event = Event::Tags(TagsEvent::new(tags));
//!
//! assert!(event.is_downstream());
//! assert_eq!(event.name(), "tags");
//! ```

mod tags;

pub use tags::{ImageType, Sample, Tag, TagList, TagMergeMode, TagValue, tag_names};

use crate::buffer::Buffer;
use crate::format::Caps;

// ============================================================================
// Event Enum
// ============================================================================

/// Events that flow through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // ========== Downstream Events ==========
    /// Start of a new stream.
    StreamStart(StreamStartEvent),

    /// Negotiated caps for the data that follows.
    Caps(Caps),

    /// Defines a playback segment (timeline).
    Segment(SegmentEvent),

    /// Stream tags.
    Tags(TagsEvent),

    /// End of stream - no more data will be produced.
    Eos,

    // ========== Upstream Events ==========
    /// Seek request.
    Seek(SeekEvent),

    // ========== Bidirectional Events ==========
    /// Flush start - immediately discard buffered data.
    FlushStart,

    /// Flush stop - resume normal operation.
    FlushStop {
        /// Whether to reset running time to 0.
        reset_time: bool,
    },

    /// Application-defined event (QoS, navigation, ...).
    Custom(CustomEvent),
}

impl Event {
    /// Check if this is a downstream event (flows with data).
    pub fn is_downstream(&self) -> bool {
        matches!(
            self,
            Event::StreamStart(_)
                | Event::Caps(_)
                | Event::Segment(_)
                | Event::Tags(_)
                | Event::Eos
                | Event::FlushStart
                | Event::FlushStop { .. }
        ) || matches!(self, Event::Custom(c) if !c.upstream)
    }

    /// Check if this is an upstream event (flows against data).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Event::Seek(_) | Event::FlushStart | Event::FlushStop { .. }
        ) || matches!(self, Event::Custom(c) if c.upstream)
    }

    /// Get a human-readable name for this event type.
    pub fn name(&self) -> &'static str {
        match self {
            Event::StreamStart(_) => "stream-start",
            Event::Caps(_) => "caps",
            Event::Segment(_) => "segment",
            Event::Tags(_) => "tags",
            Event::Eos => "eos",
            Event::Seek(_) => "seek",
            Event::FlushStart => "flush-start",
            Event::FlushStop { .. } => "flush-stop",
            Event::Custom(_) => "custom",
        }
    }

    /// Borrow the tag list if this is a tags event.
    pub fn as_tags(&self) -> Option<&TagList> {
        match self {
            Event::Tags(t) => Some(&t.tags),
            _ => None,
        }
    }
}

// ============================================================================
// Stream Start Event
// ============================================================================

/// Stream start event - begins a new logical stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStartEvent {
    /// Unique stream identifier.
    pub stream_id: String,
}

impl StreamStartEvent {
    /// Create a new stream start event.
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
        }
    }
}

// ============================================================================
// Segment Event
// ============================================================================

/// Format of segment and seek positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SegmentFormat {
    /// Positions in nanoseconds.
    #[default]
    Time,
    /// Positions in bytes.
    Bytes,
}

/// Segment event - defines the playback timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentEvent {
    /// Segment format.
    pub format: SegmentFormat,
    /// Segment start position.
    pub start: u64,
    /// Segment stop position, if bounded.
    pub stop: Option<u64>,
    /// Playback rate (1.0 = normal speed).
    pub rate: f64,
}

impl SegmentEvent {
    /// Create a new byte-based segment.
    pub fn new_bytes(start: u64, stop: Option<u64>) -> Self {
        Self {
            format: SegmentFormat::Bytes,
            start,
            stop,
            rate: 1.0,
        }
    }

    /// Create a new time-based segment (nanoseconds).
    pub fn new_time(start: u64, stop: Option<u64>) -> Self {
        Self {
            format: SegmentFormat::Time,
            ..Self::new_bytes(start, stop)
        }
    }
}

impl Default for SegmentEvent {
    fn default() -> Self {
        Self::new_time(0, None)
    }
}

// ============================================================================
// Tags Event
// ============================================================================

/// Tags event - stream metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TagsEvent {
    /// The tag list.
    pub tags: TagList,
    /// How downstream should merge these tags with what it has.
    pub mode: TagMergeMode,
}

impl TagsEvent {
    /// Create a new tags event.
    pub fn new(tags: TagList) -> Self {
        Self {
            tags,
            mode: TagMergeMode::default(),
        }
    }

    /// Create with a specific merge mode.
    pub fn with_mode(tags: TagList, mode: TagMergeMode) -> Self {
        Self { tags, mode }
    }
}

// ============================================================================
// Seek Event
// ============================================================================

/// Seek event - request to jump to a position.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekEvent {
    /// Seek rate (1.0 = normal, -1.0 = reverse).
    pub rate: f64,
    /// Format of the positions.
    pub format: SegmentFormat,
    /// Flush the pipeline before seeking.
    pub flush: bool,
    /// Target position.
    pub position: u64,
}

impl SeekEvent {
    /// Create a flushing byte seek.
    pub fn new_bytes(position: u64) -> Self {
        Self {
            rate: 1.0,
            format: SegmentFormat::Bytes,
            flush: true,
            position,
        }
    }

    /// Create a flushing time seek (nanoseconds).
    pub fn new_time(position: u64) -> Self {
        Self {
            format: SegmentFormat::Time,
            ..Self::new_bytes(position)
        }
    }
}

// ============================================================================
// Custom Event
// ============================================================================

/// Application-defined event travelling in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEvent {
    /// Event name, e.g. `"qos"`.
    pub name: String,
    /// Whether the event travels against the data flow.
    pub upstream: bool,
}

impl CustomEvent {
    /// Create an event that travels against the data flow.
    pub fn upstream(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upstream: true,
        }
    }

    /// Create an event that travels with the data flow.
    pub fn downstream(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upstream: false,
        }
    }
}

// ============================================================================
// Pipeline Item
// ============================================================================

/// Item that flows through the pipeline - either a buffer or an event.
///
/// Recording both in one sequence preserves the relative order of
/// serialized events and data.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineItem {
    /// A data buffer.
    Buffer(Buffer),
    /// An event.
    Event(Event),
}

impl PipelineItem {
    /// Check if this is a buffer.
    pub fn is_buffer(&self) -> bool {
        matches!(self, PipelineItem::Buffer(_))
    }

    /// Check if this is an event.
    pub fn is_event(&self) -> bool {
        matches!(self, PipelineItem::Event(_))
    }

    /// Get the buffer if this is a buffer.
    pub fn as_buffer(&self) -> Option<&Buffer> {
        match self {
            PipelineItem::Buffer(b) => Some(b),
            _ => None,
        }
    }

    /// Get the event if this is an event.
    pub fn as_event(&self) -> Option<&Event> {
        match self {
            PipelineItem::Event(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Buffer> for PipelineItem {
    fn from(buffer: Buffer) -> Self {
        PipelineItem::Buffer(buffer)
    }
}

impl From<Event> for PipelineItem {
    fn from(event: Event) -> Self {
        PipelineItem::Event(event)
    }
}
