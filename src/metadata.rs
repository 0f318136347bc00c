//! Buffer metadata types.

use std::time::Duration;

/// Flags indicating buffer properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BufferFlags {
    /// Buffer follows a discontinuity in the stream.
    pub discont: bool,
    /// Buffer cannot be decoded on its own.
    pub delta_unit: bool,
    /// Buffer carries stream headers.
    pub header: bool,
    /// Buffer is a gap marker with no meaningful payload.
    pub gap: bool,
}

/// Metadata associated with a buffer.
///
/// Timing and position information travels with the payload untouched;
/// tagmux never rewrites it when forwarding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Presentation timestamp.
    pub pts: Option<Duration>,

    /// Decode timestamp.
    pub dts: Option<Duration>,

    /// Duration of this buffer's content.
    pub duration: Option<Duration>,

    /// Monotonic sequence number within a stream.
    pub sequence: u64,

    /// Byte offset in the original source.
    pub offset: Option<u64>,

    /// End byte offset in the original source.
    pub offset_end: Option<u64>,

    /// Buffer flags.
    pub flags: BufferFlags,
}

impl Metadata {
    /// Create new metadata with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create metadata with a sequence number.
    pub fn from_sequence(sequence: u64) -> Self {
        Self {
            sequence,
            ..Default::default()
        }
    }

    /// Set the presentation timestamp.
    pub fn with_pts(mut self, pts: Duration) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Set the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set the byte range this buffer covers in its source.
    pub fn with_offset(mut self, offset: u64, len: u64) -> Self {
        self.offset = Some(offset);
        self.offset_end = Some(offset + len);
        self
    }

    /// Mark the buffer as following a discontinuity.
    pub fn with_discont(mut self) -> Self {
        self.flags.discont = true;
        self
    }
}
