//! Buffer type for zero-copy data passing.

use crate::metadata::Metadata;
use bytes::Bytes;

/// A buffer containing data and metadata.
///
/// The payload is a reference-counted [`Bytes`] view, so cloning or slicing
/// a buffer never copies the underlying bytes. tagmux relies on this to
/// forward primary-stream data and to keep auxiliary payloads inside tags
/// without duplicating them.
///
/// # Example
///
/// ```rust
/// use tagmux::buffer::Buffer;
/// use tagmux::metadata::Metadata;
///
/// let buffer = Buffer::new(vec![1u8, 2, 3, 4], Metadata::from_sequence(0));
///
/// // Clone is O(1) - just a refcount increment
/// let buffer2 = buffer.clone();
/// assert!(buffer.shares_payload(&buffer2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    data: Bytes,
    metadata: Metadata,
}

impl Buffer {
    /// Create a new buffer.
    pub fn new(data: impl Into<Bytes>, metadata: Metadata) -> Self {
        Self {
            data: data.into(),
            metadata,
        }
    }

    /// Create a buffer with default metadata.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(data, Metadata::default())
    }

    /// Create a buffer over static data without allocating.
    pub fn from_static(data: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(data), Metadata::default())
    }

    /// Get the buffer metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Get mutable buffer metadata.
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Replace the metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Get the payload as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the payload handle.
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Take the payload handle.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Get the payload length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Create a sub-buffer sharing this buffer's payload.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len > self.len()`.
    pub fn slice(&self, offset: usize, len: usize) -> Buffer {
        assert!(offset + len <= self.len(), "sub-buffer exceeds parent bounds");
        Buffer {
            data: self.data.slice(offset..offset + len),
            metadata: self.metadata.clone(),
        }
    }

    /// Check whether two buffers view the same payload memory.
    pub fn shares_payload(&self, other: &Buffer) -> bool {
        self.data.as_ptr() == other.data.as_ptr() && self.data.len() == other.data.len()
    }
}

impl From<Bytes> for Buffer {
    fn from(data: Bytes) -> Self {
        Self::from_bytes(data)
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}
