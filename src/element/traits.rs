//! Core element traits.
//!
//! Peers are driven from several streaming threads at once, so every
//! method takes `&self` and implementations synchronise internally.

use crate::buffer::Buffer;
use crate::element::{PadTemplate, State};
use crate::error::{FlowError, FlowResult, Result};
use crate::event::Event;
use std::sync::Arc;

// ============================================================================
// Peer Traits
// ============================================================================

/// The peer linked after an element's output pad.
///
/// Receives buffers and serialized events in the order they are pushed.
pub trait Downstream: Send + Sync {
    /// Push a buffer downstream.
    fn push(&self, buffer: Buffer) -> FlowResult;

    /// Push an event downstream. Returns `false` if the peer rejected it.
    fn push_event(&self, event: Event) -> bool;

    /// Get the name of this peer (for debugging/logging).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The peer linked before an element's input pad.
///
/// Serves pull-mode reads and receives events travelling against the data
/// flow (seeks, QoS).
pub trait Upstream: Send + Sync {
    /// Read `length` bytes starting at `offset`.
    fn pull_range(&self, offset: u64, length: usize) -> std::result::Result<Buffer, FlowError>;

    /// Send an event upstream. Returns `false` if the peer rejected it.
    fn push_event(&self, event: Event) -> bool;

    /// Get the name of this peer (for debugging/logging).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<T: Downstream + ?Sized> Downstream for Arc<T> {
    fn push(&self, buffer: Buffer) -> FlowResult {
        (**self).push(buffer)
    }

    fn push_event(&self, event: Event) -> bool {
        (**self).push_event(event)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: Upstream + ?Sized> Upstream for Arc<T> {
    fn pull_range(&self, offset: u64, length: usize) -> std::result::Result<Buffer, FlowError> {
        (**self).pull_range(offset, length)
    }

    fn push_event(&self, event: Event) -> bool {
        (**self).push_event(event)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ============================================================================
// Element
// ============================================================================

/// Descriptive metadata shown by element registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementMetadata {
    /// Human-readable name.
    pub long_name: &'static str,
    /// Category path such as `"Generic"` or `"Codec/Muxer"`.
    pub classification: &'static str,
    /// One-line description.
    pub description: &'static str,
}

/// Lifecycle and introspection surface shared by all elements.
pub trait Element: Send + Sync {
    /// Instance name of this element.
    fn name(&self) -> &str;

    /// Static description of the element type.
    fn metadata(&self) -> ElementMetadata;

    /// Templates of the pads this element can have.
    fn pad_templates(&self) -> Vec<Arc<PadTemplate>>;

    /// Current lifecycle state.
    fn state(&self) -> State;

    /// Move to an adjacent state.
    fn change_state(&self, next: State) -> Result<()>;
}
