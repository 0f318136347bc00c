//! Primary pad path: gate, flush once, then forward.
//!
//! Every primary operation (buffer, event, pull) first passes the gate.
//! Once the gate is open the operations forward straight to the linked
//! peers and never take the muxer lock again.

use super::AddTagMux;
use super::gate::Passage;
use crate::buffer::Buffer;
use crate::element::{Downstream, Upstream};
use crate::error::{FlowError, FlowResult};
use crate::event::{Event, TagList, TagsEvent};
use crate::observability::{span_element, trace_buffer_forwarded};
use std::sync::Arc;
use std::sync::atomic::Ordering;

impl AddTagMux {
    /// Push a buffer into `primary-in`.
    ///
    /// Blocks while auxiliary pads are still streaming. The tags event, if
    /// any, reaches downstream before this buffer.
    pub fn chain(&self, buffer: Buffer) -> FlowResult {
        self.pass_gate();

        let Some(peer) = self.downstream() else {
            return Err(FlowError::NotLinked);
        };
        let size = buffer.len();
        let sequence = buffer.metadata().sequence;

        let result = peer.push(buffer);
        if result.is_ok() {
            let inner = &self.inner;
            inner.buffers_forwarded.fetch_add(1, Ordering::Relaxed);
            inner.metrics.record_forwarded(size);
            trace_buffer_forwarded(&inner.config.name, super::PRIMARY_OUT, size, sequence);
        }
        result
    }

    /// Push an event into `primary-in`.
    ///
    /// Gated like [`chain`](Self::chain), then forwarded unchanged. Events
    /// that only travel upstream are refused without touching the gate.
    pub fn sink_event(&self, event: Event) -> bool {
        if !event.is_downstream() {
            tracing::warn!(
                element = %self.inner.config.name,
                event = event.name(),
                "upstream-only event on sink pad"
            );
            return false;
        }
        self.pass_gate();

        match self.downstream() {
            Some(peer) => peer.push_event(event),
            None => {
                tracing::debug!(
                    element = %self.inner.config.name,
                    event = event.name(),
                    "no downstream peer, dropping event"
                );
                false
            }
        }
    }

    /// Pull a range through `primary-out`.
    ///
    /// Gated like [`chain`](Self::chain), then served by the upstream peer
    /// unchanged.
    pub fn get_range(&self, offset: u64, length: usize) -> Result<Buffer, FlowError> {
        self.pass_gate();

        match self.upstream() {
            Some(peer) => peer.pull_range(offset, length),
            None => Err(FlowError::NotLinked),
        }
    }

    /// Send an event upstream from `primary-out`.
    ///
    /// Upstream events do not pass the gate. Downstream-only events are
    /// refused.
    pub fn src_event(&self, event: Event) -> bool {
        if !event.is_upstream() {
            tracing::warn!(
                element = %self.inner.config.name,
                event = event.name(),
                "downstream-only event on source pad"
            );
            return false;
        }
        match self.upstream() {
            Some(peer) => peer.push_event(event),
            None => false,
        }
    }

    fn downstream(&self) -> Option<Arc<dyn Downstream>> {
        self.inner.downstream.read().clone()
    }

    fn upstream(&self) -> Option<Arc<dyn Upstream>> {
        self.inner.upstream.read().clone()
    }

    fn pass_gate(&self) {
        if self.inner.gate.is_open() {
            return;
        }
        if self.inner.gate.pass(|tags| self.push_tags(tags)) == Passage::Flushed {
            tracing::debug!(element = %self.inner.config.name, "switched to passthrough");
        }
    }

    /// Push the collected tags as one event; an empty list sends nothing.
    fn push_tags(&self, tags: TagList) -> bool {
        let inner = &self.inner;
        let _span = span_element(&inner.config.name, super::ELEMENT_TYPE).entered();

        if tags.is_empty() {
            tracing::debug!(element = %inner.config.name, "no tags collected");
            return false;
        }

        let count = tags.len();
        let Some(peer) = self.downstream() else {
            tracing::warn!(
                element = %inner.config.name,
                tags = count,
                "no downstream peer, tags lost"
            );
            return false;
        };

        if peer.push_event(Event::Tags(TagsEvent::new(tags))) {
            inner.metrics.record_tag_event();
            tracing::debug!(element = %inner.config.name, tags = count, "pushed tags");
            true
        } else {
            tracing::warn!(element = %inner.config.name, tags = count, "tags event rejected");
            false
        }
    }
}
