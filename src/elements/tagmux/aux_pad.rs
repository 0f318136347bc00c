//! Auxiliary input pads.
//!
//! Every auxiliary pad carries one side stream (cover images, URI lists)
//! until end-of-stream. Recognised data units become `image` tags; the pad
//! state decides what each input does through [`AuxPadState::on`].

use super::gate::MuxState;
use super::Inner;
use crate::buffer::Buffer;
use crate::element::Pad;
use crate::error::{FlowError, FlowResult, FlowSuccess};
use crate::event::{Event, ImageType, Sample};
use crate::format::{Caps, MediaType};
use crate::observability::{span_pad, trace_eos};
use std::sync::Arc;

/// Streaming state of an auxiliary pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuxPadState {
    /// Accepting data; counted as pending.
    #[default]
    Streaming,
    /// End-of-stream received. Terminal.
    Ended,
}

/// Input arriving at an auxiliary pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuxInput {
    Data,
    Caps,
    Eos,
}

/// What to do with an input in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuxAction {
    Collect,
    StoreCaps,
    End,
    RejectLate,
    IgnoreEos,
}

impl AuxPadState {
    /// Transition table.
    pub(crate) fn on(self, input: AuxInput) -> (AuxAction, AuxPadState) {
        use AuxPadState::*;
        match (self, input) {
            (Streaming, AuxInput::Data) => (AuxAction::Collect, Streaming),
            (Streaming, AuxInput::Caps) => (AuxAction::StoreCaps, Streaming),
            (Streaming, AuxInput::Eos) => (AuxAction::End, Ended),
            (Ended, AuxInput::Data) => (AuxAction::RejectLate, Ended),
            (Ended, AuxInput::Caps) => (AuxAction::StoreCaps, Ended),
            (Ended, AuxInput::Eos) => (AuxAction::IgnoreEos, Ended),
        }
    }

    /// Whether the pad still holds the primary pads back.
    pub fn is_streaming(&self) -> bool {
        *self == AuxPadState::Streaming
    }
}

/// Resolve the role for data arriving on a pad.
///
/// An unknown or missing value keeps `default`; a value naming
/// [`ImageType::None`] yields no role at all.
pub(crate) fn resolve_image_type(value: Option<&str>, default: ImageType) -> Option<ImageType> {
    let image_type = value.and_then(ImageType::from_name).unwrap_or(default);
    (image_type != ImageType::None).then_some(image_type)
}

/// Role info for collected content: images and URI lists carry one,
/// anything else is recorded without.
pub(crate) fn image_type_for(
    media_type: &MediaType,
    value: Option<&str>,
    default: ImageType,
) -> Option<ImageType> {
    if media_type.is_image() || media_type.is_uri_list() {
        resolve_image_type(value, default)
    } else {
        None
    }
}

/// Handle to a requested auxiliary pad.
///
/// Handles are cheap to clone and can be moved to the thread driving the
/// side stream. Once the pad is released every call fails with
/// [`FlowError::NotLinked`].
#[derive(Clone)]
pub struct AuxPad {
    index: u32,
    pad: Pad,
    inner: Arc<Inner>,
}

impl AuxPad {
    pub(crate) fn new(index: u32, pad: Pad, inner: Arc<Inner>) -> Self {
        Self { index, pad, inner }
    }

    /// Index assigned at request time.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Pad name, e.g. `aux-in-0`.
    pub fn name(&self) -> &str {
        self.pad.name()
    }

    /// The pad descriptor.
    pub fn pad(&self) -> &Pad {
        &self.pad
    }

    /// Current state, or `None` once the pad has been released.
    pub fn state(&self) -> Option<AuxPadState> {
        self.inner.gate.lock().aux.get(&self.index).map(|e| e.state)
    }

    /// Caps currently set on the pad.
    pub fn caps(&self) -> Option<Caps> {
        self.inner
            .gate
            .lock()
            .aux
            .get(&self.index)
            .and_then(|e| e.caps.clone())
    }

    /// Deliver one data unit.
    ///
    /// Returns [`FlowError::NotSupported`] for content outside the pad's
    /// template (the unit is dropped, the pad keeps streaming) and
    /// [`FlowError::Eos`] once the pad has ended.
    pub fn chain(&self, buffer: Buffer) -> FlowResult {
        let inner = &self.inner;
        let media_type = inner.type_finder.sniff(buffer.as_bytes());

        let mut state = inner.gate.lock();
        let Some(entry) = state.aux.get(&self.index) else {
            return Err(FlowError::NotLinked);
        };
        let pad_state = entry.state;
        let role = entry
            .caps
            .as_ref()
            .and_then(|caps| caps.field(&inner.config.image_type_field))
            .map(str::to_owned);

        match pad_state.on(AuxInput::Data).0 {
            AuxAction::Collect => {}
            _ => {
                tracing::warn!(
                    element = %inner.config.name,
                    pad = %self.pad.name(),
                    "data after end-of-stream, dropping"
                );
                reject(inner, &mut state);
                return Err(FlowError::Eos);
            }
        }

        let media_type = match media_type {
            Some(media_type) if self.pad.template_caps().accepts(&media_type) => media_type,
            other => {
                tracing::warn!(
                    element = %inner.config.name,
                    pad = %self.pad.name(),
                    media_type = ?other.as_ref().map(MediaType::as_str),
                    size = buffer.len(),
                    "unsupported content, dropping"
                );
                reject(inner, &mut state);
                return Err(FlowError::NotSupported);
            }
        };

        if !state.accepts_tags() {
            tracing::warn!(
                element = %inner.config.name,
                pad = %self.pad.name(),
                "tags already sent downstream, dropping"
            );
            reject(inner, &mut state);
            return Err(FlowError::Eos);
        }

        let image_type =
            image_type_for(&media_type, role.as_deref(), inner.config.default_image_type);

        tracing::debug!(
            element = %inner.config.name,
            pad = %self.pad.name(),
            media_type = %media_type,
            image_type = ?image_type,
            size = buffer.len(),
            "collected tag"
        );

        let sample = Sample::new(buffer, Caps::new(media_type)).with_image_type(image_type);
        state.tags.add_image(sample);
        state.tags_collected += 1;
        inner.metrics.record_tag_collected();

        Ok(FlowSuccess::Ok)
    }

    /// Deliver one event.
    ///
    /// Caps are stored for role resolution (and refused if they share no
    /// media type with the template); end-of-stream ends the pad; anything
    /// else is consumed here.
    pub fn event(&self, event: Event) -> bool {
        match event {
            Event::Caps(caps) => self.set_caps(caps),
            Event::Eos => self.end_of_stream(),
            other => {
                tracing::trace!(
                    element = %self.inner.config.name,
                    pad = %self.pad.name(),
                    event = other.name(),
                    "dropping event"
                );
                self.state().is_some()
            }
        }
    }

    /// Set the negotiated caps of this pad.
    pub fn set_caps(&self, caps: Caps) -> bool {
        if !self.pad.template_caps().intersects(&caps) {
            tracing::warn!(
                element = %self.inner.config.name,
                pad = %self.pad.name(),
                caps = %caps,
                "caps not accepted by template"
            );
            return false;
        }

        let mut state = self.inner.gate.lock();
        let Some(entry) = state.aux.get_mut(&self.index) else {
            return false;
        };
        let (action, next) = entry.state.on(AuxInput::Caps);
        debug_assert_eq!(action, AuxAction::StoreCaps);
        tracing::debug!(
            element = %self.inner.config.name,
            pad = %self.pad.name(),
            caps = %caps,
            "caps set"
        );
        entry.state = next;
        entry.caps = Some(caps);
        true
    }

    /// Signal end-of-stream on this pad.
    ///
    /// Returns `true` when this call ended the pad; a repeated
    /// end-of-stream is ignored and leaves the pending count alone.
    pub fn end_of_stream(&self) -> bool {
        let _span = span_pad(&self.inner.config.name, self.pad.name()).entered();
        let mut state = self.inner.gate.lock();
        end_stream(&self.inner, &mut state, self.index)
    }
}

impl std::fmt::Debug for AuxPad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuxPad")
            .field("index", &self.index)
            .field("name", &self.pad.name())
            .finish()
    }
}

fn reject(inner: &Inner, state: &mut MuxState) {
    state.units_rejected += 1;
    inner.metrics.record_rejected();
}

/// End the pad at `index` and wake the primary pads if it was the last.
///
/// Shared with release when releasing implies end-of-stream.
pub(crate) fn end_stream(inner: &Inner, state: &mut MuxState, index: u32) -> bool {
    let Some(entry) = state.aux.get_mut(&index) else {
        return false;
    };

    let (action, next) = entry.state.on(AuxInput::Eos);
    entry.state = next;
    let name = entry.pad.name().to_string();

    match action {
        AuxAction::End => {
            state.pending -= 1;
            trace_eos(&inner.config.name, &name, state.pending);
            inner.metrics.record_pending(state.pending);
            inner.gate.notify_if_idle(state);
            true
        }
        _ => {
            tracing::warn!(
                element = %inner.config.name,
                pad = %name,
                "duplicate end-of-stream ignored"
            );
            false
        }
    }
}
