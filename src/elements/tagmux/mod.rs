//! Tag muxer: injects side streams into a primary stream as tags.
//!
//! [`AddTagMux`] has two always pads, `primary-in` and `primary-out`, and
//! any number of request pads `aux-in-%d`. Every auxiliary pad carries one
//! side stream (cover art, URI lists) until end-of-stream; recognised data
//! units are collected as `image` tags. The first primary operation blocks
//! until every auxiliary pad has ended, pushes the collected tags once as a
//! single tags event, and switches the primary pads to passthrough for
//! good.
//!
//! ```text
//!   aux-in-0 ──┐
//!   aux-in-1 ──┼─► [ tags ] ─┐
//!   aux-in-N ──┘             ▼
//!   primary-in ──► [ gate ] ──► primary-out
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tagmux::buffer::Buffer;
//! use tagmux::elements::{AddTagMux, AppSink};
//!
//! let mux = AddTagMux::new();
//! let sink = Arc::new(AppSink::new());
//! mux.link_downstream(sink.clone());
//!
//! let cover = mux.request_aux_pad().unwrap();
//! cover.chain(Buffer::from_static(b"\xFF\xD8\xFF\xE0cover")).unwrap();
//! cover.end_of_stream();
//!
//! mux.chain(Buffer::from_static(b"payload")).unwrap();
//!
//! let items = sink.items();
//! assert_eq!(items.len(), 2);
//! assert!(items[0].as_event().and_then(|e| e.as_tags()).is_some());
//! ```

mod aux_pad;
mod gate;
mod primary;

pub use aux_pad::{AuxPad, AuxPadState};
pub use gate::Mode;

use crate::element::{
    Downstream, Element, ElementMetadata, Pad, PadDirection, PadTemplate, State, StateChange,
    Upstream,
};
use crate::error::{Error, Result};
use crate::event::ImageType;
use crate::format::{Caps, MediaType};
use crate::observability::{MuxMetrics, init_metrics, span_element, trace_state_change};
use crate::typefind::{MagicTypeFinder, TypeFind};
use gate::{AuxEntry, Gate, MuxState};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the always input pad.
pub const PRIMARY_IN: &str = "primary-in";
/// Name of the always output pad.
pub const PRIMARY_OUT: &str = "primary-out";

const ELEMENT_TYPE: &str = "AddTagMux";

const METADATA: ElementMetadata = ElementMetadata {
    long_name: "AddTagMux",
    classification: "Generic",
    description: "Mux additional streams as tags",
};

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for [`AddTagMux`].
#[derive(Debug, Clone, PartialEq)]
pub struct TagMuxConfig {
    /// Element instance name used in logs and metric labels.
    pub name: String,
    /// Role given to image tags when the pad declares none.
    pub default_image_type: ImageType,
    /// Caps field carrying the per-pad role override.
    pub image_type_field: String,
    /// Name template of the auxiliary request pads.
    pub aux_template: String,
    /// Treat releasing a still streaming auxiliary pad as its end-of-stream.
    pub release_ends_stream: bool,
}

impl Default for TagMuxConfig {
    fn default() -> Self {
        Self {
            name: "addtagmux".to_string(),
            default_image_type: ImageType::FrontCover,
            image_type_field: "image-type".to_string(),
            aux_template: "aux-in-%d".to_string(),
            release_ends_stream: false,
        }
    }
}

impl TagMuxConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the element name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the role used when a pad declares none.
    pub fn with_default_image_type(mut self, image_type: ImageType) -> Self {
        self.default_image_type = image_type;
        self
    }

    /// Set the caps field read for the role override.
    pub fn with_image_type_field(mut self, field: impl Into<String>) -> Self {
        self.image_type_field = field.into();
        self
    }

    /// Set the auxiliary pad name template (`%d` is replaced by the index).
    pub fn with_aux_template(mut self, template: impl Into<String>) -> Self {
        self.aux_template = template.into();
        self
    }

    /// Choose whether releasing a streaming auxiliary pad ends it.
    pub fn release_ends_stream(mut self, enabled: bool) -> Self {
        self.release_ends_stream = enabled;
        self
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Snapshot of the muxer's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMuxStats {
    /// Auxiliary pads requested over the element's lifetime.
    pub aux_pads_requested: u64,
    /// Auxiliary pads currently registered (not yet released).
    pub aux_pads_active: usize,
    /// Auxiliary pads that have not reached end-of-stream.
    pub pending: usize,
    /// Data units turned into tags.
    pub tags_collected: u64,
    /// Tags waiting for the flush.
    pub tags_queued: usize,
    /// Data units dropped as unsupported or late.
    pub units_rejected: u64,
    /// Whether the tags event went downstream.
    pub tag_event_sent: bool,
    /// Current mode of the primary pads.
    pub mode: Mode,
    /// Primary buffers forwarded downstream.
    pub buffers_forwarded: u64,
}

impl TagMuxStats {
    pub(crate) fn collect(state: &MuxState, buffers_forwarded: u64) -> Self {
        Self {
            aux_pads_requested: state.aux_requested,
            aux_pads_active: state.aux.len(),
            pending: state.pending,
            tags_collected: state.tags_collected,
            tags_queued: state.tags.len(),
            units_rejected: state.units_rejected,
            tag_event_sent: state.tag_event_sent,
            mode: state.mode,
            buffers_forwarded,
        }
    }
}

// ============================================================================
// Element
// ============================================================================

/// State shared between the element and its auxiliary pad handles.
pub(crate) struct Inner {
    pub(crate) config: TagMuxConfig,
    pub(crate) gate: Gate,
    pub(crate) type_finder: Box<dyn TypeFind>,
    pub(crate) metrics: MuxMetrics,
    pub(crate) downstream: RwLock<Option<Arc<dyn Downstream>>>,
    pub(crate) upstream: RwLock<Option<Arc<dyn Upstream>>>,
    pub(crate) buffers_forwarded: AtomicU64,
}

/// Element that muxes auxiliary streams into the primary stream as tags.
///
/// All entry points take `&self`; share the element with `Arc` and drive
/// each pad from its own thread.
pub struct AddTagMux {
    inner: Arc<Inner>,
    aux_template: Arc<PadTemplate>,
    sink_pad: Pad,
    src_pad: Pad,
    state: Mutex<State>,
}

impl AddTagMux {
    /// Create a muxer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TagMuxConfig::default())
    }

    /// Create a muxer with a custom configuration.
    pub fn with_config(config: TagMuxConfig) -> Self {
        Self::with_type_finder(config, MagicTypeFinder::new())
    }

    /// Create a muxer classifying auxiliary data with `type_finder`.
    pub fn with_type_finder(config: TagMuxConfig, type_finder: impl TypeFind + 'static) -> Self {
        init_metrics();

        let aux_template = Arc::new(PadTemplate::request_input(
            config.aux_template.clone(),
            aux_caps(),
        ));
        let sink_pad = Pad::from_template(Arc::new(PadTemplate::input(PRIMARY_IN)), PRIMARY_IN);
        let src_pad = Pad::from_template(Arc::new(PadTemplate::output(PRIMARY_OUT)), PRIMARY_OUT);

        Self {
            inner: Arc::new(Inner {
                metrics: MuxMetrics::new(&config.name),
                config,
                gate: Gate::new(),
                type_finder: Box::new(type_finder),
                downstream: RwLock::new(None),
                upstream: RwLock::new(None),
                buffers_forwarded: AtomicU64::new(0),
            }),
            aux_template,
            sink_pad,
            src_pad,
            state: Mutex::new(State::Null),
        }
    }

    /// The configuration this element was built with.
    pub fn config(&self) -> &TagMuxConfig {
        &self.inner.config
    }

    /// Link the peer receiving from `primary-out`.
    pub fn link_downstream(&self, peer: Arc<dyn Downstream>) {
        tracing::debug!(element = %self.inner.config.name, peer = %peer.name(), "linked downstream");
        *self.inner.downstream.write() = Some(peer);
    }

    /// Link the peer feeding `primary-in`.
    pub fn link_upstream(&self, peer: Arc<dyn Upstream>) {
        tracing::debug!(element = %self.inner.config.name, peer = %peer.name(), "linked upstream");
        *self.inner.upstream.write() = Some(peer);
    }

    /// Remove both peer links.
    pub fn unlink(&self) {
        *self.inner.downstream.write() = None;
        *self.inner.upstream.write() = None;
    }

    /// The `primary-in` pad.
    pub fn sink_pad(&self) -> &Pad {
        &self.sink_pad
    }

    /// The `primary-out` pad.
    pub fn src_pad(&self) -> &Pad {
        &self.src_pad
    }

    /// The template auxiliary pads are created from.
    pub fn aux_template(&self) -> &Arc<PadTemplate> {
        &self.aux_template
    }

    /// Request a new auxiliary pad.
    ///
    /// Only input templates can be served. The pad is named from the
    /// element's auxiliary template and the next free index; `name` is
    /// advisory and ignored. `caps`, if given, become the pad's initial
    /// caps (and may carry the role field).
    pub fn request_pad(
        &self,
        template: &PadTemplate,
        name: Option<&str>,
        caps: Option<&Caps>,
    ) -> Result<AuxPad> {
        if template.direction != PadDirection::Input {
            tracing::error!(
                element = %self.inner.config.name,
                template = %template.name,
                "template not an input"
            );
            return Err(Error::InvalidEndpointRequest(template.name.clone()));
        }

        let caps = caps
            .filter(|caps| self.aux_template.caps.intersects(caps))
            .cloned();

        let _span = span_element(&self.inner.config.name, ELEMENT_TYPE).entered();
        let mut state = self.inner.gate.lock();
        let index = state.next_index;
        state.next_index += 1;
        state.pending += 1;
        state.aux_requested += 1;

        let pad = Pad::from_template(
            Arc::clone(&self.aux_template),
            self.aux_template.instance_name(index),
        );
        state.aux.insert(
            index,
            AuxEntry {
                pad: pad.clone(),
                state: AuxPadState::Streaming,
                caps,
            },
        );

        self.inner.metrics.record_aux_requested(state.pending);
        tracing::debug!(
            element = %self.inner.config.name,
            pad = %pad.name(),
            requested_name = ?name,
            pending = state.pending,
            "auxiliary pad created"
        );

        Ok(AuxPad::new(index, pad, Arc::clone(&self.inner)))
    }

    /// Request a new auxiliary pad from the element's own template.
    pub fn request_aux_pad(&self) -> Result<AuxPad> {
        let template = Arc::clone(&self.aux_template);
        self.request_pad(&template, None, None)
    }

    /// Release an auxiliary pad by name.
    ///
    /// Release only unregisters the pad. A pad released before its
    /// end-of-stream stays pending and keeps the primary pads blocked,
    /// unless [`TagMuxConfig::release_ends_stream`] is set, in which case
    /// the release ends it first.
    pub fn release_pad(&self, name: &str) -> Result<()> {
        let inner = &self.inner;
        let mut state = inner.gate.lock();
        let Some(index) = state
            .aux
            .iter()
            .find(|(_, entry)| entry.pad.name() == name)
            .map(|(index, _)| *index)
        else {
            return Err(Error::NoSuchPad(name.to_string()));
        };

        let streaming = state.aux.get(&index).is_some_and(|e| e.state.is_streaming());
        if streaming {
            if inner.config.release_ends_stream {
                aux_pad::end_stream(inner, &mut state, index);
            } else {
                tracing::warn!(
                    element = %inner.config.name,
                    pad = %name,
                    pending = state.pending,
                    "auxiliary pad released before end-of-stream"
                );
            }
        }

        state.aux.remove(&index);
        tracing::debug!(element = %inner.config.name, pad = %name, "auxiliary pad released");
        Ok(())
    }

    /// Handle to a registered auxiliary pad.
    pub fn aux_pad(&self, name: &str) -> Option<AuxPad> {
        let state = self.inner.gate.lock();
        state
            .aux
            .iter()
            .find(|(_, entry)| entry.pad.name() == name)
            .map(|(index, entry)| AuxPad::new(*index, entry.pad.clone(), Arc::clone(&self.inner)))
    }

    /// Names of the registered auxiliary pads, in index order.
    pub fn aux_pad_names(&self) -> Vec<String> {
        let state = self.inner.gate.lock();
        state
            .aux
            .values()
            .map(|entry| entry.pad.name().to_string())
            .collect()
    }

    /// Number of auxiliary pads that have not reached end-of-stream.
    pub fn pending(&self) -> usize {
        self.inner.gate.lock().pending
    }

    /// Current mode of the primary pads.
    pub fn mode(&self) -> Mode {
        if self.inner.gate.is_open() {
            Mode::Passthrough
        } else {
            self.inner.gate.lock().mode
        }
    }

    /// Whether the primary pads forward without consulting the gate.
    pub fn is_passthrough(&self) -> bool {
        self.inner.gate.is_open()
    }

    /// Get statistics.
    pub fn stats(&self) -> TagMuxStats {
        let forwarded = self.inner.buffers_forwarded.load(Ordering::Relaxed);
        TagMuxStats::collect(&self.inner.gate.lock(), forwarded)
    }
}

impl Default for AddTagMux {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AddTagMux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddTagMux")
            .field("name", &self.inner.config.name)
            .field("state", &*self.state.lock())
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}

impl Element for AddTagMux {
    fn name(&self) -> &str {
        &self.inner.config.name
    }

    fn metadata(&self) -> ElementMetadata {
        METADATA
    }

    fn pad_templates(&self) -> Vec<Arc<PadTemplate>> {
        vec![
            Arc::clone(&self.aux_template),
            Arc::clone(self.sink_pad.template()),
            Arc::clone(self.src_pad.template()),
        ]
    }

    fn state(&self) -> State {
        *self.state.lock()
    }

    /// Step to an adjacent state. Transitions never touch the gate.
    fn change_state(&self, next: State) -> Result<()> {
        let mut state = self.state.lock();
        let Some(change) = StateChange::between(*state, next) else {
            return Err(Error::InvalidStateChange {
                from: *state,
                to: next,
            });
        };

        trace_state_change(
            &self.inner.config.name,
            change.current().name(),
            change.next().name(),
        );
        *state = change.next();
        Ok(())
    }
}

/// Content accepted on auxiliary pads.
fn aux_caps() -> Caps {
    Caps::many([MediaType::Jpeg, MediaType::Png, MediaType::UriList])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::element::PadPresence;
    use crate::error::FlowError;

    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF";

    #[test]
    fn test_config_builder() {
        let config = TagMuxConfig::new()
            .with_name("covers")
            .with_default_image_type(ImageType::BackCover)
            .with_image_type_field("role")
            .with_aux_template("side_%u")
            .release_ends_stream(true);

        assert_eq!(config.name, "covers");
        assert_eq!(config.default_image_type, ImageType::BackCover);
        assert_eq!(config.image_type_field, "role");
        assert!(config.release_ends_stream);

        let mux = AddTagMux::with_config(config);
        assert_eq!(mux.request_aux_pad().unwrap().name(), "side_0");
    }

    #[test]
    fn test_pad_templates() {
        let mux = AddTagMux::new();
        let templates = mux.pad_templates();

        assert_eq!(templates.len(), 3);
        assert_eq!(templates[0].name, "aux-in-%d");
        assert_eq!(templates[0].presence, PadPresence::Request);
        assert!(templates[0].caps.accepts(&MediaType::Jpeg));
        assert!(templates[0].caps.accepts(&MediaType::UriList));
        assert!(!templates[0].caps.accepts(&MediaType::parse("image/gif")));
        assert_eq!(templates[1].name, PRIMARY_IN);
        assert!(templates[1].caps.is_any());
        assert_eq!(templates[2].direction, PadDirection::Output);

        assert_eq!(mux.metadata().long_name, "AddTagMux");
        assert_eq!(mux.metadata().classification, "Generic");
    }

    #[test]
    fn test_request_assigns_increasing_indices() {
        let mux = AddTagMux::new();
        let a = mux.request_aux_pad().unwrap();
        let b = mux.request_aux_pad().unwrap();

        assert_eq!((a.index(), a.name()), (0, "aux-in-0"));
        assert_eq!((b.index(), b.name()), (1, "aux-in-1"));
        assert_eq!(mux.pending(), 2);

        mux.release_pad("aux-in-0").unwrap();
        let c = mux.request_aux_pad().unwrap();
        assert_eq!(c.name(), "aux-in-2");
        assert_eq!(mux.aux_pad_names(), vec!["aux-in-1", "aux-in-2"]);
    }

    #[test]
    fn test_request_rejects_output_template() {
        let mux = AddTagMux::new();
        let template = PadTemplate::output("src_%d");

        let err = mux.request_pad(&template, None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpointRequest(ref name) if name == "src_%d"));
        assert_eq!(mux.pending(), 0);
        assert_eq!(mux.stats().aux_pads_requested, 0);
    }

    #[test]
    fn test_request_with_initial_caps() {
        let mux = AddTagMux::new();
        let template = Arc::clone(mux.aux_template());
        let caps = Caps::new(MediaType::Jpeg).with_field("image-type", "back");

        let pad = mux
            .request_pad(&template, Some("ignored"), Some(&caps))
            .unwrap();
        assert_eq!(pad.name(), "aux-in-0");
        assert_eq!(pad.caps(), Some(caps));
    }

    #[test]
    fn test_release_unknown_pad() {
        let mux = AddTagMux::new();
        assert!(matches!(
            mux.release_pad("aux-in-7"),
            Err(Error::NoSuchPad(ref name)) if name == "aux-in-7"
        ));
    }

    #[test]
    fn test_release_keeps_pending_by_default() {
        let mux = AddTagMux::new();
        let pad = mux.request_aux_pad().unwrap();

        mux.release_pad(pad.name()).unwrap();
        assert_eq!(mux.pending(), 1);
        assert!(mux.aux_pad_names().is_empty());
        assert_eq!(pad.state(), None);
        assert_eq!(pad.chain(Buffer::from_static(JPEG)), Err(FlowError::NotLinked));
    }

    #[test]
    fn test_release_ends_stream_when_configured() {
        let mux = AddTagMux::with_config(TagMuxConfig::new().release_ends_stream(true));
        let pad = mux.request_aux_pad().unwrap();

        mux.release_pad(pad.name()).unwrap();
        assert_eq!(mux.pending(), 0);
    }

    #[test]
    fn test_release_after_eos_is_bookkeeping() {
        let mux = AddTagMux::new();
        let pad = mux.request_aux_pad().unwrap();
        assert!(pad.end_of_stream());

        mux.release_pad(pad.name()).unwrap();
        assert_eq!(mux.pending(), 0);
        assert!(mux.aux_pad("aux-in-0").is_none());
    }

    #[test]
    fn test_state_changes() {
        let mux = AddTagMux::new();
        assert_eq!(mux.state(), State::Null);

        mux.change_state(State::Ready).unwrap();
        mux.change_state(State::Paused).unwrap();
        mux.change_state(State::Playing).unwrap();
        assert_eq!(mux.state(), State::Playing);

        let err = mux.change_state(State::Null).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidStateChange {
                from: State::Playing,
                to: State::Null
            }
        ));
        assert_eq!(mux.state(), State::Playing);
    }

    #[test]
    fn test_state_change_does_not_open_gate() {
        let mux = AddTagMux::new();
        let _pad = mux.request_aux_pad().unwrap();

        mux.change_state(State::Ready).unwrap();
        mux.change_state(State::Null).unwrap();

        assert_eq!(mux.mode(), Mode::Gathering);
        assert_eq!(mux.pending(), 1);
    }

    #[test]
    fn test_stats() {
        let mux = AddTagMux::new();
        let pad = mux.request_aux_pad().unwrap();
        pad.chain(Buffer::from_static(JPEG)).unwrap();
        assert_eq!(
            pad.chain(Buffer::from_static(b"plain text")),
            Err(FlowError::NotSupported)
        );

        let stats = mux.stats();
        assert_eq!(stats.aux_pads_requested, 1);
        assert_eq!(stats.aux_pads_active, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.tags_collected, 1);
        assert_eq!(stats.tags_queued, 1);
        assert_eq!(stats.units_rejected, 1);
        assert!(!stats.tag_event_sent);
        assert_eq!(stats.mode, Mode::Gathering);
    }
}
