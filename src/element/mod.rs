//! Element system for tagmux.
//!
//! This module defines the surface elements are driven through:
//!
//! - [`Downstream`]: the peer an output pad pushes buffers and events into
//! - [`Upstream`]: the peer an input pad pulls ranges from and sends
//!   upstream events to
//! - [`Element`]: lifecycle state and pad template introspection
//!
//! # Design
//!
//! Pads are passive descriptors ([`Pad`], [`PadTemplate`]); the element
//! exposes entry points per pad and forwards to linked peers. Streaming
//! threads call those entry points directly, so there is no executor or
//! channel between elements.

mod pad;
mod state;
mod traits;

pub use pad::{Pad, PadDirection, PadPresence, PadTemplate};
pub use state::{State, StateChange};
pub use traits::{Downstream, Element, ElementMetadata, Upstream};
