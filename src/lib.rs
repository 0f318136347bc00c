//! # tagmux
//!
//! A streaming element that injects side-channel content (cover images,
//! URI lists) into a primary stream as tags, without touching the primary
//! payload.
//!
//! ## Features
//!
//! - **Request pads**: any number of `aux-in-%d` inputs created on demand
//! - **Barrier**: primary traffic waits until every auxiliary pad ended
//! - **One tags event**: collected images are pushed downstream exactly once
//! - **Passthrough**: afterwards the primary pads forward without locking
//! - **Zero-copy**: buffers are `bytes::Bytes` views, never copied
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tagmux::prelude::*;
//!
//! let mux = AddTagMux::new();
//! let sink = Arc::new(AppSink::new());
//! mux.link_downstream(sink.clone());
//!
//! // Side stream: one PNG declared as the back cover
//! let aux = mux.request_aux_pad().unwrap();
//! aux.set_caps(Caps::new(MediaType::Png).with_field("image-type", "back-cover"));
//! aux.chain(Buffer::from_static(b"\x89PNG\r\n\x1a\n...")).unwrap();
//! aux.end_of_stream();
//!
//! // Primary stream: the tags event goes out first
//! mux.chain(Buffer::from_static(b"P1")).unwrap();
//!
//! let events = sink.events();
//! let cover = events[0].as_tags().and_then(|t| t.images().next()).unwrap();
//! assert_eq!(cover.image_type(), Some(ImageType::BackCover));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod element;
pub mod elements;
pub mod error;
pub mod event;
pub mod format;
pub mod metadata;
pub mod observability;
pub mod typefind;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::buffer::Buffer;
    pub use crate::element::{Downstream, Element, State, Upstream};
    pub use crate::elements::{AddTagMux, AppSink, AuxPad, DataSrc, Mode, TagMuxConfig};
    pub use crate::error::{Error, FlowError, FlowResult, FlowSuccess, Result};
    pub use crate::event::{Event, ImageType, TagList};
    pub use crate::format::{Caps, MediaType};
    pub use crate::metadata::Metadata;
    pub use crate::typefind::{MagicTypeFinder, TypeFind};
}

pub use error::{Error, Result};
