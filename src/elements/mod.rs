//! Built-in elements.
//!
//! ## Muxers
//! - [`AddTagMux`]: Injects auxiliary streams into a primary stream as tags
//!
//! ## Sources
//! - [`DataSrc`]: Serves pull-mode ranges from inline data
//!
//! ## Sinks
//! - [`AppSink`]: Collects buffers and events for application code

mod app;
pub mod tagmux;
mod testing;

// Muxers
pub use tagmux::{AddTagMux, AuxPad, AuxPadState, Mode, TagMuxConfig, TagMuxStats};

// Sources
pub use testing::DataSrc;

// Sinks
pub use app::{AppSink, AppSinkStats};
