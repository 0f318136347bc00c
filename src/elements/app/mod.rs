//! Application integration elements.
//!
//! - [`AppSink`]: Collects buffers and events for application code

mod appsink;

pub use appsink::{AppSink, AppSinkStats};
