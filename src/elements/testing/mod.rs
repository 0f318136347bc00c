//! Test and utility source elements.
//!
//! - [`DataSrc`]: Serves pull-mode ranges from inline data

mod datasrc;

pub use datasrc::DataSrc;
