//! Error types for tagmux.
//!
//! Two families are kept apart:
//!
//! - [`Error`]: synchronous API failures (pad requests, state changes).
//! - [`FlowError`]: statuses returned on the data path, mirroring the
//!   flow returns a pipeline runtime hands back to the pushing thread.

use crate::element::State;
use thiserror::Error;

/// Result type alias using tagmux's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tagmux operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A pad was requested from a template this element cannot serve.
    #[error("no such endpoint: {0}")]
    InvalidEndpointRequest(String),

    /// The named pad is not registered on this element.
    #[error("no such pad: {0}")]
    NoSuchPad(String),

    /// A state transition skipped a step or went nowhere.
    #[error("invalid state change from {from:?} to {to:?}")]
    InvalidStateChange {
        /// State the element was in.
        from: State,
        /// State that was requested.
        to: State,
    },

    /// A data-path failure surfaced through the synchronous API.
    #[error("flow error: {0}")]
    Flow(#[from] FlowError),
}

/// Non-success status of a data-path operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowError {
    /// The pad already saw end-of-stream; no more data is accepted.
    #[error("end of stream")]
    Eos,

    /// The data unit's content type is not accepted by the pad.
    #[error("content not supported")]
    NotSupported,

    /// No peer is linked to forward to.
    #[error("pad not linked")]
    NotLinked,

    /// The peer is flushing and refused the data.
    #[error("pad is flushing")]
    Flushing,

    /// Fatal error reported by a peer.
    #[error("stream error")]
    Error,
}

impl FlowError {
    /// Whether the status should stop the streaming thread.
    ///
    /// `NotSupported` is reported per data unit and the pad keeps streaming.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FlowError::NotSupported)
    }
}

/// Successful status of a data-path operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowSuccess {
    /// Data was accepted.
    #[default]
    Ok,
}

/// Status returned by data-path operations.
pub type FlowResult = std::result::Result<FlowSuccess, FlowError>;
