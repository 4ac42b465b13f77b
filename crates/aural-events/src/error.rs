//! Error types for the event rate limiter.

use std::fmt;

use crate::record::EventKind;

/// An error produced when handing an event to a handler.
///
/// Both sides of the sink speak this type: the sink's own intakes return it
/// to the OS dispatcher, and the upstream handlers return it to the sink
/// during a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler does not expose the capability for this event kind.
    ///
    /// On intake this means the wrapped upstream handle was constructed
    /// without the capability; the event is dropped without being buffered.
    UnsupportedCapability(EventKind),
    /// The handler exposes the capability but failed while processing the
    /// event.
    ///
    /// During a flush these are logged and the rest of the batch still
    /// emits.
    Failed(String),
}

impl HandlerError {
    /// Shorthand for a processing failure with a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCapability(kind) => {
                write!(f, "no handler capability for {} events", kind.name())
            }
            Self::Failed(message) => write!(f, "event handler failed: {message}"),
        }
    }
}

impl std::error::Error for HandlerError {}

/// Result of handing one event to a handler.
pub type HandlerResult = Result<(), HandlerError>;
