//! Error types reported by subscription handlers.
//!
//! [`HandlerError`] is what a handler future resolves to when it fails. The
//! dispatch loop never propagates it: every failure is contained to the
//! handler that produced it and reported through `tracing`.
//!
//! The type provides helper methods (`as_label`, `as_message`) for logs and
//! metrics, in the same shape for every variant.

use thiserror::Error;

/// # Errors produced by subscription handlers.
///
/// Returned by a handler's future, or synthesized by the dispatch loop when
/// a handler panics or receives a payload of the wrong type.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler's own logic failed.
    #[error("handler failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// An erased payload could not be narrowed to the type the handler expects.
    #[error("payload type mismatch: expected {expected}")]
    PayloadMismatch {
        /// Name of the type the handler was registered for.
        expected: &'static str,
    },

    /// The handler panicked while being invoked or polled.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic message, or `"unknown panic"` when the payload is not a string.
        info: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Failed`].
    ///
    /// # Example
    /// ```
    /// use broadcaster::HandlerError;
    ///
    /// let err = HandlerError::fail("disk full");
    /// assert_eq!(err.to_string(), "handler failed: disk full");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use broadcaster::HandlerError;
    ///
    /// let err = HandlerError::PayloadMismatch { expected: "u32" };
    /// assert_eq!(err.as_label(), "handler_payload_mismatch");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::PayloadMismatch { .. } => "handler_payload_mismatch",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Failed { error } => format!("error: {error}"),
            HandlerError::PayloadMismatch { expected } => {
                format!("payload is not a {expected}")
            }
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }

    /// Indicates whether the failure was a panic rather than a returned error.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked { .. })
    }

    /// Renders a caught panic payload into [`HandlerError::Panicked`].
    pub(crate) fn from_panic(panic: Box<dyn std::any::Any + Send>) -> Self {
        let info = if let Some(msg) = panic.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = panic.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        HandlerError::Panicked { info }
    }
}
