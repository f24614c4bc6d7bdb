//! Error types for pattern construction and subscriber dispatch.
//!
//! Registration itself has no runtime failures (a [`HandlerRef`] is
//! invocable by construction), which leaves two families:
//! - [`PatternError`]: a pattern or name could not be built from raw JSON;
//! - [`HandlerError`]: a failure raised by a subscriber callback while its
//!   deferred invocation runs.
//!
//! [`HandlerRef`]: crate::HandlerRef

use thiserror::Error;

/// # Failure to build a [`Pattern`] or [`Name`] from a JSON value.
///
/// Raised synchronously by [`Pattern::from_json`] / [`Name::from_json`]
/// and fatal to that call; the typed constructors cannot fail.
///
/// [`Pattern`]: crate::Pattern
/// [`Pattern::from_json`]: crate::Pattern::from_json
/// [`Name`]: crate::Name
/// [`Name::from_json`]: crate::Name::from_json
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PatternError {
    /// The JSON value has no pattern or name representation.
    ///
    /// Only strings, arrays of strings and objects are representable;
    /// scalars and nested arrays are not.
    #[error("unsupported JSON shape: {found}")]
    Unsupported {
        /// Kind of the offending JSON value.
        found: &'static str,
    },
}

impl PatternError {
    pub(crate) fn unsupported(found: &'static str) -> Self {
        PatternError::Unsupported { found }
    }
}

/// # Failure raised by a subscriber callback during deferred dispatch.
///
/// Failures are isolated per invocation: the dispatcher forwards them to
/// the owning observer's error hook when one is set and logs them at
/// `warn` otherwise. They never abort sibling invocations of the same
/// trigger call and never surface through `trigger`, which has already
/// returned by the time the callback runs.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// The callback body returned an error.
    #[error("handler failed: {message}")]
    Failed {
        /// The underlying error message.
        message: String,
    },

    /// The callback body panicked; the panic was caught at the dispatch
    /// boundary.
    #[error("handler panicked: {message}")]
    Panicked {
        /// Rendered panic payload.
        message: String,
    },
}

impl HandlerError {
    /// Creates a `Failed` error from any message.
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed {
            message: message.into(),
        }
    }

    pub(crate) fn panicked(message: impl Into<String>) -> Self {
        HandlerError::Panicked {
            message: message.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventmatch::HandlerError;
    ///
    /// let err = HandlerError::failed("boom");
    /// assert_eq!(err.as_label(), "handler_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Failed { message } => format!("error: {message}"),
            HandlerError::Panicked { message } => format!("panic: {message}"),
        }
    }

    /// True if the failure came from a caught panic rather than an `Err`
    /// return.
    pub fn is_panic(&self) -> bool {
        matches!(self, HandlerError::Panicked { .. })
    }
}

/// Renders a caught panic payload into a readable message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
