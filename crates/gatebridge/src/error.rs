//! Bridge error types.

use thiserror::Error;

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Everything that can stop a response from being assembled.
///
/// None of these are recovered from; no partial response is produced.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The application returned without ever calling start-response.
    #[error("application returned without calling start_response")]
    NotStarted,

    /// start-response was called again without error context while the
    /// restart policy requires it.
    #[error("start_response called again without exc_info")]
    AlreadyStarted,

    /// The application failed: during its call, while yielding body
    /// chunks, or while closing the body. The error is passed through as-is.
    #[error(transparent)]
    Handler(anyhow::Error),

    /// A body chunk was not valid UTF-8.
    #[error("body chunk {index} is not valid utf-8: {source}")]
    Decode {
        index: usize,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl BridgeError {
    /// Wrap an application error, unwrapping bridge errors that were
    /// propagated through the application with `?`.
    pub(crate) fn from_handler(error: anyhow::Error) -> Self {
        match error.downcast::<BridgeError>() {
            Ok(bridge) => bridge,
            Err(other) => BridgeError::Handler(other),
        }
    }

    /// The application's own error, if this is a handler failure.
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            BridgeError::Handler(e) => Some(e),
            _ => None,
        }
    }
}
