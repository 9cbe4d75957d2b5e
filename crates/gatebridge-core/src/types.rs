//! Shared types used across gatebridge crates.

use std::fmt;

/// Error context an application passes when it re-declares the response
/// after something went wrong.
///
/// Wraps the application's own error so the bridge can log it, or hand it
/// back unchanged when the response can no longer be replaced.
pub struct ExcInfo {
    error: anyhow::Error,
}

impl ExcInfo {
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// Build from a plain message.
    pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self {
            error: anyhow::Error::msg(message),
        }
    }

    pub fn error(&self) -> &anyhow::Error {
        &self.error
    }

    pub fn into_error(self) -> anyhow::Error {
        self.error
    }
}

impl fmt::Debug for ExcInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExcInfo").field(&self.error).finish()
    }
}

impl fmt::Display for ExcInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl From<anyhow::Error> for ExcInfo {
    fn from(error: anyhow::Error) -> Self {
        Self { error }
    }
}

/// Protocol label written at the start of every status line.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Line terminator used for the status line, headers and the blank line.
pub const CRLF: &str = "\r\n";
