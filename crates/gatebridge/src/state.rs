//! Per-invocation response state and the start-response callback.
//!
//! ```text
//! Unstarted ──start_response──▶ Started ──start_response──▶ Started (replaced)
//! ```
//!
//! A `ResponseState` is created by the bridge for one application call,
//! mutated only through [`StartResponse`], read once for serialization and
//! then dropped.

use std::io;

use bytes::Bytes;
use gatebridge_core::{ExcInfo, HeaderList, RestartPolicy, CRLF, HTTP_VERSION};

use crate::error::{BridgeError, BridgeResult};

/// Where a response is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unstarted,
    Started,
}

/// Status and headers declared by the application for one request.
#[derive(Debug, Default)]
pub struct ResponseState {
    status_line: Option<String>,
    header_list: HeaderList,
    exc_info: Option<ExcInfo>,
    written: Vec<Bytes>,
}

impl ResponseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        if self.status_line.is_some() {
            Phase::Started
        } else {
            Phase::Unstarted
        }
    }

    pub fn is_started(&self) -> bool {
        self.phase() == Phase::Started
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn headers(&self) -> &HeaderList {
        &self.header_list
    }

    /// Error context from the most recent restart, if any.
    pub fn exc_info(&self) -> Option<&ExcInfo> {
        self.exc_info.as_ref()
    }

    /// Chunks written through the direct-write handle, in order.
    pub fn written(&self) -> &[Bytes] {
        &self.written
    }

    /// Serialize the status line, headers and terminating blank line.
    ///
    /// Status and header text is copied verbatim.
    pub fn head(&self) -> BridgeResult<String> {
        let status = self.status_line.as_deref().ok_or(BridgeError::NotStarted)?;

        let mut head = String::with_capacity(
            HTTP_VERSION.len() + status.len() + 4 + self.header_list.len() * 32,
        );
        head.push_str(HTTP_VERSION);
        head.push(' ');
        head.push_str(status);
        head.push_str(CRLF);
        for header in &self.header_list {
            head.push_str(&header.name);
            head.push_str(": ");
            head.push_str(&header.value);
            head.push_str(CRLF);
        }
        head.push_str(CRLF);
        Ok(head)
    }

    pub(crate) fn into_written(self) -> Vec<Bytes> {
        self.written
    }
}

/// The start-response callback handed to an application.
///
/// Borrows the per-invocation [`ResponseState`] mutably for the duration of
/// the application call.
pub struct StartResponse<'a> {
    state: &'a mut ResponseState,
    policy: RestartPolicy,
}

impl<'a> StartResponse<'a> {
    pub fn new(state: &'a mut ResponseState, policy: RestartPolicy) -> Self {
        Self { state, policy }
    }

    /// Declare (or re-declare) the response status and headers.
    ///
    /// A later call fully replaces the earlier status and headers and drops
    /// anything buffered through an earlier writer. Nothing leaves the
    /// bridge before the application returns, so a restart is never too late.
    pub fn start_response(
        &mut self,
        status: impl Into<String>,
        headers: impl Into<HeaderList>,
        exc_info: Option<ExcInfo>,
    ) -> BridgeResult<ResponseWriter<'_>> {
        let status = status.into();
        let headers = headers.into();

        if self.state.is_started() {
            match &exc_info {
                Some(exc) => {
                    tracing::warn!(
                        previous = ?self.state.status_line,
                        %status,
                        error = %exc,
                        discarded = self.state.written.len(),
                        "application replaced response after error"
                    );
                }
                None if self.policy == RestartPolicy::RequireExcInfo => {
                    return Err(BridgeError::AlreadyStarted);
                }
                None => {
                    tracing::debug!(
                        previous = ?self.state.status_line,
                        %status,
                        discarded = self.state.written.len(),
                        "application restarted response"
                    );
                }
            }
            self.state.written.clear();
        } else {
            tracing::debug!(%status, headers = headers.len(), "response started");
        }

        self.state.status_line = Some(status);
        self.state.header_list = headers;
        self.state.exc_info = exc_info;

        Ok(ResponseWriter {
            written: &mut self.state.written,
        })
    }

    /// Read-only view of the state being built.
    pub fn state(&self) -> &ResponseState {
        &*self.state
    }
}

/// Direct-write handle returned by [`StartResponse::start_response`].
///
/// Every non-empty write becomes one chunk placed before the body's own
/// chunks in the output.
pub struct ResponseWriter<'a> {
    written: &'a mut Vec<Bytes>,
}

impl ResponseWriter<'_> {
    /// Append a chunk.
    pub fn send(&mut self, data: impl Into<Bytes>) {
        let data = data.into();
        if !data.is_empty() {
            self.written.push(data);
        }
    }
}

impl io::Write for ResponseWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.send(Bytes::copy_from_slice(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatebridge_core::Header;
    use std::io::Write;

    #[test]
    fn new_state_is_unstarted() {
        let state = ResponseState::new();
        assert_eq!(state.phase(), Phase::Unstarted);
        assert!(state.status_line().is_none());
        assert!(state.headers().is_empty());
    }

    #[test]
    fn head_requires_start() {
        let state = ResponseState::new();
        assert!(matches!(state.head(), Err(BridgeError::NotStarted)));
    }

    #[test]
    fn start_sets_status_and_headers() {
        let mut state = ResponseState::new();
        let mut start = StartResponse::new(&mut state, RestartPolicy::Replace);
        start
            .start_response("201 Created", [("Location", "/items/1")], None)
            .unwrap();

        assert_eq!(state.phase(), Phase::Started);
        assert_eq!(state.status_line(), Some("201 Created"));
        assert_eq!(
            state.headers().iter().next(),
            Some(&Header::new("Location", "/items/1"))
        );
    }

    #[test]
    fn head_layout() {
        let mut state = ResponseState::new();
        StartResponse::new(&mut state, RestartPolicy::Replace)
            .start_response("200 OK", [("A", "1"), ("B", "2")], None)
            .unwrap();

        assert_eq!(state.head().unwrap(), "HTTP/1.1 200 OK\r\nA: 1\r\nB: 2\r\n\r\n");
    }

    #[test]
    fn head_copies_malformed_input_verbatim() {
        let mut state = ResponseState::new();
        StartResponse::new(&mut state, RestartPolicy::Replace)
            .start_response("not a status", [("bad name", "x\ny")], None)
            .unwrap();

        assert_eq!(
            state.head().unwrap(),
            "HTTP/1.1 not a status\r\nbad name: x\ny\r\n\r\n"
        );
    }

    #[test]
    fn restart_with_exc_info_replaces() {
        let mut state = ResponseState::new();
        let mut start = StartResponse::new(&mut state, RestartPolicy::Replace);
        start
            .start_response("200 OK", [("Content-Type", "text/html")], None)
            .unwrap();
        start
            .start_response(
                "500 Internal Server Error",
                [("Content-Type", "text/plain")],
                Some(ExcInfo::msg("render failed")),
            )
            .unwrap();

        assert_eq!(state.status_line(), Some("500 Internal Server Error"));
        assert_eq!(
            state.headers(),
            &HeaderList::from([("Content-Type", "text/plain")])
        );
        assert_eq!(state.exc_info().unwrap().to_string(), "render failed");
    }

    #[test]
    fn restart_without_exc_info_replaces_by_default() {
        let mut state = ResponseState::new();
        let mut start = StartResponse::new(&mut state, RestartPolicy::Replace);
        start.start_response("200 OK", [("A", "1")], None).unwrap();
        start.start_response("204 No Content", HeaderList::new(), None).unwrap();

        assert_eq!(state.status_line(), Some("204 No Content"));
        assert!(state.headers().is_empty());
    }

    #[test]
    fn strict_policy_rejects_restart_without_exc_info() {
        let mut state = ResponseState::new();
        let mut start = StartResponse::new(&mut state, RestartPolicy::RequireExcInfo);
        start.start_response("200 OK", [("A", "1")], None).unwrap();

        let err = start.start_response("404 Not Found", HeaderList::new(), None);
        assert!(matches!(err, Err(BridgeError::AlreadyStarted)));
        assert_eq!(state.status_line(), Some("200 OK"));
    }

    #[test]
    fn strict_policy_allows_restart_with_exc_info() {
        let mut state = ResponseState::new();
        let mut start = StartResponse::new(&mut state, RestartPolicy::RequireExcInfo);
        start.start_response("200 OK", HeaderList::new(), None).unwrap();
        start
            .start_response("502 Bad Gateway", HeaderList::new(), Some(ExcInfo::msg("upstream")))
            .unwrap();

        assert_eq!(state.status_line(), Some("502 Bad Gateway"));
    }

    #[test]
    fn writer_records_chunks() {
        let mut state = ResponseState::new();
        let mut start = StartResponse::new(&mut state, RestartPolicy::Replace);
        let mut writer = start.start_response("200 OK", HeaderList::new(), None).unwrap();
        writer.write_all(b"first").unwrap();
        writer.send("");
        writer.send("second");

        assert_eq!(
            state.written(),
            &[Bytes::from("first"), Bytes::from("second")]
        );
    }

    #[test]
    fn restart_with_exc_info_after_write_drops_buffered_output() {
        let mut state = ResponseState::new();
        let mut start = StartResponse::new(&mut state, RestartPolicy::Replace);
        start
            .start_response("200 OK", HeaderList::new(), None)
            .unwrap()
            .send("partial");

        start
            .start_response(
                "500 Internal Server Error",
                HeaderList::new(),
                Some(ExcInfo::msg("late failure")),
            )
            .unwrap()
            .send("error");

        assert_eq!(state.status_line(), Some("500 Internal Server Error"));
        assert_eq!(state.written(), &[Bytes::from("error")]);
    }

    #[test]
    fn plain_restart_after_write_drops_buffered_output() {
        let mut state = ResponseState::new();
        let mut start = StartResponse::new(&mut state, RestartPolicy::Replace);
        start
            .start_response("200 OK", HeaderList::new(), None)
            .unwrap()
            .send("partial");
        start.start_response("204 No Content", HeaderList::new(), None).unwrap();

        assert_eq!(state.status_line(), Some("204 No Content"));
        assert!(state.written().is_empty());
    }

    #[test]
    fn rejected_restart_keeps_buffered_output() {
        let mut state = ResponseState::new();
        let mut start = StartResponse::new(&mut state, RestartPolicy::RequireExcInfo);
        start
            .start_response("200 OK", HeaderList::new(), None)
            .unwrap()
            .send("partial");

        let err = start.start_response("404 Not Found", HeaderList::new(), None);
        assert!(matches!(err, Err(BridgeError::AlreadyStarted)));
        assert_eq!(state.written(), &[Bytes::from("partial")]);
    }
}
