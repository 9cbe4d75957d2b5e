//! `ResponseBridge` — runs an application and assembles its HTTP/1.1 response.

use bytes::{Bytes, BytesMut};
use gatebridge_core::{BodyDecoding, BridgeConfig, Environment};

use crate::app::Application;
use crate::body::Body;
use crate::error::{BridgeError, BridgeResult};
use crate::state::{ResponseState, StartResponse};

/// Runs gateway applications and serializes what they produce.
///
/// Holds configuration only. Every invocation gets its own
/// [`ResponseState`], so one bridge can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct ResponseBridge {
    config: BridgeConfig,
}

/// Everything an application produced for one request, not yet serialized.
struct Collected {
    head: String,
    chunks: Vec<Bytes>,
}

impl Collected {
    fn body_len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }
}

impl ResponseBridge {
    /// A bridge with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Run `app` for one request and return the full response as text.
    ///
    /// Output is `HTTP/1.1 <status>\r\n`, one `<name>: <value>\r\n` line per
    /// header in declaration order, `\r\n`, then every body chunk decoded
    /// and concatenated. Direct writes precede the returned body's chunks.
    pub fn invoke<A>(&self, environ: &Environment, app: &A) -> BridgeResult<String>
    where
        A: Application + ?Sized,
    {
        let collected = self.collect(environ, app)?;

        let mut out = String::with_capacity(collected.head.len() + collected.body_len());
        out.push_str(&collected.head);
        for (index, chunk) in collected.chunks.iter().enumerate() {
            match self.config.decode {
                BodyDecoding::Strict => {
                    let text = std::str::from_utf8(chunk)
                        .map_err(|source| BridgeError::Decode { index, source })?;
                    out.push_str(text);
                }
                BodyDecoding::Lossy => out.push_str(&String::from_utf8_lossy(chunk)),
            }
        }
        Ok(out)
    }

    /// Run `app` for one request and return the full response as raw bytes.
    ///
    /// Same layout as [`invoke`](Self::invoke), but body chunks are copied
    /// without decoding.
    pub fn invoke_bytes<A>(&self, environ: &Environment, app: &A) -> BridgeResult<Bytes>
    where
        A: Application + ?Sized,
    {
        let collected = self.collect(environ, app)?;

        let mut out = BytesMut::with_capacity(collected.head.len() + collected.body_len());
        out.extend_from_slice(collected.head.as_bytes());
        for chunk in &collected.chunks {
            out.extend_from_slice(chunk);
        }
        Ok(out.freeze())
    }

    /// Call the application, then drain its body. Nothing is serialized
    /// past the head until every step has succeeded.
    fn collect<A>(&self, environ: &Environment, app: &A) -> BridgeResult<Collected>
    where
        A: Application + ?Sized,
    {
        let mut state = ResponseState::new();
        let mut body = {
            let mut start = StartResponse::new(&mut state, self.config.restart_policy);
            app.call(environ, &mut start)
                .map_err(BridgeError::from_handler)?
        };

        let head = match state.head() {
            Ok(head) => head,
            Err(e) => {
                self.close(&mut body, false)?;
                return Err(e);
            }
        };

        let mut chunks = state.into_written();
        let drained = drain(&mut body, &mut chunks);
        self.close(&mut body, drained.is_ok())?;
        drained?;

        let collected = Collected { head, chunks };
        tracing::debug!(
            head_bytes = collected.head.len(),
            chunks = collected.chunks.len(),
            body_bytes = collected.body_len(),
            "response assembled"
        );
        Ok(collected)
    }

    /// Run the body's close hook if configured. A close failure is reported
    /// only when nothing failed before it.
    fn close<B: Body>(&self, body: &mut B, report: bool) -> BridgeResult<()> {
        if !self.config.close_body {
            return Ok(());
        }
        match body.close() {
            Ok(()) => Ok(()),
            Err(e) if report => Err(BridgeError::from_handler(e)),
            Err(e) => {
                tracing::warn!(error = %e, "body close failed after earlier error");
                Ok(())
            }
        }
    }
}

/// Pull every chunk from `body` into `chunks`, in order.
fn drain<B: Body>(body: &mut B, chunks: &mut Vec<Bytes>) -> BridgeResult<()> {
    while let Some(chunk) = body.next_chunk().map_err(BridgeError::from_handler)? {
        chunks.push(chunk);
    }
    Ok(())
}
