//! gatebridge — runs gateway-convention applications and turns their
//! output into a raw HTTP/1.1 response.
//!
//! An application receives the request [`Environment`] and a
//! [`StartResponse`] callback, declares its status and headers through the
//! callback, and returns a lazy [`Body`]. The bridge then serializes:
//!
//! ```text
//! ResponseBridge::invoke(env, app)
//!   │
//!   ├── fresh ResponseState
//!   ├── app.call(env, &mut StartResponse)   ── start_response(status, headers, exc_info)
//!   ├── "HTTP/1.1 {status}\r\n" + "{name}: {value}\r\n"… + "\r\n"
//!   ├── drain body (direct writes first), close body
//!   │
//!   ▼
//! String / Bytes
//! ```
//!
//! Nothing is returned unless every step succeeds. The bridge does no
//! validation, adds no headers and applies no timeouts.

mod app;
pub mod body;
mod bridge;
mod error;
pub mod state;

pub use app::{app_fn, AppFn, Application};
pub use body::{iter_body, Body, ChunkedBody, EmptyBody, IterBody, OnceBody};
pub use bridge::ResponseBridge;
pub use error::{BridgeError, BridgeResult};
pub use state::{Phase, ResponseState, ResponseWriter, StartResponse};

pub use gatebridge_core::{
    BodyDecoding, BridgeConfig, Environment, ExcInfo, Header, HeaderList, RestartPolicy,
};
