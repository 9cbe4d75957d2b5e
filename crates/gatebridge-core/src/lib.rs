//! gatebridge-core — value types shared by the gatebridge crates.
//!
//! - [`Environment`]: request metadata handed to applications untouched
//! - [`HeaderList`]: ordered response headers, duplicates kept
//! - [`ExcInfo`]: error context for re-declaring a response
//! - [`BridgeConfig`]: TOML-loadable bridge settings

pub mod config;
pub mod environ;
pub mod header;
pub mod types;

pub use config::{BodyDecoding, BridgeConfig, RestartPolicy};
pub use environ::{EnvValue, Environment};
pub use header::{Header, HeaderList};
pub use types::*;
