//! Bridge configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Call the body's close hook once it has been drained (or failed).
    pub close_body: bool,
    pub restart_policy: RestartPolicy,
    pub decode: BodyDecoding,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            close_body: true,
            restart_policy: RestartPolicy::Replace,
            decode: BodyDecoding::Strict,
        }
    }
}

/// What a second start-response call is allowed to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Any later call replaces status and headers.
    #[default]
    Replace,
    /// A later call must carry error context.
    RequireExcInfo,
}

/// How body chunks become text in string output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyDecoding {
    /// Each chunk must be valid UTF-8.
    #[default]
    Strict,
    /// Invalid sequences become U+FFFD.
    Lossy,
}

impl BridgeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: BridgeConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Builder method: set the restart policy.
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    /// Builder method: set the body decoding mode.
    pub fn with_decoding(mut self, decode: BodyDecoding) -> Self {
        self.decode = decode;
        self
    }

    /// Builder method: enable or disable the body close hook.
    pub fn with_close_body(mut self, close_body: bool) -> Self {
        self.close_body = close_body;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = BridgeConfig::default();
        assert!(config.close_body);
        assert_eq!(config.restart_policy, RestartPolicy::Replace);
        assert_eq!(config.decode, BodyDecoding::Strict);
    }

    #[test]
    fn parse_empty_uses_defaults() {
        let config = BridgeConfig::from_toml_str("").unwrap();
        assert_eq!(config, BridgeConfig::default());
    }

    #[test]
    fn parse_full() {
        let toml_str = r#"
close_body = false
restart_policy = "require_exc_info"
decode = "lossy"
"#;
        let config = BridgeConfig::from_toml_str(toml_str).unwrap();
        assert!(!config.close_body);
        assert_eq!(config.restart_policy, RestartPolicy::RequireExcInfo);
        assert_eq!(config.decode, BodyDecoding::Lossy);
    }

    #[test]
    fn parse_rejects_unknown_policy() {
        assert!(BridgeConfig::from_toml_str(r#"restart_policy = "merge""#).is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let config = BridgeConfig::default()
            .with_decoding(BodyDecoding::Lossy)
            .with_close_body(false);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("lossy"));
        assert_eq!(BridgeConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "restart_policy = \"require_exc_info\"").unwrap();

        let config = BridgeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.restart_policy, RestartPolicy::RequireExcInfo);
        assert!(config.close_body);
    }

    #[test]
    fn from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BridgeConfig::from_file(&dir.path().join("bridge.toml")).is_err());
    }
}
