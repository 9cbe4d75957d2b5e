//! Request environment passed to gateway applications.
//!
//! The bridge never reads this mapping. It exists so a host can pack the
//! request metadata it already parsed (method, path, server variables,
//! request headers, buffered input) into the shape applications expect.

use std::collections::HashMap;

use bytes::Bytes;

/// Well-known environment keys.
pub mod keys {
    pub const VERSION: &str = "wsgi.version";
    pub const URL_SCHEME: &str = "wsgi.url_scheme";
    pub const INPUT: &str = "wsgi.input";
    pub const ERRORS: &str = "wsgi.errors";
    pub const MULTITHREAD: &str = "wsgi.multithread";
    pub const MULTIPROCESS: &str = "wsgi.multiprocess";
    pub const RUN_ONCE: &str = "wsgi.run_once";

    pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
    pub const PATH_INFO: &str = "PATH_INFO";
    pub const QUERY_STRING: &str = "QUERY_STRING";
    pub const SERVER_NAME: &str = "SERVER_NAME";
    pub const SERVER_PORT: &str = "SERVER_PORT";

    /// Prefix for request headers (`User-Agent` -> `HTTP_USER_AGENT`).
    pub const HTTP_PREFIX: &str = "HTTP_";
}

/// A single environment value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Text(String),
    Flag(bool),
    /// Buffered request body.
    Input(Bytes),
}

impl EnvValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EnvValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            EnvValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_input(&self) -> Option<&Bytes> {
        match self {
            EnvValue::Input(b) => Some(b),
            _ => None,
        }
    }
}

impl From<&str> for EnvValue {
    fn from(s: &str) -> Self {
        EnvValue::Text(s.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(s: String) -> Self {
        EnvValue::Text(s)
    }
}

impl From<bool> for EnvValue {
    fn from(b: bool) -> Self {
        EnvValue::Flag(b)
    }
}

impl From<Bytes> for EnvValue {
    fn from(b: Bytes) -> Self {
        EnvValue::Input(b)
    }
}

/// Request environment handed to an application unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, EnvValue>,
}

impl Environment {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment carrying the standard gateway variables a server sets
    /// before every application call.
    pub fn gateway(
        method: impl Into<String>,
        path: impl Into<String>,
        server_name: impl Into<String>,
        server_port: u16,
    ) -> Self {
        let mut env = Self::new();
        env.insert(keys::VERSION, "1.0");
        env.insert(keys::URL_SCHEME, "http");
        env.insert(keys::INPUT, Bytes::new());
        env.insert(keys::ERRORS, "stderr");
        env.insert(keys::MULTITHREAD, true);
        env.insert(keys::MULTIPROCESS, true);
        env.insert(keys::RUN_ONCE, false);
        env.insert(keys::REQUEST_METHOD, EnvValue::Text(method.into()));
        env.insert(keys::PATH_INFO, EnvValue::Text(path.into()));
        env.insert(keys::SERVER_NAME, EnvValue::Text(server_name.into()));
        env.insert(keys::SERVER_PORT, server_port.to_string());
        env
    }

    /// Builder method: attach a buffered request body.
    pub fn with_input(mut self, body: impl Into<Bytes>) -> Self {
        self.insert(keys::INPUT, EnvValue::Input(body.into()));
        self
    }

    /// Builder method: add a request header as an `HTTP_*` variable.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(header_key(name), EnvValue::Text(value.into()));
        self
    }

    /// Builder method: set the query string.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.insert(keys::QUERY_STRING, EnvValue::Text(query.into()));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<EnvValue>) -> Option<EnvValue> {
        self.vars.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.vars.get(key)
    }

    /// Shorthand for text-valued variables.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(EnvValue::as_text)
    }

    /// The buffered request body, if one was attached.
    pub fn input(&self) -> Option<&Bytes> {
        self.get(keys::INPUT).and_then(EnvValue::as_input)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<EnvValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Map a request header name to its environment key.
pub fn header_key(name: &str) -> String {
    let mut key = String::with_capacity(keys::HTTP_PREFIX.len() + name.len());
    key.push_str(keys::HTTP_PREFIX);
    key.extend(
        name.chars()
            .map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() }),
    );
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_sets_standard_variables() {
        let env = Environment::gateway("GET", "/hello", "localhost", 8080);
        assert_eq!(env.text(keys::VERSION), Some("1.0"));
        assert_eq!(env.text(keys::URL_SCHEME), Some("http"));
        assert_eq!(env.text(keys::REQUEST_METHOD), Some("GET"));
        assert_eq!(env.text(keys::PATH_INFO), Some("/hello"));
        assert_eq!(env.text(keys::SERVER_NAME), Some("localhost"));
        assert_eq!(env.text(keys::SERVER_PORT), Some("8080"));
        assert_eq!(env.get(keys::MULTITHREAD).and_then(EnvValue::as_flag), Some(true));
        assert_eq!(env.get(keys::RUN_ONCE).and_then(EnvValue::as_flag), Some(false));
        assert!(env.input().unwrap().is_empty());
    }

    #[test]
    fn with_input_replaces_body() {
        let env = Environment::gateway("POST", "/", "localhost", 80).with_input("payload");
        assert_eq!(env.input().unwrap().as_ref(), b"payload");
    }

    #[test]
    fn header_key_mapping() {
        assert_eq!(header_key("User-Agent"), "HTTP_USER_AGENT");
        assert_eq!(header_key("x-forwarded-for"), "HTTP_X_FORWARDED_FOR");
    }

    #[test]
    fn with_header_and_query() {
        let env = Environment::new()
            .with_header("Accept", "*/*")
            .with_query("page=2");
        assert_eq!(env.text("HTTP_ACCEPT"), Some("*/*"));
        assert_eq!(env.text(keys::QUERY_STRING), Some("page=2"));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn from_iterator() {
        let env: Environment = vec![("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.text("A"), Some("1"));
        assert!(env.contains("B"));
        assert!(!env.contains("C"));
    }

    #[test]
    fn insert_returns_previous_value() {
        let mut env = Environment::new();
        assert!(env.insert("K", "v1").is_none());
        assert_eq!(env.insert("K", "v2"), Some(EnvValue::Text("v1".to_string())));
    }
}
