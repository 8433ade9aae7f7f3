//! Default request headers.
//!
//! The header set every request starts from. It is a plain immutable value
//! owned by the [`HttpClient`](crate::HttpClient); the request builder merges
//! caller headers over it on every build.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::constants::{
    DEFAULT_ACCEPT, DEFAULT_ACCEPT_ENCODING, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_CONNECTION,
    DEFAULT_USER_AGENT,
};
use crate::error_handling::HttpToolError;

/// Browser-like headers applied to every outbound request before caller overrides.
#[derive(Debug, Clone)]
pub struct DefaultHeaders {
    headers: HeaderMap,
}

impl DefaultHeaders {
    /// An empty default set (no headers beyond what the caller supplies).
    pub fn empty() -> Self {
        Self {
            headers: HeaderMap::new(),
        }
    }

    /// Returns a copy of this set with `name` replaced by `value`.
    ///
    /// # Errors
    ///
    /// Returns `HttpToolError::InvalidHeader` if the name or value is not a
    /// valid HTTP header token.
    pub fn with(&self, name: &str, value: &str) -> Result<Self, HttpToolError> {
        let (name, value) = parse_header(name, value)?;
        let mut headers = self.headers.clone();
        headers.insert(name, value);
        Ok(Self { headers })
    }

    /// Returns a copy of this set without `name`.
    pub fn without(&self, name: &str) -> Self {
        let mut headers = self.headers.clone();
        headers.remove(name);
        Self { headers }
    }

    /// The headers as a `HeaderMap`.
    pub fn as_header_map(&self) -> &HeaderMap {
        &self.headers
    }
}

impl Default for DefaultHeaders {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_static(DEFAULT_USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(DEFAULT_ACCEPT),
        );
        headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            HeaderValue::from_static(DEFAULT_ACCEPT_ENCODING),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );
        headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static(DEFAULT_CONNECTION),
        );
        Self { headers }
    }
}

/// Parses a header name/value pair into typed reqwest header parts.
pub(crate) fn parse_header(
    name: &str,
    value: &str,
) -> Result<(HeaderName, HeaderValue), HttpToolError> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| HttpToolError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| HttpToolError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers_contain_browser_set() {
        let defaults = DefaultHeaders::default();
        let map = defaults.as_header_map();
        assert_eq!(
            map.get(reqwest::header::USER_AGENT).unwrap(),
            DEFAULT_USER_AGENT
        );
        assert!(map.contains_key(reqwest::header::ACCEPT));
        assert!(map.contains_key(reqwest::header::ACCEPT_ENCODING));
        assert!(map.contains_key(reqwest::header::ACCEPT_LANGUAGE));
        assert_eq!(map.get(reqwest::header::CONNECTION).unwrap(), "keep-alive");
    }

    #[test]
    fn test_with_replaces_without_touching_original() {
        let defaults = DefaultHeaders::default();
        let custom = defaults.with("user-agent", "my-bot/1.0").unwrap();
        assert_eq!(
            custom.as_header_map().get("User-Agent").unwrap(),
            "my-bot/1.0"
        );
        assert_eq!(
            defaults.as_header_map().get("User-Agent").unwrap(),
            DEFAULT_USER_AGENT
        );
    }

    #[test]
    fn test_without_removes_header() {
        let defaults = DefaultHeaders::default().without("Connection");
        assert!(!defaults.as_header_map().contains_key("connection"));
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let result = DefaultHeaders::empty().with("bad header", "x");
        assert!(matches!(
            result,
            Err(HttpToolError::InvalidHeader { ref name, .. }) if name == "bad header"
        ));
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let result = DefaultHeaders::empty().with("X-Test", "line\nbreak");
        assert!(matches!(result, Err(HttpToolError::InvalidHeader { .. })));
    }
}
