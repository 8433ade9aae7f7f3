//! Request description and construction.
//!
//! A [`RequestSpec`] is the caller's declarative description of one outbound
//! call. [`build`] turns it into a [`PreparedRequest`]: encoded body, merged
//! headers, sorted query string and cookie header, all owned independently of
//! the spec.

mod builder;
mod encode;

pub use builder::build;
pub use encode::{encode_body, EncodedBody};

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::Serialize;
use url::Url;

/// A scalar value for headers, query parameters and form/JSON bodies.
///
/// `Display` gives the text used on the wire for headers, queries and form
/// bodies; `Serialize` keeps the natural JSON type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Int(i64::from(n))
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Scalar::Int(i64::from(n))
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// Request body, tagged by how it should be encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Flat string-keyed mapping; form-urlencoded unless a JSON content type is declared.
    Form(BTreeMap<String, Scalar>),
    /// Arbitrary JSON; an object is required when the content type is inferred.
    Json(serde_json::Value),
    /// Pre-encoded bytes sent as-is.
    Raw(Vec<u8>),
}

/// Declarative description of one outbound HTTP call.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    /// Caller headers, overriding the defaults on a case-insensitive name match.
    pub headers: Vec<(String, Scalar)>,
    /// Query parameters; a key may repeat.
    pub query: Vec<(String, Scalar)>,
    pub body: Option<Body>,
    pub cookies: BTreeMap<String, String>,
    /// Per-call timeout overriding the client's overall timeout.
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            cookies: BTreeMap::new(),
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a `Body::Form` from key/value pairs.
    pub fn form<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        let map = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body = Some(Body::Form(map));
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(Body::Json(value));
        self
    }

    pub fn raw(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(Body::Raw(bytes.into()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Replaces the outbound cookies, e.g. with `ResponseEnvelope::cookies()`
    /// from a previous call to continue a session.
    pub fn cookies(mut self, cookies: BTreeMap<String, String>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The caller-declared `Content-Type`, matched case-insensitively.
    pub fn declared_content_type(&self) -> Option<String> {
        declared_content_type(&self.headers)
    }
}

pub(crate) fn declared_content_type(headers: &[(String, Scalar)]) -> Option<String> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.to_string())
}

/// A fully-formed outbound request, independent of the `RequestSpec` it came from.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

impl PreparedRequest {
    pub(crate) fn into_blocking(self) -> reqwest::blocking::Request {
        let mut request = reqwest::blocking::Request::new(self.method, self.url);
        *request.headers_mut() = self.headers;
        *request.body_mut() = self.body.map(reqwest::blocking::Body::from);
        *request.timeout_mut() = self.timeout;
        request
    }
}
