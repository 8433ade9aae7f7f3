//! Response envelope and body decoding.
//!
//! The envelope owns the response headers and an exactly-once body stream.
//! Each decoder takes the stream out of the envelope, reads it, and drops it
//! before returning, so the connection is released on every exit path.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use html5ever::tendril::TendrilSink;
use html5ever::ParseOpts;
use scraper::{Html, HtmlTreeSink};
use url::Url;

use crate::error_handling::HttpToolError;

type BodyStream = Box<dyn Read + Send>;

/// Response headers plus a body that can be decoded exactly once.
pub struct ResponseEnvelope {
    status: StatusCode,
    url: Url,
    headers: BTreeMap<String, Vec<String>>,
    cookies: BTreeMap<String, String>,
    body: Option<BodyStream>,
}

impl fmt::Debug for ResponseEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseEnvelope")
            .field("status", &self.status)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("cookies", &self.cookies)
            .field("body_consumed", &self.body.is_none())
            .finish()
    }
}

impl ResponseEnvelope {
    /// Assembles an envelope from parts; `headers` names are lower-cased.
    pub fn from_parts(
        status: StatusCode,
        url: Url,
        headers: BTreeMap<String, Vec<String>>,
        cookies: BTreeMap<String, String>,
        body: impl Read + Send + 'static,
    ) -> Self {
        let headers = headers
            .into_iter()
            .fold(BTreeMap::new(), |mut acc: BTreeMap<String, Vec<String>>, (k, v)| {
                acc.entry(k.to_ascii_lowercase()).or_default().extend(v);
                acc
            });
        Self {
            status,
            url,
            headers,
            cookies,
            body: Some(Box::new(body)),
        }
    }

    pub(crate) fn from_response(
        response: reqwest::blocking::Response,
        cookies: BTreeMap<String, String>,
    ) -> Self {
        let status = response.status();
        let url = response.url().clone();
        let headers = collect_headers(response.headers());
        Self {
            status,
            url,
            headers,
            cookies,
            body: Some(Box::new(response)),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Final URL (after any followed redirects).
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// All headers, lower-case names, repeated values in arrival order.
    pub fn headers(&self) -> &BTreeMap<String, Vec<String>> {
        &self.headers
    }

    /// First value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_all(name).first().map(String::as_str)
    }

    /// Every value of header `name` (case-insensitive).
    pub fn header_all(&self, name: &str) -> &[String] {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The `Location` header, if any.
    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }

    /// The caller's cookies overlaid with every cookie the jar harvested
    /// during this call. Feed it back into the next `RequestSpec` to carry a
    /// session across independent calls.
    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// Whether a decoder already consumed the body.
    pub fn is_consumed(&self) -> bool {
        self.body.is_none()
    }

    /// Reads the whole body.
    ///
    /// # Errors
    ///
    /// `StreamClosed` if the body was already consumed, `Read` on I/O failure
    /// (the partial buffer is discarded).
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, HttpToolError> {
        let mut body = self.take_body()?;
        let mut buffer = Vec::new();
        let result = body.read_to_end(&mut buffer);
        self.close(body);
        match result {
            Ok(read) => {
                debug!("Read {read} body bytes from {}", self.url);
                Ok(buffer)
            }
            Err(e) => Err(HttpToolError::Read(e)),
        }
    }

    /// Reads the whole body as UTF-8, replacing invalid sequences with U+FFFD.
    ///
    /// # Errors
    ///
    /// Same as [`to_bytes`](Self::to_bytes).
    pub fn to_string_lossy(&mut self) -> Result<String, HttpToolError> {
        let bytes = self.to_bytes()?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    /// Reads the body and parses it as a JSON object.
    ///
    /// # Errors
    ///
    /// `Decode` if the body is not JSON or its top level is not an object,
    /// plus the errors of [`to_bytes`](Self::to_bytes).
    pub fn to_json_object(
        &mut self,
    ) -> Result<serde_json::Map<String, serde_json::Value>, HttpToolError> {
        let bytes = self.to_bytes()?;
        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(other) => Err(HttpToolError::Decode(format!(
                "expected a JSON object, found {}",
                top_level_kind(&other)
            ))),
            Err(e) => Err(HttpToolError::Decode(e.to_string())),
        }
    }

    /// Streams the body into the HTML parser.
    ///
    /// The body is decoded as UTF-8 (invalid sequences become U+FFFD) while it
    /// is read. html5ever recovers from any malformed markup, so this only
    /// fails on read errors.
    pub fn to_html_document(&mut self) -> Result<Html, HttpToolError> {
        let mut body = self.take_body()?;
        let parser = html5ever::parse_document(
            HtmlTreeSink::new(Html::new_document()),
            ParseOpts::default(),
        );
        let result = parser.from_utf8().read_from(&mut body);
        self.close(body);
        let document = result.map_err(HttpToolError::Read)?;
        debug!(
            "Parsed HTML document from {} ({} parse errors)",
            self.url,
            document.errors.len()
        );
        Ok(document)
    }

    /// Like [`to_html_document`](Self::to_html_document), but returns `Parse`
    /// with the parser's recovered errors if there were any.
    pub fn to_html_document_strict(&mut self) -> Result<Html, HttpToolError> {
        let document = self.to_html_document()?;
        if document.errors.is_empty() {
            Ok(document)
        } else {
            Err(HttpToolError::Parse(document.errors.join("; ")))
        }
    }

    fn take_body(&mut self) -> Result<BodyStream, HttpToolError> {
        self.body.take().ok_or(HttpToolError::StreamClosed)
    }

    fn close(&self, body: BodyStream) {
        drop(body);
        debug!("Closed response body for {}", self.url);
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, Vec<String>> {
    let mut collected: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        collected
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    collected
}

fn top_level_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
