//! Request execution.
//!
//! [`HttpClient`] binds a configured blocking client (and its cookie jar, if
//! any) to a default header set. Each call is one `build -> execute` round
//! trip with no retries; decoding is left to the returned
//! [`ResponseEnvelope`].

pub mod response;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, error};
use reqwest::Method;

use crate::client::{configure, ClientPolicy, CookieJar};
use crate::config::DefaultHeaders;
use crate::error_handling::{categorize_reqwest_error, HttpToolError};
use crate::request::{build, PreparedRequest, RequestSpec};
pub use response::ResponseEnvelope;

/// A configured client session.
///
/// Cloning is cheap: clones share the connection pool and the cookie jar.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::blocking::Client,
    jar: Option<Arc<CookieJar>>,
    defaults: DefaultHeaders,
}

impl HttpClient {
    /// Builds a client for `policy` with the browser-like default headers.
    ///
    /// # Errors
    ///
    /// `JarInit` or `ClientInit` if the underlying client cannot be built.
    pub fn new(policy: &ClientPolicy) -> Result<Self, HttpToolError> {
        let (client, jar) = configure(policy)?;
        Ok(Self {
            client,
            jar,
            defaults: DefaultHeaders::default(),
        })
    }

    /// Replaces the default header set merged into every request.
    pub fn with_default_headers(mut self, defaults: DefaultHeaders) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn default_headers(&self) -> &DefaultHeaders {
        &self.defaults
    }

    /// The cookie jar, when the policy enabled one.
    pub fn cookie_jar(&self) -> Option<&CookieJar> {
        self.jar.as_deref()
    }

    /// Builds the request for `spec` without sending it.
    ///
    /// # Errors
    ///
    /// See [`build`].
    pub fn prepare(&self, spec: &RequestSpec) -> Result<PreparedRequest, HttpToolError> {
        build(spec, &self.defaults)
    }

    /// Sends `request` once. The body is left unread in the envelope.
    ///
    /// The envelope's `cookies()` holds the cookies of the request's `Cookie`
    /// header overlaid with everything the jar harvested during the call.
    ///
    /// # Errors
    ///
    /// `Network` with the categorized failure kind.
    pub fn execute(
        &self,
        mut request: PreparedRequest,
    ) -> Result<ResponseEnvelope, HttpToolError> {
        let mut cookies = outbound_cookies(&request);
        // With a jar, the jar is the single source of the Cookie header on every hop.
        let generation = match &self.jar {
            Some(jar) => {
                jar.seed(&request.url, &cookies);
                request.headers.remove(reqwest::header::COOKIE);
                Some(jar.generation())
            }
            None => None,
        };

        let url = request.url.to_string();
        let method = request.method.clone();
        debug!("Sending {method} {url}");

        let response = self
            .client
            .execute(request.into_blocking())
            .map_err(|source| {
                let kind = categorize_reqwest_error(&source);
                error!("HTTP request error for {url}: {source} (kind: {kind})");
                HttpToolError::Network {
                    kind,
                    url: url.clone(),
                    source,
                }
            })?;

        debug!(
            "Received {} from {} for {method} {url}",
            response.status(),
            response.url()
        );

        if let (Some(jar), Some(generation)) = (&self.jar, generation) {
            for (name, value) in jar.changed_since(generation) {
                match value {
                    Some(value) => {
                        cookies.insert(name, value);
                    }
                    None => {
                        cookies.remove(&name);
                    }
                }
            }
        }

        Ok(ResponseEnvelope::from_response(response, cookies))
    }

    /// Builds and sends `spec`.
    ///
    /// # Errors
    ///
    /// Builder errors or `Network`.
    pub fn request(&self, spec: &RequestSpec) -> Result<ResponseEnvelope, HttpToolError> {
        let request = self.prepare(spec)?;
        self.execute(request)
    }

    /// Sends `spec` as a GET, whatever its method.
    pub fn get(&self, spec: &RequestSpec) -> Result<ResponseEnvelope, HttpToolError> {
        self.request_as(Method::GET, spec)
    }

    /// Sends `spec` as a POST, whatever its method.
    pub fn post(&self, spec: &RequestSpec) -> Result<ResponseEnvelope, HttpToolError> {
        self.request_as(Method::POST, spec)
    }

    /// GET and decode the body as a JSON object.
    pub fn get_json(
        &self,
        spec: &RequestSpec,
    ) -> Result<(ResponseEnvelope, serde_json::Map<String, serde_json::Value>), HttpToolError>
    {
        let mut envelope = self.get(spec)?;
        let map = envelope.to_json_object()?;
        Ok((envelope, map))
    }

    /// POST and decode the body as a JSON object.
    pub fn post_json(
        &self,
        spec: &RequestSpec,
    ) -> Result<(ResponseEnvelope, serde_json::Map<String, serde_json::Value>), HttpToolError>
    {
        let mut envelope = self.post(spec)?;
        let map = envelope.to_json_object()?;
        Ok((envelope, map))
    }

    /// GET and read the body.
    pub fn get_bytes(
        &self,
        spec: &RequestSpec,
    ) -> Result<(ResponseEnvelope, Vec<u8>), HttpToolError> {
        let mut envelope = self.get(spec)?;
        let bytes = envelope.to_bytes()?;
        Ok((envelope, bytes))
    }

    /// POST and read the body.
    pub fn post_bytes(
        &self,
        spec: &RequestSpec,
    ) -> Result<(ResponseEnvelope, Vec<u8>), HttpToolError> {
        let mut envelope = self.post(spec)?;
        let bytes = envelope.to_bytes()?;
        Ok((envelope, bytes))
    }

    /// GET and read the body as (lossy) UTF-8.
    pub fn get_string(
        &self,
        spec: &RequestSpec,
    ) -> Result<(ResponseEnvelope, String), HttpToolError> {
        let mut envelope = self.get(spec)?;
        let text = envelope.to_string_lossy()?;
        Ok((envelope, text))
    }

    /// POST and read the body as (lossy) UTF-8.
    pub fn post_string(
        &self,
        spec: &RequestSpec,
    ) -> Result<(ResponseEnvelope, String), HttpToolError> {
        let mut envelope = self.post(spec)?;
        let text = envelope.to_string_lossy()?;
        Ok((envelope, text))
    }

    fn request_as(
        &self,
        method: Method,
        spec: &RequestSpec,
    ) -> Result<ResponseEnvelope, HttpToolError> {
        if spec.method == method {
            return self.request(spec);
        }
        let mut spec = spec.clone();
        spec.method = method;
        self.request(&spec)
    }
}

/// Cookies carried by the request's `Cookie` header, by name.
fn outbound_cookies(request: &PreparedRequest) -> BTreeMap<String, String> {
    request
        .headers
        .get_all(reqwest::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (!name.is_empty()).then(|| (name.to_string(), value.to_string()))
        })
        .collect()
}
