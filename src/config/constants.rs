//! Configuration constants.
//!
//! Defaults for timeouts, redirect limits and the browser-like request headers
//! sent with every outbound request.

use std::time::Duration;

/// Default User-Agent string for HTTP requests.
///
/// Mimics a current desktop Chrome build. Override it per client with
/// [`DefaultHeaders::with`](crate::config::DefaultHeaders::with) or per request
/// with a `User-Agent` header on the [`RequestSpec`](crate::RequestSpec).
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default `Accept` header value (Chrome navigation request).
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";
/// Default `Accept-Encoding` header value.
pub const DEFAULT_ACCEPT_ENCODING: &str = "gzip, deflate, br";
/// Default `Accept-Language` header value.
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
/// Default `Connection` header value.
pub const DEFAULT_CONNECTION: &str = "keep-alive";

// Network operation timeouts
/// Overall per-call timeout (connect + request + response headers + body).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// TCP connect (dial) timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// How long an idle pooled connection is kept open
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Maximum number of redirect hops followed in `RedirectMode::Follow`.
pub const MAX_REDIRECT_HOPS: usize = 10;

/// Content type assigned to `Body::Form` payloads when the caller declares none.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
/// Content type assigned to `Body::Json` payloads when the caller declares none.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
