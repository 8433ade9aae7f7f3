//! http_tool: a small blocking HTTP client layer for scraping and light API calls.
//!
//! Requests are described with a [`RequestSpec`], built into a
//! [`PreparedRequest`] (body encoding, browser-like default headers, sorted
//! query string, cookies), sent once through an [`HttpClient`] configured by a
//! [`ClientPolicy`] (timeouts, TLS verification, redirect mode, cookie jar),
//! and decoded from the returned [`ResponseEnvelope`] exactly once: as bytes,
//! text, a JSON object or an HTML document.
//!
//! # Example
//!
//! ```no_run
//! use http_tool::{ClientPolicy, HttpClient, RequestSpec};
//!
//! # fn main() -> Result<(), http_tool::HttpToolError> {
//! let client = HttpClient::new(&ClientPolicy::with_cookie_jar())?;
//!
//! let login = RequestSpec::post("https://example.com/login")
//!     .form([("user", "alice"), ("password", "hunter2")]);
//! let response = client.request(&login)?;
//!
//! // Carry the session cookies harvested across the redirect chain.
//! let search = RequestSpec::get("https://example.com/search")
//!     .query("q", "rust http")
//!     .cookies(response.cookies().clone());
//! let (_, page) = client.get_json(&search)?;
//! println!("{} results", page.len());
//! # Ok(())
//! # }
//! ```
//!
//! Nothing here retries. Callers wanting retry/backoff loop around
//! [`HttpClient::request`] themselves.

pub mod client;
pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod request;
pub mod utils;

// Re-export public API
pub use client::{ClientPolicy, CookieJar, RedirectMode, TransportOptions};
pub use config::{DefaultHeaders, LogFormat, LogLevel};
pub use error_handling::{FileStoreError, HttpToolError, NetworkErrorKind};
pub use fetch::{HttpClient, ResponseEnvelope};
pub use request::{Body, EncodedBody, PreparedRequest, RequestSpec, Scalar};
