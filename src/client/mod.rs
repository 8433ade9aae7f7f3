//! HTTP client configuration.
//!
//! A [`ClientPolicy`] describes transport parameters, redirect handling and
//! whether a cookie jar is attached. [`configure`] turns it into a blocking
//! `reqwest` client; one policy can configure any number of clients.

pub mod jar;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::blocking::ClientBuilder;

use crate::config::{DEFAULT_TIMEOUT, MAX_REDIRECT_HOPS, POOL_IDLE_TIMEOUT, TCP_CONNECT_TIMEOUT_SECS};
use crate::error_handling::HttpToolError;
pub use jar::{CookieJar, CookieKey};

/// Redirect handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RedirectMode {
    /// Follow up to `ClientPolicy::max_redirects` hops.
    #[default]
    Follow,
    /// Return the first 3xx response as-is, `Location` intact.
    StopAtFirst,
}

/// Connection-level parameters.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// TCP connect (dial) timeout.
    pub connect_timeout: Duration,
    /// Local address to bind outgoing connections to.
    pub local_address: Option<IpAddr>,
    /// How long idle pooled connections are kept.
    pub idle_timeout: Duration,
    /// Accept invalid TLS certificates. Off unless explicitly requested.
    pub skip_tls_verify: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
            local_address: None,
            idle_timeout: POOL_IDLE_TIMEOUT,
            skip_tls_verify: false,
        }
    }
}

/// Reusable transport, redirect and cookie configuration.
///
/// # Examples
///
/// ```
/// use http_tool::{ClientPolicy, RedirectMode};
///
/// let policy = ClientPolicy {
///     redirect: RedirectMode::Follow,
///     cookie_jar: true,
///     ..Default::default()
/// };
/// assert!(policy.uses_jar());
/// ```
#[derive(Debug, Clone)]
pub struct ClientPolicy {
    pub transport: TransportOptions,
    /// Overall per-call timeout.
    pub timeout: Duration,
    pub redirect: RedirectMode,
    /// Attach a cookie jar (only meaningful with `RedirectMode::Follow`).
    pub cookie_jar: bool,
    pub max_redirects: usize,
}

impl Default for ClientPolicy {
    fn default() -> Self {
        Self {
            transport: TransportOptions::default(),
            timeout: DEFAULT_TIMEOUT,
            redirect: RedirectMode::Follow,
            cookie_jar: false,
            max_redirects: MAX_REDIRECT_HOPS,
        }
    }
}

impl ClientPolicy {
    /// A policy that stops at the first redirect.
    pub fn no_redirect() -> Self {
        Self {
            redirect: RedirectMode::StopAtFirst,
            ..Self::default()
        }
    }

    /// A policy that follows redirects and carries cookies across hops.
    pub fn with_cookie_jar() -> Self {
        Self {
            cookie_jar: true,
            ..Self::default()
        }
    }

    /// Whether a jar is installed; `StopAtFirst` never uses one.
    pub fn uses_jar(&self) -> bool {
        self.cookie_jar && self.redirect == RedirectMode::Follow
    }
}

/// Builds a blocking client for `policy`, plus the jar it is bound to (if any).
///
/// # Errors
///
/// Returns `JarInit` if a jar was requested and the client could not be
/// built, `ClientInit` otherwise.
pub fn configure(
    policy: &ClientPolicy,
) -> Result<(reqwest::blocking::Client, Option<Arc<CookieJar>>), HttpToolError> {
    let mut builder = ClientBuilder::new()
        .connect_timeout(policy.transport.connect_timeout)
        .timeout(policy.timeout)
        .pool_idle_timeout(policy.transport.idle_timeout)
        .local_address(policy.transport.local_address)
        .danger_accept_invalid_certs(policy.transport.skip_tls_verify);

    builder = match policy.redirect {
        RedirectMode::StopAtFirst => builder.redirect(reqwest::redirect::Policy::none()),
        RedirectMode::Follow => {
            builder.redirect(reqwest::redirect::Policy::limited(policy.max_redirects))
        }
    };

    let jar = policy.uses_jar().then(|| Arc::new(CookieJar::new()));
    if let Some(jar) = &jar {
        builder = builder.cookie_provider(Arc::clone(jar));
    }

    debug!(
        "Configuring client: redirect={:?}, jar={}, timeout={:?}, skip_tls_verify={}",
        policy.redirect,
        jar.is_some(),
        policy.timeout,
        policy.transport.skip_tls_verify
    );

    let client = builder.build().map_err(|e| {
        if jar.is_some() {
            HttpToolError::JarInit(e)
        } else {
            HttpToolError::ClientInit(e)
        }
    })?;
    Ok((client, jar))
}
