//! Request building.
//!
//! Turns a `RequestSpec` into a `PreparedRequest`: body encoding, header
//! merge over the client defaults, deterministic query string and cookies.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, COOKIE};
use url::{form_urlencoded, Url};

use super::encode::encode_body;
use super::{PreparedRequest, RequestSpec, Scalar};
use crate::config::{parse_header, DefaultHeaders};
use crate::error_handling::HttpToolError;

/// Builds the outbound request described by `spec`.
///
/// Steps, in order: encode the body, parse the URL, merge caller headers over
/// `defaults` (case-insensitive, caller wins), append query parameters sorted
/// by key, and fold the cookies into a single `Cookie` header after any the
/// caller set. `spec` is only borrowed.
///
/// # Errors
///
/// Propagates encoder errors, returns `InvalidUrl` for an unparsable URL and
/// `InvalidHeader` for header names/values or cookies that are not valid on
/// the wire.
pub fn build(
    spec: &RequestSpec,
    defaults: &DefaultHeaders,
) -> Result<PreparedRequest, HttpToolError> {
    let encoded = encode_body(spec.body.as_ref(), &spec.headers)?;

    let mut url = Url::parse(&spec.url).map_err(|source| HttpToolError::InvalidUrl {
        url: spec.url.clone(),
        source,
    })?;

    let mut headers = merge_headers(defaults.as_header_map(), &spec.headers)?;
    if encoded.inferred {
        if let Some(content_type) = &encoded.content_type {
            let (_, value) = parse_header(CONTENT_TYPE.as_str(), content_type)?;
            headers.insert(CONTENT_TYPE, value);
        }
    }

    apply_query(&mut url, &spec.query);

    if let Some(cookie) = cookie_header(&spec.cookies) {
        let value = fold_cookie_header(&headers, &cookie)?;
        headers.insert(COOKIE, value);
    }

    debug!(
        "Built {} {url} ({} headers, {} body bytes)",
        spec.method,
        headers.len(),
        encoded.payload.len()
    );

    Ok(PreparedRequest {
        method: spec.method.clone(),
        url,
        headers,
        body: spec.body.as_ref().map(|_| encoded.payload),
        timeout: spec.timeout,
    })
}

/// Overlays caller headers on the defaults. The first caller occurrence of a
/// name drops the default; repeated caller names are all kept.
fn merge_headers(
    defaults: &HeaderMap,
    caller: &[(String, Scalar)],
) -> Result<HeaderMap, HttpToolError> {
    let mut headers = defaults.clone();
    let mut overridden = HashSet::new();
    for (name, value) in caller {
        let (name, value) = parse_header(name, &value.to_string())?;
        if overridden.insert(name.clone()) {
            headers.remove(&name);
        }
        headers.append(name, value);
    }
    Ok(headers)
}

/// Merges the URL's own query with `query`, stable-sorted by key, form-encoded.
fn apply_query(url: &mut Url, query: &[(String, Scalar)]) {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    pairs.extend(query.iter().map(|(k, v)| (k.clone(), v.to_string())));
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    if pairs.is_empty() {
        url.set_query(None);
        return;
    }
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish();
    url.set_query(Some(&encoded));
}

/// Joins any caller-supplied `Cookie` header values with `cookies` into one
/// header value, caller values first.
fn fold_cookie_header(headers: &HeaderMap, cookies: &str) -> Result<HeaderValue, HttpToolError> {
    let mut folded: Vec<u8> = Vec::new();
    for existing in headers.get_all(COOKIE) {
        let existing = existing.as_bytes().trim_ascii();
        if existing.is_empty() {
            continue;
        }
        folded.extend_from_slice(existing);
        folded.extend_from_slice(b"; ");
    }
    folded.extend_from_slice(cookies.as_bytes());
    HeaderValue::from_bytes(&folded).map_err(|e| HttpToolError::InvalidHeader {
        name: COOKIE.to_string(),
        reason: e.to_string(),
    })
}

fn cookie_header(cookies: &BTreeMap<String, String>) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}
