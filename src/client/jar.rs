//! Cookie jar.
//!
//! A `(domain, path, name) -> value` store installed as the client's cookie
//! provider. reqwest feeds it every `Set-Cookie` it sees (including on each
//! redirect hop) and asks it for a `Cookie` header before every hop.
//!
//! Every write bumps a generation counter so a caller can ask which cookies
//! changed during one call (`changed_since`).

use std::collections::{BTreeMap, VecDeque};
use std::net::IpAddr;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use url::Url;

/// Identity of a stored cookie.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CookieKey {
    pub domain: String,
    pub path: String,
    pub name: String,
}

/// Deletions remembered for `changed_since`; the oldest are dropped first.
const REMOVAL_LOG_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct StoredCookie {
    value: String,
    host_only: bool,
    secure: bool,
    generation: u64,
}

#[derive(Debug, Default)]
struct JarState {
    cookies: BTreeMap<CookieKey, StoredCookie>,
    /// `(generation, key)` of cookies deleted by the server (`Max-Age<=0`).
    removals: VecDeque<(u64, CookieKey)>,
    generation: u64,
}

impl JarState {
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// Thread-safe cookie store; concurrent writers are last-write-wins per key.
#[derive(Debug, Default)]
pub struct CookieJar {
    state: RwLock<JarState>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores one `Set-Cookie` header value received from `url`.
    ///
    /// Returns `false` if the header is malformed or its `Domain` does not
    /// cover the responding host. IP hosts only accept their own address as
    /// `Domain`, and a single-label `Domain` other than the host is refused.
    pub fn store(&self, url: &Url, set_cookie: &str) -> bool {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return false;
        };
        let parsed = match cookie::Cookie::parse(set_cookie) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Ignoring malformed Set-Cookie from {url}: {e}");
                return false;
            }
        };

        let (domain, host_only) = match parsed.domain() {
            Some(domain) => {
                let domain = domain.trim_start_matches('.').to_ascii_lowercase();
                let single_label = !domain.contains('.') && domain != host;
                if single_label || !domain_matches(&host, &domain) {
                    warn!("Ignoring cookie `{}` for foreign domain {domain} from {host}", parsed.name());
                    return false;
                }
                (domain, is_ip_literal(&host))
            }
            None => (host, true),
        };
        let path = match parsed.path() {
            Some(path) if path.starts_with('/') => path.to_string(),
            _ => default_path(url.path()),
        };
        let key = CookieKey {
            domain,
            path,
            name: parsed.name().to_string(),
        };

        if parsed.max_age().is_some_and(|age| !age.is_positive()) {
            debug!("Cookie jar removed `{}` for {}{}", key.name, key.domain, key.path);
            self.remove(key);
        } else {
            debug!("Cookie jar stored `{}` for {}{}", key.name, key.domain, key.path);
            self.insert(
                key,
                StoredCookie {
                    value: parsed.value().to_string(),
                    host_only,
                    secure: parsed.secure().unwrap_or(false),
                    generation: 0,
                },
            );
        }
        true
    }

    /// Seeds caller-supplied cookies as host-only cookies for `url` with path `/`.
    pub fn seed(&self, url: &Url, cookies: &BTreeMap<String, String>) {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return;
        };
        for (name, value) in cookies {
            let key = CookieKey {
                domain: host.clone(),
                path: "/".to_string(),
                name: name.clone(),
            };
            self.insert(
                key,
                StoredCookie {
                    value: value.clone(),
                    host_only: true,
                    secure: false,
                    generation: 0,
                },
            );
        }
    }

    /// Cookies that would be sent to `url`, longest path first on name collisions.
    pub fn cookies_for(&self, url: &Url) -> BTreeMap<String, String> {
        let mut matches = self.matching(url);
        // Shorter paths first so longer paths overwrite them.
        matches.sort_by_key(|(path_len, _, _)| *path_len);
        matches
            .into_iter()
            .map(|(_, name, value)| (name, value))
            .collect()
    }

    /// Current generation; pass it to `changed_since` after a call.
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Cookies written or deleted after `generation`, by name. `None` means
    /// the server deleted the cookie. Later changes win on name collisions.
    pub fn changed_since(&self, generation: u64) -> BTreeMap<String, Option<String>> {
        let state = self.read();
        let mut changed: Vec<(u64, &str, Option<&str>)> = state
            .cookies
            .iter()
            .filter(|(_, cookie)| cookie.generation > generation)
            .map(|(key, cookie)| {
                (
                    cookie.generation,
                    key.name.as_str(),
                    Some(cookie.value.as_str()),
                )
            })
            .chain(
                state
                    .removals
                    .iter()
                    .filter(|(removed_at, _)| *removed_at > generation)
                    .map(|(removed_at, key)| (*removed_at, key.name.as_str(), None)),
            )
            .collect();
        changed.sort_by_key(|(changed_at, _, _)| *changed_at);
        changed
            .into_iter()
            .map(|(_, name, value)| (name.to_string(), value.map(str::to_string)))
            .collect()
    }

    /// Stored cookies, in key order.
    pub fn entries(&self) -> Vec<(CookieKey, String)> {
        self.read()
            .cookies
            .iter()
            .map(|(key, cookie)| (key.clone(), cookie.value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, key: CookieKey, mut cookie: StoredCookie) {
        let mut state = self.write();
        cookie.generation = state.bump();
        state.cookies.insert(key, cookie);
    }

    fn remove(&self, key: CookieKey) {
        let mut state = self.write();
        let generation = state.bump();
        state.cookies.remove(&key);
        state.removals.push_back((generation, key));
        if state.removals.len() > REMOVAL_LOG_CAPACITY {
            state.removals.pop_front();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, JarState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, JarState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn matching(&self, url: &Url) -> Vec<(usize, String, String)> {
        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return Vec::new();
        };
        let request_path = if url.path().is_empty() { "/" } else { url.path() };
        let secure_channel = url.scheme() == "https";

        self.read()
            .cookies
            .iter()
            .filter(|(key, cookie)| {
                let host_ok = if cookie.host_only {
                    host == key.domain
                } else {
                    domain_matches(&host, &key.domain)
                };
                host_ok
                    && path_matches(request_path, &key.path)
                    && (!cookie.secure || secure_channel)
            })
            .map(|(key, cookie)| (key.path.len(), key.name.clone(), cookie.value.clone()))
            .collect()
    }
}

impl CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            match header.to_str() {
                Ok(set_cookie) => {
                    self.store(url, set_cookie);
                }
                Err(_) => warn!("Ignoring non-ASCII Set-Cookie header from {url}"),
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let mut matches = self.matching(url);
        if matches.is_empty() {
            return None;
        }
        // Longest path first, then by name.
        matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        let header = matches
            .iter()
            .map(|(_, name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&header).ok()
    }
}

/// RFC 6265 domain-match. IP hosts only match themselves.
fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || (!is_ip_literal(host)
            && host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

/// `host` as returned by `Url::host_str`: IPv6 literals keep their brackets.
fn is_ip_literal(host: &str) -> bool {
    host.starts_with('[') || host.parse::<IpAddr>().is_ok()
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    request_path == cookie_path
        || (request_path.starts_with(cookie_path)
            && (cookie_path.ends_with('/')
                || request_path.as_bytes().get(cookie_path.len()) == Some(&b'/')))
}

/// RFC 6265 default-path: the request path up to, not including, its last `/`.
fn default_path(request_path: &str) -> String {
    if !request_path.starts_with('/') {
        return "/".to_string();
    }
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => request_path[..idx].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_store_and_send_host_only_cookie() {
        let jar = CookieJar::new();
        assert!(jar.store(&url("http://example.com/login"), "session=abc; Path=/; HttpOnly"));
        let header = jar.cookies(&url("http://example.com/account")).unwrap();
        assert_eq!(header, "session=abc");
        // host-only: not sent to subdomains
        assert!(jar.cookies(&url("http://www.example.com/")).is_none());
    }

    #[test]
    fn test_domain_cookie_sent_to_subdomains() {
        let jar = CookieJar::new();
        assert!(jar.store(&url("http://www.example.com/"), "id=7; Domain=.example.com"));
        assert_eq!(jar.cookies(&url("http://api.example.com/")).unwrap(), "id=7");
        assert!(jar.cookies(&url("http://badexample.com/")).is_none());
    }

    #[test]
    fn test_foreign_domain_rejected() {
        let jar = CookieJar::new();
        assert!(!jar.store(&url("http://example.com/"), "id=7; Domain=other.com"));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_default_path_scopes_cookie() {
        let jar = CookieJar::new();
        jar.store(&url("http://example.com/app/login"), "t=1");
        assert_eq!(jar.cookies(&url("http://example.com/app/home")).unwrap(), "t=1");
        assert_eq!(jar.cookies(&url("http://example.com/app")).unwrap(), "t=1");
        assert!(jar.cookies(&url("http://example.com/application")).is_none());
        assert!(jar.cookies(&url("http://example.com/")).is_none());
    }

    #[test]
    fn test_default_path() {
        assert_eq!(default_path(""), "/");
        assert_eq!(default_path("/"), "/");
        assert_eq!(default_path("/login"), "/");
        assert_eq!(default_path("/a/b/c"), "/a/b");
    }

    #[test]
    fn test_secure_cookie_only_over_https() {
        let jar = CookieJar::new();
        jar.store(&url("https://example.com/"), "s=1; Secure");
        assert!(jar.cookies(&url("http://example.com/")).is_none());
        assert_eq!(jar.cookies(&url("https://example.com/")).unwrap(), "s=1");
    }

    #[test]
    fn test_max_age_zero_deletes() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");
        jar.store(&u, "a=1");
        let generation = jar.generation();
        jar.store(&u, "a=gone; Max-Age=0");
        assert!(jar.cookies(&u).is_none());
        assert_eq!(jar.changed_since(generation).get("a"), Some(&None));
    }

    #[test]
    fn test_deleted_cookie_leaves_no_entry() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");
        jar.store(&u, "a=1");
        jar.store(&u, "b=1");
        jar.store(&u, "a=gone; Max-Age=0");
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.entries()[0].0.name, "b");
    }

    #[test]
    fn test_reinsert_after_delete_reports_latest_value() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");
        jar.store(&u, "a=1");
        let generation = jar.generation();
        jar.store(&u, "a=; Max-Age=0");
        jar.store(&u, "a=3");
        assert_eq!(
            jar.changed_since(generation).get("a"),
            Some(&Some("3".to_string()))
        );

        let generation = jar.generation();
        jar.store(&u, "a=; Max-Age=-1");
        assert_eq!(jar.changed_since(generation).get("a"), Some(&None));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_removal_log_is_bounded() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");
        for i in 0..REMOVAL_LOG_CAPACITY + 10 {
            jar.store(&u, &format!("c{i}=; Max-Age=0"));
        }
        assert!(jar.is_empty());
        assert_eq!(jar.read().removals.len(), REMOVAL_LOG_CAPACITY);
    }

    #[test]
    fn test_ip_host_rejects_suffix_domain() {
        let jar = CookieJar::new();
        let u = url("http://127.0.0.1/");
        assert!(!jar.store(&u, "a=1; Domain=0.0.1"));
        assert!(jar.store(&u, "b=2; Domain=127.0.0.1"));
        assert_eq!(jar.cookies(&u).unwrap(), "b=2");
        assert!(jar.entries().iter().all(|(key, _)| key.domain == "127.0.0.1"));
    }

    #[test]
    fn test_ipv6_host_cookie() {
        let jar = CookieJar::new();
        let u = url("http://[::1]:8080/");
        assert!(jar.store(&u, "a=1"));
        assert_eq!(jar.cookies(&u).unwrap(), "a=1");
        assert!(!domain_matches("[::1]", "1]"));
    }

    #[test]
    fn test_single_label_domain_rejected() {
        let jar = CookieJar::new();
        assert!(!jar.store(&url("http://www.example.com/"), "a=1; Domain=com"));
        assert!(jar.store(&url("http://localhost/"), "b=2; Domain=localhost"));
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn test_overwrite_is_last_write_wins() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");
        jar.store(&u, "a=1");
        jar.store(&u, "a=2");
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.cookies_for(&u).get("a").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_changed_since_only_reports_new_writes() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");
        jar.store(&u, "old=1");
        let generation = jar.generation();
        jar.store(&u, "new=2");
        let changed = jar.changed_since(generation);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed.get("new"), Some(&Some("2".to_string())));
    }

    #[test]
    fn test_seed_is_host_only_root_path() {
        let jar = CookieJar::new();
        let mut cookies = BTreeMap::new();
        cookies.insert("lang".to_string(), "en".to_string());
        jar.seed(&url("http://example.com/deep/path"), &cookies);
        assert_eq!(jar.cookies(&url("http://example.com/other")).unwrap(), "lang=en");
        let entries = jar.entries();
        assert_eq!(entries[0].0.path, "/");
        assert_eq!(entries[0].0.domain, "example.com");
    }

    #[test]
    fn test_set_cookies_via_cookie_store_trait() {
        let jar = CookieJar::new();
        let u = url("http://example.com/");
        let headers = [
            HeaderValue::from_static("a=1"),
            HeaderValue::from_static("b=2; Path=/"),
        ];
        jar.set_cookies(&mut headers.iter(), &u);
        assert_eq!(jar.cookies(&u).unwrap(), "a=1; b=2");
    }

    #[test]
    fn test_longer_path_sent_first() {
        let jar = CookieJar::new();
        jar.store(&url("http://example.com/"), "a=root; Path=/");
        jar.store(&url("http://example.com/"), "b=deep; Path=/x");
        assert_eq!(jar.cookies(&url("http://example.com/x/y")).unwrap(), "b=deep; a=root");
    }

    #[test]
    fn test_malformed_set_cookie_ignored() {
        let jar = CookieJar::new();
        assert!(!jar.store(&url("http://example.com/"), "no-equals-sign"));
        assert!(jar.is_empty());
    }
}
