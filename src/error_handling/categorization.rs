//! Transport error categorization.
//!
//! Maps a `reqwest::Error` onto the coarse `NetworkErrorKind` categories
//! callers branch on.

use std::error::Error as StdError;

use super::types::NetworkErrorKind;

/// Categorizes a `reqwest::Error` into a `NetworkErrorKind`.
///
/// `reqwest` only exposes timeout/connect flags, so refused connections and
/// TLS failures are recognized by walking the source chain: an `io::Error`
/// with `ConnectionRefused`, or any cause whose message mentions TLS or a
/// certificate.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> NetworkErrorKind {
    if error.is_timeout() {
        return NetworkErrorKind::Timeout;
    }

    let mut source: Option<&(dyn StdError + 'static)> = error.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
            match io_err.kind() {
                std::io::ErrorKind::ConnectionRefused => {
                    return NetworkErrorKind::ConnectionRefused
                }
                std::io::ErrorKind::TimedOut => return NetworkErrorKind::Timeout,
                _ => {}
            }
        }
        if mentions_tls(&cause.to_string()) {
            return NetworkErrorKind::TlsFailure;
        }
        source = cause.source();
    }

    NetworkErrorKind::Other
}

fn mentions_tls(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("certificate") || message.contains("tls") || message.contains("ssl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mentions_tls() {
        assert!(mentions_tls("invalid peer certificate: UnknownIssuer"));
        assert!(mentions_tls("TLS handshake failed"));
        assert!(mentions_tls("error:0A000086:SSL routines"));
        assert!(!mentions_tls("connection reset by peer"));
    }

    #[test]
    fn test_refused_connection_is_categorized() {
        // Bind then drop a listener to get a local port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = reqwest::blocking::Client::new();
        let err = client
            .get(format!("http://127.0.0.1:{port}/"))
            .send()
            .unwrap_err();
        assert_eq!(
            categorize_reqwest_error(&err),
            NetworkErrorKind::ConnectionRefused
        );
    }
}
