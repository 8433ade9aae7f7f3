//! Cookie header string parsing.

use std::collections::BTreeMap;

/// Attribute names that can appear in a `Set-Cookie` string and are not cookies.
const COOKIE_ATTRIBUTES: &[&str] = &[
    "path", "domain", "expires", "max-age", "httponly", "secure", "samesite", "partitioned",
];

/// Decodes a `Cookie` (or captured `Set-Cookie`) header string into a
/// name→value map, dropping attributes and empty segments.
///
/// ```
/// use http_tool::utils::decode_cookie_header;
///
/// let cookies = decode_cookie_header("session=abc; path=/; HttpOnly; lang=en");
/// assert_eq!(cookies.len(), 2);
/// assert_eq!(cookies["session"], "abc");
/// ```
pub fn decode_cookie_header(header: &str) -> BTreeMap<String, String> {
    header
        .split(';')
        .filter_map(|segment| {
            let segment = segment.trim();
            let (name, value) = match segment.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (segment, ""),
            };
            if name.is_empty() || is_attribute(name) {
                return None;
            }
            Some((name.to_string(), value.trim_matches('"').to_string()))
        })
        .collect()
}

fn is_attribute(name: &str) -> bool {
    COOKIE_ATTRIBUTES
        .iter()
        .any(|attribute| attribute.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_cookie_header() {
        let cookies = decode_cookie_header("a=1; b=2");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "2");
    }

    #[test]
    fn test_decode_drops_attributes() {
        let cookies = decode_cookie_header(
            "sid=xyz; Path=/; Domain=example.com; Expires=Wed, 21 Oct 2015 07:28:00 GMT; HttpOnly; Secure",
        );
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["sid"], "xyz");
    }

    #[test]
    fn test_decode_keeps_equals_in_value_and_strips_quotes() {
        let cookies = decode_cookie_header(r#"token=a=b=; q="quoted""#);
        assert_eq!(cookies["token"], "a=b=");
        assert_eq!(cookies["q"], "quoted");
    }

    #[test]
    fn test_decode_empty_and_stray_separators() {
        assert!(decode_cookie_header("").is_empty());
        assert_eq!(decode_cookie_header(";; a=1 ;").len(), 1);
    }

    #[test]
    fn test_valueless_segment_is_empty_cookie() {
        let cookies = decode_cookie_header("flag; a=1");
        assert_eq!(cookies["flag"], "");
    }
}
