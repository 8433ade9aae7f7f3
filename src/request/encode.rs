//! Body encoding and content-type inference.

use url::form_urlencoded;

use super::{declared_content_type, Body, Scalar};
use crate::config::{FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::error_handling::HttpToolError;

/// A wire-ready body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedBody {
    /// Effective content type: the caller's declaration or the inferred one.
    /// `None` for raw bodies without a declared type and for empty bodies.
    pub content_type: Option<String>,
    /// `true` when `content_type` was inferred and must be added to the headers.
    pub inferred: bool,
    pub payload: Vec<u8>,
}

/// Encodes `body` according to the declared `Content-Type` in `headers`, or
/// infers one from the body variant when none is declared.
///
/// # Errors
///
/// - `UnsupportedContentType` if the declared type is neither form-urlencoded nor JSON
/// - `UnencodableBody` if the body shape does not fit the (declared or inferred) type
pub fn encode_body(
    body: Option<&Body>,
    headers: &[(String, Scalar)],
) -> Result<EncodedBody, HttpToolError> {
    let declared = declared_content_type(headers);

    let body = match body {
        None => return Ok(EncodedBody::default()),
        Some(Body::Raw(bytes)) => {
            return Ok(EncodedBody {
                content_type: declared,
                inferred: false,
                payload: bytes.clone(),
            })
        }
        Some(body) => body,
    };

    let (content_type, inferred) = match declared {
        Some(ct) => (ct, false),
        None => (infer_content_type(body)?.to_string(), true),
    };

    let lowered = content_type.to_ascii_lowercase();
    let payload = if lowered.contains("x-www-form-urlencoded") {
        encode_form(body)?
    } else if lowered.contains("json") {
        encode_json(body)?
    } else {
        return Err(HttpToolError::UnsupportedContentType(content_type));
    };

    Ok(EncodedBody {
        content_type: Some(content_type),
        inferred,
        payload,
    })
}

fn infer_content_type(body: &Body) -> Result<&'static str, HttpToolError> {
    match body {
        Body::Form(_) => Ok(FORM_CONTENT_TYPE),
        Body::Json(serde_json::Value::Object(_)) => Ok(JSON_CONTENT_TYPE),
        Body::Json(other) => Err(HttpToolError::UnencodableBody(format!(
            "cannot infer a content type for a top-level JSON {}",
            json_kind(other)
        ))),
        Body::Raw(_) => Err(HttpToolError::UnencodableBody(
            "raw bodies carry no inferable content type".to_string(),
        )),
    }
}

/// `application/x-www-form-urlencoded`, keys sorted, spaces as `+`.
fn encode_form(body: &Body) -> Result<Vec<u8>, HttpToolError> {
    let mut pairs: Vec<(String, String)> = match body {
        Body::Form(map) => map.iter().map(|(k, v)| (k.clone(), v.to_string())).collect(),
        Body::Json(serde_json::Value::Object(map)) => map
            .iter()
            .map(|(k, v)| json_scalar_text(v).map(|text| (k.clone(), text)))
            .collect::<Result<_, _>>()?,
        Body::Json(other) => {
            return Err(HttpToolError::UnencodableBody(format!(
                "a JSON {} cannot be form-encoded",
                json_kind(other)
            )))
        }
        Body::Raw(_) => {
            return Err(HttpToolError::UnencodableBody(
                "raw bodies cannot be form-encoded".to_string(),
            ))
        }
    };
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish();
    Ok(encoded.into_bytes())
}

fn encode_json(body: &Body) -> Result<Vec<u8>, HttpToolError> {
    let result = match body {
        Body::Form(map) => serde_json::to_vec(map),
        Body::Json(value) => serde_json::to_vec(value),
        Body::Raw(_) => {
            return Err(HttpToolError::UnencodableBody(
                "raw bodies cannot be JSON-encoded".to_string(),
            ))
        }
    };
    result.map_err(|e| HttpToolError::UnencodableBody(e.to_string()))
}

fn json_scalar_text(value: &serde_json::Value) -> Result<String, HttpToolError> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(HttpToolError::UnencodableBody(format!(
            "form values must be scalars, found {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap};

    fn form(pairs: &[(&str, Scalar)]) -> Body {
        Body::Form(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    fn ct(value: &str) -> Vec<(String, Scalar)> {
        vec![("Content-Type".to_string(), Scalar::from(value))]
    }

    #[test]
    fn test_no_body_is_empty() {
        let encoded = encode_body(None, &[]).unwrap();
        assert!(encoded.payload.is_empty());
        assert!(encoded.content_type.is_none());
        assert!(!encoded.inferred);
    }

    #[test]
    fn test_form_inferred_with_plus_for_space() {
        let body = form(&[("q", Scalar::from("hello world"))]);
        let encoded = encode_body(Some(&body), &[]).unwrap();
        assert_eq!(encoded.payload, b"q=hello+world");
        assert_eq!(encoded.content_type.as_deref(), Some(FORM_CONTENT_TYPE));
        assert!(encoded.inferred);
    }

    #[test]
    fn test_form_encoding_is_stable_across_runs() {
        let body = form(&[
            ("b", Scalar::from("x&y")),
            ("a", Scalar::from(1)),
            ("c", Scalar::from(true)),
        ]);
        let first = encode_body(Some(&body), &[]).unwrap();
        let second = encode_body(Some(&body), &[]).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.payload, b"a=1&b=x%26y&c=true");
    }

    #[test]
    fn test_form_round_trip() {
        let body = form(&[
            ("name", Scalar::from("Zoë & co")),
            ("n", Scalar::from(-3)),
            ("ratio", Scalar::from(0.25)),
            ("empty", Scalar::from("")),
        ]);
        let encoded = encode_body(Some(&body), &[]).unwrap();
        let decoded: HashMap<String, String> = form_urlencoded::parse(&encoded.payload)
            .into_owned()
            .collect();
        let expected: HashMap<String, String> = [
            ("name", "Zoë & co"),
            ("n", "-3"),
            ("ratio", "0.25"),
            ("empty", ""),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_declared_json_encodes_form_map_with_natural_types() {
        let body = form(&[("a", Scalar::from(1)), ("b", Scalar::from("x"))]);
        let encoded = encode_body(Some(&body), &ct("application/json")).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded.payload).unwrap();
        assert_eq!(value, json!({"a": 1, "b": "x"}));
        assert!(!encoded.inferred);
        assert_eq!(encoded.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_json_body_inferred() {
        let body = Body::Json(json!({"k": [1, 2]}));
        let encoded = encode_body(Some(&body), &[]).unwrap();
        assert_eq!(encoded.payload, br#"{"k":[1,2]}"#);
        assert_eq!(encoded.content_type.as_deref(), Some(JSON_CONTENT_TYPE));
        assert!(encoded.inferred);
    }

    #[test]
    fn test_json_array_without_content_type_is_unencodable() {
        let body = Body::Json(json!([1, 2, 3]));
        let err = encode_body(Some(&body), &[]).unwrap_err();
        assert!(matches!(err, HttpToolError::UnencodableBody(_)));
    }

    #[test]
    fn test_json_array_with_declared_json_is_allowed() {
        let body = Body::Json(json!([1, 2, 3]));
        let encoded = encode_body(Some(&body), &ct("application/json")).unwrap();
        assert_eq!(encoded.payload, b"[1,2,3]");
    }

    #[test]
    fn test_declared_form_with_flat_json_object() {
        let body = Body::Json(json!({"x": "a b", "y": 2, "z": false}));
        let encoded =
            encode_body(Some(&body), &ct("application/x-www-form-urlencoded")).unwrap();
        assert_eq!(encoded.payload, b"x=a+b&y=2&z=false");
    }

    #[test]
    fn test_declared_form_with_nested_json_is_unencodable() {
        let body = Body::Json(json!({"x": {"nested": true}}));
        let err =
            encode_body(Some(&body), &ct("application/x-www-form-urlencoded")).unwrap_err();
        assert!(matches!(err, HttpToolError::UnencodableBody(_)));
    }

    #[test]
    fn test_unsupported_declared_content_type() {
        let body = Body::Form(BTreeMap::new());
        let err = encode_body(Some(&body), &ct("text/plain")).unwrap_err();
        assert!(
            matches!(err, HttpToolError::UnsupportedContentType(ref ct) if ct == "text/plain")
        );
    }

    #[test]
    fn test_content_type_match_ignores_case() {
        let body = form(&[("a", Scalar::from("b"))]);
        let encoded = encode_body(Some(&body), &ct("Application/JSON; charset=UTF-8")).unwrap();
        assert_eq!(encoded.payload, br#"{"a":"b"}"#);
    }

    #[test]
    fn test_raw_body_passes_through() {
        let body = Body::Raw(b"\x00\x01binary".to_vec());
        let encoded = encode_body(Some(&body), &[]).unwrap();
        assert_eq!(encoded.payload, b"\x00\x01binary");
        assert!(encoded.content_type.is_none());
        assert!(!encoded.inferred);

        let encoded = encode_body(Some(&body), &ct("image/png")).unwrap();
        assert_eq!(encoded.content_type.as_deref(), Some("image/png"));
    }
}
