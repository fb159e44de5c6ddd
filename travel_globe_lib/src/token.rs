//! Compact, URL-safe encoding of a whole trip collection.
//!
//! The JSON text is LZ-compressed into the `A-Za-z0-9+-$` alphabet, so a
//! token can be placed in a query-string value as is.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeFailure {
    #[error("token does not decompress to any text")]
    Decompress,
    #[error("decompressed token is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("decoded trip data is not an array")]
    NotAnArray,
}

pub fn encode<T: Serialize>(trips: &[T]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(trips)?;
    Ok(lz_str::compress_to_encoded_uri_component(json.as_str()))
}

/// The elements are untrusted and still need sanitizing.
pub fn decode(token: &str) -> Result<Vec<Value>, DecodeFailure> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeFailure::Decompress);
    }

    let text = lz_str::decompress_from_encoded_uri_component(token)
        .and_then(|wide| String::from_utf16(&wide).ok())
        .filter(|text| !text.is_empty())
        .ok_or(DecodeFailure::Decompress)?;

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(DecodeFailure::NotAnArray),
        Err(err) => Err(DecodeFailure::InvalidJson(err.to_string())),
    }
}

/// Decodes `token`, or hands back `fallback` when it cannot be decoded.
pub fn decode_or(token: &str, fallback: Vec<Value>) -> Vec<Value> {
    match decode(token) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!("Keeping previous trips, shared token rejected: {err}");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::trip::default_trips;

    fn compress(text: &str) -> String {
        lz_str::compress_to_encoded_uri_component(text)
    }

    #[test]
    fn round_trip_preserves_json_structure() {
        let trips = json!([
            {
                "label": "Kyoto, Japan",
                "lat": 35.0116,
                "lng": 135.7681,
                "date": "2025-03-17",
                "comments": "Cherry blossoms; matcha überload ✿",
                "color": "#0EA5E9",
                "extra": { "nested": [1, 2.5, null, true] }
            },
            { "lat": "abc" },
            "not even an object"
        ]);
        let items = trips.as_array().unwrap();

        let token = encode(items).unwrap();
        assert_eq!(Value::Array(decode(&token).unwrap()), trips);
    }

    #[test]
    fn typed_round_trip() {
        let trips = default_trips();
        let decoded = decode(&encode(&trips).unwrap()).unwrap();
        assert_eq!(decoded, serde_json::to_value(&trips).unwrap().as_array().unwrap().clone());
    }

    #[test]
    fn token_is_url_safe() {
        let token = encode(&default_trips()).unwrap();
        assert!(!token.is_empty());
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '$'))
        );
    }

    #[test]
    fn empty_collection() {
        let empty: Vec<Value> = Vec::new();
        assert_eq!(decode(&encode(&empty).unwrap()).unwrap(), empty);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode("not-valid-token").is_err());
        assert_eq!(decode(""), Err(DecodeFailure::Decompress));
        assert_eq!(decode("   "), Err(DecodeFailure::Decompress));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(decode(&compress("{not json")), Err(DecodeFailure::InvalidJson(_))));
    }

    #[test]
    fn rejects_non_array() {
        assert_eq!(decode(&compress(r#"{"label":"x"}"#)), Err(DecodeFailure::NotAnArray));
        assert_eq!(decode(&compress("42")), Err(DecodeFailure::NotAnArray));
    }

    #[test]
    fn falls_back() {
        let fallback = vec![json!({"label": "home"})];
        assert_eq!(decode_or("not-valid-token", fallback.clone()), fallback);

        let token = encode(&[json!({"label": "away"})]).unwrap();
        assert_eq!(decode_or(&token, fallback)[0]["label"], "away");
    }
}
