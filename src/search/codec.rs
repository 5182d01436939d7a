//! Conversion between record field values and index field entries

use crate::search::document::{FieldEntry, FieldKind};
use crate::search::error::{SearchError, SearchResult};
use serde_json::Value;

/// Encode one field value into an index entry.
///
/// Text kinds accept only JSON strings. Integers accept any JSON number that
/// fits an `i64` and are written in canonical decimal form.
pub fn encode(name: &str, value: &Value, kind: FieldKind, stored: bool) -> SearchResult<FieldEntry> {
    let text = match (kind, value) {
        (FieldKind::Integer, Value::Number(number)) => number
            .as_i64()
            .map(|n| n.to_string())
            .ok_or_else(|| SearchError::encoding(name, format!("{} is not a 64-bit integer", number)))?,
        (FieldKind::Integer, other) => {
            return Err(SearchError::encoding(
                name,
                format!("expected an integer, found {}", json_type(other)),
            ))
        }
        (FieldKind::Identifier, Value::String(s)) if s.is_empty() => {
            return Err(SearchError::encoding(name, "identifier must not be empty"))
        }
        (_, Value::String(s)) => s.clone(),
        (_, other) => {
            return Err(SearchError::encoding(
                name,
                format!("expected a string, found {}", json_type(other)),
            ))
        }
    };

    Ok(FieldEntry {
        name: name.to_string(),
        value: text,
        kind,
        stored,
    })
}

/// Decode stored text back into a value of the declared kind
pub fn decode(entry: &FieldEntry, declared: FieldKind) -> SearchResult<Value> {
    match declared {
        FieldKind::Integer => entry
            .value
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| SearchError::decoding(&entry.name, e.to_string())),
        FieldKind::Identifier | FieldKind::ExactText | FieldKind::TokenizedText => {
            Ok(Value::String(entry.value.clone()))
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, value: &str, kind: FieldKind) -> FieldEntry {
        FieldEntry {
            name: name.to_string(),
            value: value.to_string(),
            kind,
            stored: true,
        }
    }

    #[test]
    fn test_integer_uses_canonical_decimal() {
        let encoded = encode("price", &json!(-25), FieldKind::Integer, true).unwrap();
        assert_eq!(encoded.value, "-25");
        assert_eq!(decode(&encoded, FieldKind::Integer).unwrap(), json!(-25));
    }

    #[test]
    fn test_non_integer_numbers_fail_to_encode() {
        let err = encode("price", &json!(2.5), FieldKind::Integer, true).unwrap_err();
        assert!(matches!(err, SearchError::Encoding { ref field, .. } if field == "price"));

        let err = encode("price", &json!(u64::MAX), FieldKind::Integer, true).unwrap_err();
        assert!(matches!(err, SearchError::Encoding { .. }));

        let err = encode("price", &json!("20"), FieldKind::Integer, true).unwrap_err();
        assert!(matches!(err, SearchError::Encoding { .. }));
    }

    #[test]
    fn test_text_kinds_keep_value_verbatim() {
        let encoded = encode("author", &json!("Wu Cheng'en"), FieldKind::ExactText, false).unwrap();
        assert_eq!(encoded.value, "Wu Cheng'en");
        assert!(!encoded.stored);
        assert_eq!(
            decode(&encoded, FieldKind::ExactText).unwrap(),
            json!("Wu Cheng'en")
        );
    }

    #[test]
    fn test_empty_identifier_fails_to_encode() {
        let err = encode("id", &json!(""), FieldKind::Identifier, true).unwrap_err();
        assert!(matches!(err, SearchError::Encoding { .. }));
    }

    #[test]
    fn test_text_kinds_reject_numbers() {
        let err = encode("title", &json!(7), FieldKind::TokenizedText, true).unwrap_err();
        assert!(err.to_string().contains("expected a string"));
    }

    #[test]
    fn test_non_numeric_text_fails_to_decode_as_integer() {
        let err = decode(&entry("price", "twenty", FieldKind::Integer), FieldKind::Integer).unwrap_err();
        assert!(matches!(err, SearchError::Decoding { ref field, .. } if field == "price"));
    }
}
