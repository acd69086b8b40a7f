//! Codec between plain JSON and Firestore's typed value wire format.

use serde_json::{json, Map, Value};

/// Encode one JSON value into its typed Firestore representation.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // integerValue is a string on the wire
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

/// Encode a JSON object into a Firestore `fields` map.
pub fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// Decode one typed Firestore value back into plain JSON. Timestamps come
/// back as their RFC 3339 string form.
pub fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return Value::Null;
    };

    if let Some((kind, inner)) = obj.iter().next() {
        match kind.as_str() {
            "nullValue" => Value::Null,
            "booleanValue" | "doubleValue" | "stringValue" => inner.clone(),
            "integerValue" => inner
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .map(Value::from)
                .unwrap_or_else(|| inner.clone()),
            "timestampValue" => inner.clone(),
            "arrayValue" => {
                let items = inner
                    .get("values")
                    .and_then(Value::as_array)
                    .map(|values| values.iter().map(decode_value).collect())
                    .unwrap_or_default();
                Value::Array(items)
            }
            "mapValue" => {
                let fields = inner
                    .get("fields")
                    .and_then(Value::as_object)
                    .map(decode_fields)
                    .unwrap_or_default();
                Value::Object(fields)
            }
            _ => Value::Null,
        }
    } else {
        Value::Null
    }
}

/// Decode a Firestore `fields` map back into a JSON object.
pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_scalars() {
        assert_eq!(encode_value(&json!("hi")), json!({"stringValue": "hi"}));
        assert_eq!(encode_value(&json!(true)), json!({"booleanValue": true}));
        assert_eq!(encode_value(&json!(null)), json!({"nullValue": null}));
        assert_eq!(encode_value(&json!(42)), json!({"integerValue": "42"}));
        assert_eq!(encode_value(&json!(1.5)), json!({"doubleValue": 1.5}));
    }

    #[test]
    fn encodes_nested_structures() {
        let value = json!({
            "tags": ["a", "b"],
            "profile": { "age": 30 }
        });
        let encoded = encode_fields(value.as_object().unwrap());

        assert_eq!(
            encoded["tags"],
            json!({"arrayValue": {"values": [
                {"stringValue": "a"},
                {"stringValue": "b"}
            ]}})
        );
        assert_eq!(
            encoded["profile"],
            json!({"mapValue": {"fields": {"age": {"integerValue": "30"}}}})
        );
    }

    #[test]
    fn decodes_back_to_plain_json() {
        let wire = json!({
            "username": {"stringValue": "alice"},
            "age": {"integerValue": "30"},
            "score": {"doubleValue": 9.5},
            "active": {"booleanValue": true},
            "nickname": {"nullValue": null},
            "tags": {"arrayValue": {"values": [{"stringValue": "a"}]}},
            "profile": {"mapValue": {"fields": {"city": {"stringValue": "Oslo"}}}}
        });
        let decoded = decode_fields(wire.as_object().unwrap());

        assert_eq!(decoded["username"], json!("alice"));
        assert_eq!(decoded["age"], json!(30));
        assert_eq!(decoded["score"], json!(9.5));
        assert_eq!(decoded["active"], json!(true));
        assert_eq!(decoded["nickname"], json!(null));
        assert_eq!(decoded["tags"], json!(["a"]));
        assert_eq!(decoded["profile"], json!({"city": "Oslo"}));
    }

    #[test]
    fn decodes_timestamps_as_rfc3339_strings() {
        let wire = json!({"timestampValue": "2026-08-06T10:00:00.000000Z"});
        assert_eq!(decode_value(&wire), json!("2026-08-06T10:00:00.000000Z"));
    }

    #[test]
    fn roundtrips_a_submission_shaped_object() {
        let plain = json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "secret",
            "newsletter": true,
            "scores": [1, 2, 3]
        });
        let encoded = encode_fields(plain.as_object().unwrap());
        let decoded = decode_fields(&encoded);
        assert_eq!(Value::Object(decoded), plain);
    }
}
