//! Response Payloads
//!
//! The backend wraps lists inconsistently: some endpoints return a bare array, others nest it
//! under `items` or `data`, optionally alongside a `success` flag.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Envelope keys tried for cart payloads, in order.
pub const CART_ENVELOPE_KEYS: &[&str] = &["items", "data"];

/// Envelope keys tried for catalog and other list payloads.
pub const DATA_ENVELOPE_KEYS: &[&str] = &["data"];

/// Extract the list carried by `payload`.
///
/// Returns `None` when the payload is neither a bare array nor an object holding an array under
/// one of `keys`, or when it carries `"success": false`.
pub fn list_from_envelope(payload: Value, keys: &[&str]) -> Option<Vec<Value>> {
    match payload {
        Value::Array(entries) => Some(entries),
        Value::Object(mut object) => {
            if object.get("success").and_then(Value::as_bool) == Some(false) {
                return None;
            }

            keys.iter().find_map(|key| match object.remove(*key) {
                Some(Value::Array(entries)) => Some(entries),
                _ => None,
            })
        }
        _ => None,
    }
}

/// Deserialize each entry, dropping the ones that do not fit `T`.
pub fn parse_entries<T: DeserializeOwned>(entries: Vec<Value>) -> Vec<T> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                debug!(%error, "skipping malformed entry");
                None
            }
        })
        .collect()
}

/// Extract and parse a list payload, degrading to an empty list when the shape is unexpected.
pub fn parse_list<T: DeserializeOwned>(payload: Value, keys: &[&str]) -> Vec<T> {
    list_from_envelope(payload, keys)
        .map(parse_entries)
        .unwrap_or_default()
}

/// First human-readable message found under `keys`.
///
/// A key may hold a string or a list whose first element is a string, which is how field
/// validation errors are reported.
pub fn message_from(payload: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match payload.get(*key)? {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Array(messages) => messages.first()?.as_str().map(ToString::to_string),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bare_array() {
        let entries = list_from_envelope(json!([1, 2]), CART_ENVELOPE_KEYS);

        assert_eq!(entries, Some(vec![json!(1), json!(2)]));
    }

    #[test]
    fn items_envelope() {
        let entries = list_from_envelope(json!({ "items": [1] }), CART_ENVELOPE_KEYS);

        assert_eq!(entries, Some(vec![json!(1)]));
    }

    #[test]
    fn data_envelope() {
        let entries = list_from_envelope(json!({ "success": true, "data": [] }), CART_ENVELOPE_KEYS);

        assert_eq!(entries, Some(vec![]));
    }

    #[test]
    fn unexpected_shapes() {
        assert_eq!(list_from_envelope(json!("<html>"), CART_ENVELOPE_KEYS), None);
        assert_eq!(list_from_envelope(json!({ "items": 3 }), CART_ENVELOPE_KEYS), None);
        assert_eq!(list_from_envelope(json!({ "items": [1] }), DATA_ENVELOPE_KEYS), None);
        assert_eq!(
            list_from_envelope(json!({ "success": false, "data": [1] }), DATA_ENVELOPE_KEYS),
            None
        );
    }

    #[test]
    fn parse_list_skips_bad_entries() {
        let parsed: Vec<u32> = parse_list(json!({ "data": [1, "two", 3] }), DATA_ENVELOPE_KEYS);

        assert_eq!(parsed, vec![1, 3]);
    }

    #[test]
    fn parse_list_degrades_to_empty() {
        let parsed: Vec<u32> = parse_list(json!(null), DATA_ENVELOPE_KEYS);

        assert!(parsed.is_empty());
    }

    #[test]
    fn messages_from_strings_and_lists() {
        let payload = json!({
            "quantity": ["Only 3 left in stock"],
            "user_msg": "Validation Error",
        });

        assert_eq!(
            message_from(&payload, &["quantity", "user_msg"]).as_deref(),
            Some("Only 3 left in stock")
        );
        assert_eq!(
            message_from(&payload, &["error", "user_msg"]).as_deref(),
            Some("Validation Error")
        );
        assert_eq!(message_from(&payload, &["error"]), None);
    }
}
