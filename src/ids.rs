//! Identifier normalization shared by token claims and backend payloads.
//!
//! The auth and data backends are not consistent about id types: some emit
//! `"sub": "42"`, others `"sub": 42`. Both are accepted and kept as strings.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

fn normalize<E: de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
        other => Err(E::custom(format!(
            "expected a string or integer identifier, got {other}"
        ))),
    }
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    normalize(Value::deserialize(deserializer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
    }

    #[test]
    fn accepts_strings_and_integers() {
        let from_str: Option<Wrapper> = serde_json::from_str(r#"{"id":"abc"}"#).ok();
        assert_eq!(from_str.map(|w| w.id).as_deref(), Some("abc"));

        let from_int: Option<Wrapper> = serde_json::from_str(r#"{"id":42}"#).ok();
        assert_eq!(from_int.map(|w| w.id).as_deref(), Some("42"));
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"id":1.5}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"id":null}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"id":[1]}"#).is_err());
    }
}
