//! Lenient field decoders for values the backend serializes inconsistently.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts `"12"`, `12`, `12.5` or `null` and keeps the textual form.
/// Decimal fields (fees, amounts) arrive as strings; labels such as
/// `batch_number` may arrive as either.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Accepts either a bare id or a nested object carrying an `id`.
pub fn id_or_object<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id {n}"))),
        Value::Object(map) => map
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| serde::de::Error::custom("object without integer id")),
        other => Err(serde::de::Error::custom(format!("expected id, got {other}"))),
    }
}
