use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A snapshot of one request received by the [`OpsGenieServer`](crate::OpsGenieServer).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedRequest {
    /// The request target as received, path and query only.
    pub url: String,
    /// The verbatim `Authorization` header, or an empty string when it was absent.
    pub authorization: String,
    /// The decoded alert body, left at its default when the body wasn't valid JSON.
    pub post_data: PostData,
}

/// The alert payload an OpsGenie client posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostData {
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub entity: String,
    #[serde(deserialize_with = "null_as_default")]
    pub alias: String,
    #[serde(deserialize_with = "null_as_default")]
    pub note: String,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub details: HashMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub responders: Vec<HashMap<String, String>>,
}

impl PostData {
    /// Decodes the first JSON value of `body`, falling back to the default payload when the body
    /// is empty or malformed. Anything after the first value is ignored and field names are
    /// matched regardless of case.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::Deserializer::from_slice(body)
            .into_iter::<Value>()
            .next()
            .and_then(Result::ok)
            .map(fold_field_names)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }
}

// only the payload's own field names are folded, detail and responder keys are kept as sent
fn fold_field_names(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_lowercase(), value))
                .collect(),
        ),
        value => value,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
