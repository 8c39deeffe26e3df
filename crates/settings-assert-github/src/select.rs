//! Narrowing list responses to a single element

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fetch::FetchError;

/// Selects the first list element whose `key` field equals `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSelector {
    pub key: String,
    pub value: Value,
}

/// Apply `selector` to a fetched document.
///
/// Only lists are narrowed; any other document passes through unchanged.
pub fn select_match(document: Value, selector: &MatchSelector) -> Result<Value, FetchError> {
    match document {
        Value::Array(items) => items
            .into_iter()
            .find(|item| item.get(&selector.key) == Some(&selector.value))
            .ok_or_else(|| FetchError::NoMatch {
                key: selector.key.clone(),
                value: match &selector.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            }),
        other => Ok(other),
    }
}
