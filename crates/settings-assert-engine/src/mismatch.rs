//! Mismatch records produced by the comparators.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Mismatches keyed by path, ordered lexicographically.
///
/// Inserting a record for a path that is already present replaces it.
pub type Mismatches = BTreeMap<String, Mismatch>;

/// Observed side of a mismatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Current {
    /// A value read from the live data.
    Observed(Value),
    /// The branch could not be read from the live data.
    Unknown,
    /// No element of the live collection matched.
    Absent,
}

impl Current {
    /// Value form used in reports (`"unknown"` / `"none"` for the sentinels).
    pub fn to_value(&self) -> Value {
        match self {
            Current::Observed(value) => value.clone(),
            Current::Unknown => Value::String("unknown".to_string()),
            Current::Absent => Value::String("none".to_string()),
        }
    }
}

impl fmt::Display for Current {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Current::Observed(value) => f.write_str(&render_value(value)),
            Current::Unknown => f.write_str("unknown"),
            Current::Absent => f.write_str("none"),
        }
    }
}

impl Serialize for Current {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// One observed divergence between live and desired data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    /// What the live data holds
    pub current: Current,

    /// What the settings document asks for
    pub desired: Value,
}

impl Mismatch {
    /// A scalar that was read but differs.
    pub fn observed(current: Value, desired: Value) -> Self {
        Self {
            current: Current::Observed(current),
            desired,
        }
    }

    /// A branch that could not be read at all.
    pub fn unknown(desired: Value) -> Self {
        Self {
            current: Current::Unknown,
            desired,
        }
    }

    /// An expected collection member that is missing.
    pub fn absent(desired: Value) -> Self {
        Self {
            current: Current::Absent,
            desired,
        }
    }
}

/// Render a value for humans: strings verbatim, everything else as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extend a dotted path with a mapping key.
pub(crate) fn key_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Extend a path with a sequence index.
pub(crate) fn index_path(prefix: &str, index: usize) -> String {
    format!("{}[{}]", prefix, index)
}
