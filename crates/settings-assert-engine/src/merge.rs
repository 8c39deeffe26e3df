//! Default merging
//!
//! Folds a defaults sub-document into a settings document:
//! - Keys missing from the destination: copied from the defaults
//! - Both sides mappings: merged recursively
//! - Anything else: the destination wins

use serde_json::Value;

use crate::substitute::DEFAULTS_KEY;

/// Merge `source` into `dest` without overwriting anything `dest` already sets.
///
/// Merging the same `source` twice yields the same result as merging it once.
pub fn merge_defaults(dest: Value, source: &Value) -> Value {
    match (dest, source) {
        (Value::Object(mut dest_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match dest_map.get_mut(key) {
                    None => {
                        dest_map.insert(key.clone(), source_value.clone());
                    }
                    Some(dest_value) if dest_value.is_object() && source_value.is_object() => {
                        let existing = dest_value.take();
                        *dest_value = merge_defaults(existing, source_value);
                    }
                    // Explicit setting wins
                    Some(_) => {}
                }
            }
            Value::Object(dest_map)
        }
        (dest, _) => dest,
    }
}

/// Fold the document's own `defaults` region into its sibling keys.
pub fn apply_defaults(document: Value) -> Value {
    match document.get(DEFAULTS_KEY).cloned() {
        Some(defaults) => merge_defaults(document, &defaults),
        None => document,
    }
}
