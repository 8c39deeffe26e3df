//! Membership comparison
//!
//! Checks that every expected item is present somewhere in a live
//! collection. Order, duplicates and extra live items do not matter.

use serde_json::Value;
use tracing::{debug, warn};

use crate::compare::values_equal;
use crate::mismatch::{Mismatch, Mismatches};

/// Report each element of `expected` that has no equal in `actual`.
///
/// With `key`, live elements are projected through that field first;
/// elements without the field take no part in the check. Records are keyed
/// `[i]` by the index of the missing expected element.
pub fn compare_membership(actual: &Value, expected: &[Value], key: Option<&str>) -> Mismatches {
    let candidates = candidates(actual, key);

    expected
        .iter()
        .enumerate()
        .filter(|(_, wanted)| !candidates.iter().any(|candidate| values_equal(candidate, wanted)))
        .map(|(index, wanted)| (format!("[{}]", index), Mismatch::absent(wanted.clone())))
        .collect()
}

fn candidates<'a>(actual: &'a Value, key: Option<&str>) -> Vec<&'a Value> {
    let Some(items) = actual.as_array() else {
        warn!("membership check expected a list from the live data");
        return Vec::new();
    };

    match key {
        Some(key) => items
            .iter()
            .filter_map(|item| {
                let projected = item.get(key);
                if projected.is_none() {
                    debug!(key, "skipping list element without projection key");
                }
                projected
            })
            .collect(),
        None => items.iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_all_present_with_duplicates() {
        let actual = json!(["a", "b", "a"]);
        assert!(compare_membership(&actual, &[json!("a"), json!("b")], None).is_empty());
    }

    #[test]
    fn test_missing_element() {
        let result = compare_membership(&json!(["a"]), &[json!("a"), json!("b")], None);
        assert_eq!(result.len(), 1);
        assert_eq!(result["[1]"], Mismatch::absent(json!("b")));
    }

    #[test]
    fn test_extra_actual_elements_ignored() {
        let actual = json!(["c", "b", "a", "z"]);
        assert!(compare_membership(&actual, &[json!("a"), json!("b")], None).is_empty());
    }

    #[test]
    fn test_projection_key() {
        let actual = json!([{"pattern": "v1"}]);
        let result = compare_membership(&actual, &[json!("v1"), json!("v2")], Some("pattern"));

        assert_eq!(result.len(), 1);
        assert_eq!(result["[1]"], Mismatch::absent(json!("v2")));
    }

    #[test]
    fn test_projection_skips_elements_without_key() {
        let actual = json!([{"name": "v1"}, "v2", {"pattern": "v3"}]);
        let result = compare_membership(&actual, &[json!("v1"), json!("v3")], Some("pattern"));

        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["[0]"]);
    }

    #[test]
    fn test_non_list_actual_reports_every_item() {
        let result = compare_membership(&json!({"a": 1}), &[json!("a"), json!("b")], None);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_structured_elements() {
        let actual = json!([{"context": "ci", "app_id": 15368}]);
        let expected = [json!({"app_id": 15368, "context": "ci"})];
        assert!(compare_membership(&actual, &expected, None).is_empty());
    }

    #[test]
    fn test_empty_expected() {
        assert!(compare_membership(&json!([]), &[], None).is_empty());
    }
}
