//! Structural comparison
//!
//! Walks the expected tree and reads the same paths from the actual tree.
//! A branch that cannot be read collapses into a single `unknown` record at
//! the branch root rather than one record per missing leaf.

use serde_json::{Map, Value};
use tracing::warn;

use crate::mismatch::{index_path, key_path, render_value, Mismatch, Mismatches};

/// Compare `actual` against `expected`, returning every mismatch keyed by path.
///
/// `prefix` names the root; an empty prefix yields paths like `repo.visibility`.
pub fn compare(actual: &Value, expected: &Value, prefix: &str) -> Mismatches {
    let mut mismatches = Mismatches::new();
    compare_into(actual, expected, prefix, &mut mismatches);
    mismatches
}

fn compare_into(actual: &Value, expected: &Value, path: &str, out: &mut Mismatches) {
    match expected {
        Value::Object(expected_map) => match readable_object(actual, expected_map) {
            Some(actual_map) => {
                for (key, expected_value) in expected_map {
                    // `readable_object` guarantees the key is present
                    if let Some(actual_value) = actual_map.get(key) {
                        compare_into(actual_value, expected_value, &key_path(path, key), out);
                    }
                }
            }
            None => {
                warn!(path, "unable to compare values: branch is not readable from the live data");
                out.insert(path.to_string(), Mismatch::unknown(expected.clone()));
            }
        },
        Value::Array(expected_items) => match readable_array(actual, expected_items) {
            Some(actual_items) => {
                for (index, expected_value) in expected_items.iter().enumerate() {
                    compare_into(&actual_items[index], expected_value, &index_path(path, index), out);
                }
            }
            None => {
                warn!(path, "unable to compare list values: sequence is not readable from the live data");
                out.insert(
                    path.to_string(),
                    Mismatch::unknown(Value::String(join_items(expected_items))),
                );
            }
        },
        scalar => {
            if !values_equal(actual, scalar) {
                out.insert(
                    path.to_string(),
                    Mismatch::observed(actual.clone(), scalar.clone()),
                );
            }
        }
    }
}

/// The actual mapping, if it holds every key the expected mapping names.
fn readable_object<'a>(actual: &'a Value, expected: &Map<String, Value>) -> Option<&'a Map<String, Value>> {
    let actual_map = actual.as_object()?;
    expected
        .keys()
        .all(|key| actual_map.contains_key(key))
        .then_some(actual_map)
}

/// The actual sequence, if it is long enough to index every expected position.
fn readable_array<'a>(actual: &'a Value, expected: &[Value]) -> Option<&'a Vec<Value>> {
    actual
        .as_array()
        .filter(|actual_items| actual_items.len() >= expected.len())
}

fn join_items(items: &[Value]) -> String {
    items.iter().map(render_value).collect::<Vec<_>>().join(",")
}

/// Exact equality with numbers compared by value (`1 == 1.0`).
///
/// No cross-type coercion: `"1"` and `1` are unequal, as are `true` and `1`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(key, x)| ym.get(key).is_some_and(|y| values_equal(x, y)))
        }
        (a, b) => a == b,
    }
}
