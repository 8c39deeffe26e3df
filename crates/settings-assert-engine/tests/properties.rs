//! Algebraic properties of the comparators and the default merger.

use proptest::prelude::*;
use serde_json::{Map, Value};
use settings_assert_engine::{compare, compare_membership, merge_defaults, substitute};

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn arb_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,3}", arb_value(), 0..5)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
}

proptest! {
    #[test]
    fn compare_is_reflexive(tree in arb_value()) {
        prop_assert!(compare(&tree, &tree, "").is_empty());
    }

    #[test]
    fn unequal_scalars_yield_one_root_record(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        let result = compare(&Value::from(a), &Value::from(b), "root");
        prop_assert_eq!(result.len(), 1);
        prop_assert_eq!(&result["root"].desired, &Value::from(b));
    }

    #[test]
    fn merge_is_idempotent(dest in arb_object(), defaults in arb_object()) {
        let once = merge_defaults(dest, &defaults);
        let twice = merge_defaults(once.clone(), &defaults);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_never_overwrites_scalars(dest in arb_object(), defaults in arb_object()) {
        let merged = merge_defaults(dest.clone(), &defaults);
        for (key, value) in dest.as_object().into_iter().flatten() {
            if !value.is_object() {
                prop_assert_eq!(&merged[key], value);
            }
        }
    }

    #[test]
    fn membership_ignores_order_and_duplicates(items in prop::collection::vec("[a-z]{1,3}", 0..6)) {
        let expected: Vec<Value> = items.iter().cloned().map(Value::String).collect();
        let mut actual = expected.clone();
        actual.reverse();
        actual.extend(expected.iter().cloned());
        prop_assert!(compare_membership(&Value::Array(actual), &expected, None).is_empty());
    }

    #[test]
    fn substitution_without_tokens_is_identity(tree in arb_value()) {
        // Generated strings never contain angle brackets.
        let context = Value::Object(Map::new());
        prop_assert_eq!(substitute(&tree, &context).unwrap(), tree);
    }
}
