//! Test spec parsing and evaluation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use settings_assert_engine::{
    compare, compare_membership, render_value, Mismatches, Resolver, SubstituteError,
};
use settings_assert_github::MatchSelector;

use super::ConfigError;

/// How the fetched data is checked
#[derive(Debug, Clone, PartialEq)]
pub enum Assertion {
    /// `json`: the fetched tree must contain the expected tree
    Structural(Value),

    /// `array` (+ optional `key`): every expected item must be present
    Membership {
        expected: Vec<Value>,
        key: Option<String>,
    },
}

/// Binds a field of a prerequisite's response to a placeholder name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Placeholder name, used as `<key>` in the test
    pub key: String,

    /// Field of the prerequisite response
    pub value: String,
}

/// A fetch performed before the test to bind a placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prerequisite {
    /// API path template
    pub path: String,

    /// Narrow a list response to one element
    #[serde(default, rename = "match")]
    pub select: Option<MatchSelector>,

    /// Field to bind
    pub substitute: Binding,
}

/// One named assertion from the `tests` region
#[derive(Debug, Clone, PartialEq)]
pub struct TestSpec {
    /// Test name; may contain `{owner}` / `{repo}`
    pub name: String,

    /// API path template; may contain `{owner}` / `{repo}`
    pub path: String,

    /// Skip fetching and report IGNORED
    pub ignore: bool,

    /// Shown under FAILED and ERROR results
    pub hints: Vec<String>,

    pub assertion: Assertion,

    /// Narrow a list response to one element
    pub select: Option<MatchSelector>,

    pub prerequisites: Vec<Prerequisite>,
}

impl TestSpec {
    /// Parse the test spec stored under `tests.<name>`.
    pub fn from_value(name: &str, value: &Value) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidTestSpec {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let spec = value.as_object().ok_or_else(|| invalid("expected a mapping"))?;

        let path = spec
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing string 'path'"))?
            .to_string();

        let ignore = match spec.get("ignore") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => return Err(invalid("'ignore' must be true or false")),
        };

        let hints = match spec.get("hints") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(render_value).collect(),
            Some(_) => return Err(invalid("'hints' must be a list")),
        };

        let assertion = parse_assertion(spec).map_err(|reason| invalid(&reason))?;

        let select = match spec.get("match") {
            None | Some(Value::Null) => None,
            Some(selector) => Some(
                serde_json::from_value(selector.clone())
                    .map_err(|e| invalid(&format!("invalid 'match': {}", e)))?,
            ),
        };

        let prerequisites = match spec.get("prerequisites") {
            None | Some(Value::Null) => Vec::new(),
            Some(list) => serde_json::from_value(list.clone())
                .map_err(|e| invalid(&format!("invalid 'prerequisites': {}", e)))?,
        };

        Ok(Self {
            name: name.to_string(),
            path,
            ignore,
            hints,
            assertion,
            select,
            prerequisites,
        })
    }

    /// Resolve prerequisite placeholders against `bindings`.
    ///
    /// Rewrites the path, hints and assertion payload; every remaining
    /// placeholder must resolve.
    pub fn bind(&self, bindings: &Value) -> Result<Self, SubstituteError> {
        let resolver = Resolver::new(bindings);

        let assertion = match &self.assertion {
            Assertion::Structural(expected) => Assertion::Structural(resolver.resolve(expected)?),
            Assertion::Membership { expected, key } => Assertion::Membership {
                expected: expected
                    .iter()
                    .map(|item| resolver.resolve(item))
                    .collect::<Result<_, _>>()?,
                key: key.clone(),
            },
        };

        Ok(Self {
            path: resolver.resolve_str(&self.path)?,
            hints: self
                .hints
                .iter()
                .map(|hint| resolver.resolve_str(hint))
                .collect::<Result<_, _>>()?,
            assertion,
            ..self.clone()
        })
    }

    /// Compare fetched data against the assertion.
    pub fn evaluate(&self, actual: &Value) -> Mismatches {
        match &self.assertion {
            Assertion::Structural(expected) => compare(actual, expected, ""),
            Assertion::Membership { expected, key } => {
                compare_membership(actual, expected, key.as_deref())
            }
        }
    }
}

fn parse_assertion(spec: &Map<String, Value>) -> Result<Assertion, String> {
    match (spec.get("json"), spec.get("array")) {
        (Some(expected), None) => Ok(Assertion::Structural(expected.clone())),
        (None, Some(Value::Array(expected))) => {
            let key = match spec.get("key") {
                None | Some(Value::Null) => None,
                Some(Value::String(key)) => Some(key.clone()),
                Some(_) => return Err("'key' must be a string".to_string()),
            };
            Ok(Assertion::Membership {
                expected: expected.clone(),
                key,
            })
        }
        (None, Some(_)) => Err("'array' must be a list".to_string()),
        (Some(_), Some(_)) => Err("specify only one of 'json' or 'array'".to_string()),
        (None, None) => Err("one of 'json' or 'array' is required".to_string()),
    }
}
