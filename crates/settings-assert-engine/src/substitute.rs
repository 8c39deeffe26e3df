//! Placeholder resolution
//!
//! Rewrites `<a.b.c>` tokens embedded in strings with values looked up in a
//! substitution context. Lookups that miss fall back to the `defaults.`
//! namespace of the same context.

use regex_lite::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::mismatch::render_value;

/// Namespace consulted when a direct lookup fails.
pub const DEFAULTS_KEY: &str = "defaults";

const TOKEN_PATTERN: &str = r"<([A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)*)>";

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern compiles"))
}

/// Placeholder resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubstituteError {
    #[error("Unable to find substitution for <{key}>")]
    Unresolved { key: String },
}

/// Resolves placeholders against a borrowed context.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    context: &'a Value,
    deferred: BTreeSet<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(context: &'a Value) -> Self {
        Self {
            context,
            deferred: BTreeSet::new(),
        }
    }

    /// Leave tokens whose first path segment is one of `names` untouched.
    ///
    /// Those tokens are bound later, once the values they name exist.
    pub fn with_deferred<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deferred.extend(names.into_iter().map(Into::into));
        self
    }

    /// Resolve every placeholder in `value`, including in mapping keys.
    pub fn resolve(&self, value: &Value) -> Result<Value, SubstituteError> {
        match value {
            Value::Object(map) => {
                let mut resolved = Map::with_capacity(map.len());
                for (key, val) in map {
                    resolved.insert(self.resolve_str(key)?, self.resolve(val)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::String(s) => self.resolve_str(s).map(Value::String),
            other => Ok(other.clone()),
        }
    }

    /// Resolve the tokens of a single string, left to right.
    ///
    /// Inserted text is never scanned again.
    pub fn resolve_str(&self, text: &str) -> Result<String, SubstituteError> {
        let mut resolved = String::with_capacity(text.len());
        let mut last = 0;

        for caps in token_regex().captures_iter(text) {
            let (Some(token), Some(expr)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let expr = expr.as_str();
            if self.is_deferred(expr) {
                continue;
            }

            let value = self.lookup(expr).ok_or_else(|| SubstituteError::Unresolved {
                key: expr.to_string(),
            })?;

            resolved.push_str(&text[last..token.start()]);
            resolved.push_str(&render_value(value));
            last = token.end();
        }

        resolved.push_str(&text[last..]);
        Ok(resolved)
    }

    /// Look up a dotted path, falling back to `defaults.<expr>`.
    pub fn lookup(&self, expr: &str) -> Option<&'a Value> {
        deep_get(self.context, expr).or_else(|| {
            self.context
                .get(DEFAULTS_KEY)
                .and_then(|defaults| deep_get(defaults, expr))
        })
    }

    fn is_deferred(&self, expr: &str) -> bool {
        expr.split('.')
            .next()
            .is_some_and(|head| self.deferred.contains(head))
    }
}

/// Resolve `value` against `context` with no deferred names.
pub fn substitute(value: &Value, context: &Value) -> Result<Value, SubstituteError> {
    Resolver::new(context).resolve(value)
}

/// Every segment must index into a mapping.
fn deep_get<'v>(value: &'v Value, expr: &str) -> Option<&'v Value> {
    expr.split('.')
        .try_fold(value, |node, segment| node.as_object()?.get(segment))
}
