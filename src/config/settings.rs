//! The resolved settings document and its test specs

use serde_json::{Map, Value};
use settings_assert_engine::{apply_defaults, Resolver, SubstituteError, DEFAULTS_KEY};
use std::collections::{BTreeMap, BTreeSet};

use super::loader::{load_documents, parse_document, LoaderConfig, SettingsSource};
use super::test_spec::TestSpec;
use super::ConfigError;

/// Key of the test spec region
pub const TESTS_KEY: &str = "tests";

/// Fully loaded settings: resolved, defaulted, with parsed test specs.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    tests: Vec<TestSpec>,
    sources: Vec<SettingsSource>,
}

impl Settings {
    /// Load the layered files and build the settings.
    pub fn load(config: &LoaderConfig) -> Result<Self, ConfigError> {
        let loaded = load_documents(config)?;
        Self::from_document(loaded.document, loaded.sources)
    }

    /// Build settings from a single YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let document = parse_document(contents, "<inline>")?;
        Self::from_document(document, Vec::new())
    }

    /// Resolve placeholders, apply defaults and parse every test spec.
    ///
    /// Placeholders bound by a test's own prerequisites are left for the runner.
    pub fn from_document(
        raw: Map<String, Value>,
        sources: Vec<SettingsSource>,
    ) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::EmptyDocument {
                searched: describe_sources(&sources),
            });
        }

        let raw = Value::Object(raw);
        let document = apply_defaults(resolve_document(&raw)?);
        let tests = parse_tests(&document)?;

        Ok(Self {
            tests,
            sources,
        })
    }

    /// Test specs in declaration order
    pub fn tests(&self) -> &[TestSpec] {
        &self.tests
    }

    /// Files the document was layered from
    pub fn sources(&self) -> &[SettingsSource] {
        &self.sources
    }
}

fn describe_sources(sources: &[SettingsSource]) -> String {
    if sources.is_empty() {
        "<inline>".to_string()
    } else {
        sources
            .iter()
            .map(|s| s.path.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Resolve every placeholder in the document.
///
/// Each entry of `tests` and `defaults.tests` defers only the names bound by
/// prerequisites of the test with the same name; everything else must
/// resolve now.
fn resolve_document(raw: &Value) -> Result<Value, SubstituteError> {
    let strict = Resolver::new(raw);
    let Value::Object(map) = raw else {
        return strict.resolve(raw);
    };
    let bindings = prerequisite_bindings(raw);

    let mut resolved = Map::with_capacity(map.len());
    for (key, value) in map {
        let value = match (key.as_str(), value) {
            (TESTS_KEY, tests) => resolve_tests(raw, tests, &bindings)?,
            (DEFAULTS_KEY, Value::Object(defaults)) => {
                let mut region = Map::with_capacity(defaults.len());
                for (name, value) in defaults {
                    let value = if name == TESTS_KEY {
                        resolve_tests(raw, value, &bindings)?
                    } else {
                        strict.resolve(value)?
                    };
                    region.insert(strict.resolve_str(name)?, value);
                }
                Value::Object(region)
            }
            (_, value) => strict.resolve(value)?,
        };
        resolved.insert(strict.resolve_str(key)?, value);
    }
    Ok(Value::Object(resolved))
}

fn resolve_tests(
    context: &Value,
    tests: &Value,
    bindings: &BTreeMap<String, BTreeSet<String>>,
) -> Result<Value, SubstituteError> {
    let Value::Object(tests) = tests else {
        return Resolver::new(context).resolve(tests);
    };

    let mut resolved = Map::with_capacity(tests.len());
    for (name, spec) in tests {
        let resolver =
            Resolver::new(context).with_deferred(bindings.get(name).into_iter().flatten().cloned());
        resolved.insert(resolver.resolve_str(name)?, resolver.resolve(spec)?);
    }
    Ok(Value::Object(resolved))
}

/// Names bound by `prerequisites[].substitute.key`, per test name, across
/// `tests` and `defaults.tests`.
fn prerequisite_bindings(document: &Value) -> BTreeMap<String, BTreeSet<String>> {
    let regions = [
        document.get(TESTS_KEY),
        document.get(DEFAULTS_KEY).and_then(|d| d.get(TESTS_KEY)),
    ];

    let mut bindings: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for tests in regions.into_iter().flatten().filter_map(Value::as_object) {
        for (name, spec) in tests {
            let keys = spec
                .get("prerequisites")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|prerequisite| {
                    prerequisite
                        .get("substitute")
                        .and_then(|s| s.get("key"))
                        .and_then(Value::as_str)
                });
            bindings
                .entry(name.clone())
                .or_default()
                .extend(keys.map(str::to_string));
        }
    }
    bindings
}

fn parse_tests(document: &Value) -> Result<Vec<TestSpec>, ConfigError> {
    match document.get(TESTS_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(tests)) => tests
            .iter()
            .map(|(name, spec)| TestSpec::from_value(name, spec))
            .collect(),
        Some(_) => Err(ConfigError::InvalidTests),
    }
}
