//! Test execution
//!
//! Runs each test spec against the live repository, one at a time and in
//! declaration order:
//! - ignored tests are recorded without fetching
//! - prerequisites are fetched first and bind their placeholders
//! - fetch failures turn the test into an ERROR, never abort the run
//! - a placeholder that stays unresolved after binding aborts the run

use serde_json::{Map, Value};
use settings_assert_engine::{render_value, Mismatches, Resolver, SubstituteError};
use settings_assert_github::{select_match, Fetch, FetchError, MatchSelector};
use tracing::{debug, info, warn};

use crate::config::{Prerequisite, Settings, TestSpec};
use crate::summary::{ResultAggregator, TestResult};
use crate::target::Target;

/// Errors that abort the run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Test '{test}': {source}")]
    Binding {
        test: String,
        #[source]
        source: SubstituteError,
    },
}

/// Run-wide options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Report exit status 0 whatever the verdicts
    pub ignore_failures: bool,
}

impl RunOptions {
    /// Only a case-insensitive `true` enables ignore-failures.
    pub fn from_flag(ignore_failures: Option<&str>) -> Self {
        Self {
            ignore_failures: ignore_failures.is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
        }
    }
}

/// Per-test failure, decides between an ERROR verdict and aborting
enum CheckError {
    Fetch(FetchError),
    Binding(SubstituteError),
}

impl From<FetchError> for CheckError {
    fn from(err: FetchError) -> Self {
        CheckError::Fetch(err)
    }
}

impl From<SubstituteError> for CheckError {
    fn from(err: SubstituteError) -> Self {
        CheckError::Binding(err)
    }
}

/// Runs test specs against one repository through a fetcher
pub struct Runner<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    target: &'a Target,
}

impl<'a, F: Fetch + ?Sized> Runner<'a, F> {
    pub fn new(fetcher: &'a F, target: &'a Target) -> Self {
        Self { fetcher, target }
    }

    /// Run every test and collect the verdicts.
    pub fn run(&self, settings: &Settings) -> Result<ResultAggregator, RunError> {
        let mut results = ResultAggregator::new();
        for spec in settings.tests() {
            let result = self.run_test(spec)?;
            info!(test = %result.name, verdict = %result.verdict, "Test finished");
            results.record(result);
        }
        Ok(results)
    }

    /// Run a single test.
    pub fn run_test(&self, spec: &TestSpec) -> Result<TestResult, RunError> {
        let name = self.target.format(&spec.name);

        if spec.ignore {
            debug!(test = %name, "Skipping ignored test");
            return Ok(TestResult::ignored(name));
        }

        match self.check(spec) {
            Ok((mismatches, hints)) => Ok(TestResult::compared(name, mismatches, hints)),
            Err(CheckError::Fetch(err)) => {
                warn!(test = %name, error = %err, "Fetch failed");
                Ok(TestResult::error(name, err.to_string(), spec.hints.clone()))
            }
            Err(CheckError::Binding(source)) => Err(RunError::Binding { test: name, source }),
        }
    }

    fn check(&self, spec: &TestSpec) -> Result<(Mismatches, Vec<String>), CheckError> {
        let spec = if spec.prerequisites.is_empty() {
            spec.clone()
        } else {
            let bindings = self.bind_prerequisites(&spec.prerequisites)?;
            spec.bind(&bindings)?
        };

        let actual = self.fetch(&spec.path, spec.select.as_ref())?;
        Ok((spec.evaluate(&actual), spec.hints.clone()))
    }

    /// Fetch each prerequisite in order; later ones may use earlier bindings.
    fn bind_prerequisites(&self, prerequisites: &[Prerequisite]) -> Result<Value, CheckError> {
        let mut bindings = Value::Object(Map::new());

        for prerequisite in prerequisites {
            let path = Resolver::new(&bindings).resolve_str(&prerequisite.path)?;
            let response = self.fetch(&path, prerequisite.select.as_ref())?;

            let field = &prerequisite.substitute.value;
            let bound = response
                .get(field)
                .cloned()
                .ok_or_else(|| FetchError::MissingField {
                    path: self.target.format(&path),
                    field: field.clone(),
                })?;
            debug!(key = %prerequisite.substitute.key, value = %render_value(&bound), "Bound prerequisite");

            if let Value::Object(map) = &mut bindings {
                map.insert(prerequisite.substitute.key.clone(), bound);
            }
        }

        Ok(bindings)
    }

    fn fetch(&self, template: &str, select: Option<&MatchSelector>) -> Result<Value, FetchError> {
        let path = self.target.format(template);
        debug!(path = %path, "Fetching");
        let document = self.fetcher.get_json(&path)?;
        match select {
            Some(selector) => select_match(document, selector),
            None => Ok(document),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::Verdict;
    use serde_json::json;
    use settings_assert_engine::Mismatch;
    use settings_assert_github::MockFetcher;

    fn target() -> Target {
        Target::new("acme", "widgets")
    }

    fn spec(value: Value) -> TestSpec {
        TestSpec::from_value("{repo} check", &value).unwrap()
    }

    #[test]
    fn test_ignore_failures_flag() {
        assert!(RunOptions::from_flag(Some("true")).ignore_failures);
        assert!(RunOptions::from_flag(Some("TRUE")).ignore_failures);
        assert!(!RunOptions::from_flag(Some("false")).ignore_failures);
        assert!(!RunOptions::from_flag(Some("1")).ignore_failures);
        assert!(!RunOptions::from_flag(Some("")).ignore_failures);
        assert!(!RunOptions::from_flag(None).ignore_failures);
    }

    #[test]
    fn test_success_and_failure() {
        let fetcher = MockFetcher::new().with_json("repos/acme/widgets", json!({"visibility": "private"}));
        let target = target();
        let runner = Runner::new(&fetcher, &target);

        let ok = runner
            .run_test(&spec(json!({"path": "repos/{owner}/{repo}", "json": {"visibility": "private"}})))
            .unwrap();
        assert_eq!(ok.name, "widgets check");
        assert_eq!(ok.verdict, Verdict::Success);

        let failed = runner
            .run_test(&spec(json!({"path": "repos/{owner}/{repo}", "json": {"visibility": "public"}})))
            .unwrap();
        assert_eq!(failed.verdict, Verdict::Failed);
        assert_eq!(
            failed.mismatches["visibility"],
            Mismatch::observed(json!("private"), json!("public"))
        );
    }

    #[test]
    fn test_ignored_does_not_fetch() {
        let fetcher = MockFetcher::new();
        let target = target();
        let result = Runner::new(&fetcher, &target)
            .run_test(&spec(json!({"path": "repos/{owner}/{repo}", "ignore": true, "json": {}})))
            .unwrap();

        assert_eq!(result.verdict, Verdict::Ignored);
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn test_fetch_error_is_error_verdict() {
        let fetcher = MockFetcher::new().with_status("repos/acme/widgets/branches/main/protection", 404);
        let target = target();
        let result = Runner::new(&fetcher, &target)
            .run_test(&spec(json!({
                "path": "repos/{owner}/{repo}/branches/main/protection",
                "hints": ["Protect main"],
                "json": {"enforce_admins": {"enabled": true}}
            })))
            .unwrap();

        assert_eq!(result.verdict, Verdict::Error);
        assert!(result.mismatches.is_empty());
        assert_eq!(result.hints, vec!["Protect main".to_string()]);
        assert!(result.error.unwrap().contains("404"));
    }

    #[test]
    fn test_match_narrows_list() {
        let fetcher = MockFetcher::new().with_json(
            "repos/acme/widgets/environments",
            json!([{"name": "staging", "wait": 0}, {"name": "prod", "wait": 30}]),
        );
        let target = target();
        let result = Runner::new(&fetcher, &target)
            .run_test(&spec(json!({
                "path": "repos/{owner}/{repo}/environments",
                "match": {"key": "name", "value": "prod"},
                "json": {"wait": 30}
            })))
            .unwrap();
        assert_eq!(result.verdict, Verdict::Success);
    }

    #[test]
    fn test_no_match_is_error_verdict() {
        let fetcher = MockFetcher::new().with_json("repos/acme/widgets/environments", json!([]));
        let target = target();
        let result = Runner::new(&fetcher, &target)
            .run_test(&spec(json!({
                "path": "repos/{owner}/{repo}/environments",
                "match": {"key": "name", "value": "prod"},
                "json": {"wait": 30}
            })))
            .unwrap();
        assert_eq!(result.verdict, Verdict::Error);
        assert_eq!(result.error.as_deref(), Some("Unable to find match for name=prod"));
    }

    #[test]
    fn test_prerequisite_binds_placeholder() {
        let fetcher = MockFetcher::new()
            .with_json(
                "repos/acme/widgets/rulesets",
                json!([{"id": 7, "name": "default"}]),
            )
            .with_json(
                "repos/acme/widgets/rulesets/7",
                json!({"id": 7, "enforcement": "active"}),
            );
        let target = target();
        let result = Runner::new(&fetcher, &target)
            .run_test(&spec(json!({
                "path": "repos/{owner}/{repo}/rulesets/<ruleset_id>",
                "prerequisites": [{
                    "path": "repos/{owner}/{repo}/rulesets",
                    "match": {"key": "name", "value": "default"},
                    "substitute": {"key": "ruleset_id", "value": "id"}
                }],
                "json": {"enforcement": "active"}
            })))
            .unwrap();

        assert_eq!(result.verdict, Verdict::Success);
        assert_eq!(
            fetcher.requests(),
            vec!["repos/acme/widgets/rulesets", "repos/acme/widgets/rulesets/7"]
        );
    }

    #[test]
    fn test_prerequisite_missing_field_is_error_verdict() {
        let fetcher = MockFetcher::new().with_json("teams/core", json!({"name": "core"}));
        let target = target();
        let result = Runner::new(&fetcher, &target)
            .run_test(&spec(json!({
                "path": "teams/<team_id>",
                "prerequisites": [{"path": "teams/core", "substitute": {"key": "team_id", "value": "id"}}],
                "json": {}
            })))
            .unwrap();
        assert_eq!(result.verdict, Verdict::Error);
        assert_eq!(fetcher.requests(), vec!["teams/core"]);
    }

    #[test]
    fn test_unbound_placeholder_aborts() {
        let fetcher = MockFetcher::new().with_json("teams/core", json!({"id": 3}));
        let target = target();
        let err = Runner::new(&fetcher, &target)
            .run_test(&spec(json!({
                "path": "teams/<team_id>/<other>",
                "prerequisites": [{"path": "teams/core", "substitute": {"key": "team_id", "value": "id"}}],
                "json": {}
            })))
            .unwrap_err();
        assert!(err.to_string().contains("Unable to find substitution for <other>"));
    }
}
