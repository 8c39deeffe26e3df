//! Run-scoped accumulation of test results

use serde::Serialize;
use settings_assert_engine::Mismatches;

use super::verdict::{Verdict, MAX_FAILURE_EXIT_CODE};

/// The recorded outcome of one test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    /// Test name with `{owner}` / `{repo}` filled in
    pub name: String,

    pub verdict: Verdict,

    /// Only ever non-empty for FAILED
    #[serde(skip_serializing_if = "Mismatches::is_empty")]
    pub mismatches: Mismatches,

    /// Fetch error message for ERROR
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Hints from the test spec, shown for FAILED and ERROR
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl TestResult {
    pub fn ignored(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verdict: Verdict::Ignored,
            mismatches: Mismatches::new(),
            error: None,
            hints: Vec::new(),
        }
    }

    /// FAILED when there are mismatches, SUCCESS otherwise
    pub fn compared(name: impl Into<String>, mismatches: Mismatches, hints: Vec<String>) -> Self {
        let verdict = if mismatches.is_empty() {
            Verdict::Success
        } else {
            Verdict::Failed
        };
        Self {
            name: name.into(),
            verdict,
            mismatches,
            error: None,
            hints,
        }
    }

    /// ERROR carries no mismatch data
    pub fn error(name: impl Into<String>, message: impl Into<String>, hints: Vec<String>) -> Self {
        Self {
            name: name.into(),
            verdict: Verdict::Error,
            mismatches: Mismatches::new(),
            error: Some(message.into()),
            hints,
        }
    }
}

/// Append-only collection of test results for one run
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    results: Vec<TestResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Results in recording order
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn count(&self, verdict: Verdict) -> usize {
        self.results.iter().filter(|r| r.verdict == verdict).count()
    }

    pub fn errors(&self) -> usize {
        self.count(Verdict::Error)
    }

    pub fn failed(&self) -> usize {
        self.count(Verdict::Failed)
    }

    pub fn succeeded(&self) -> usize {
        self.count(Verdict::Success)
    }

    pub fn ignored(&self) -> usize {
        self.count(Verdict::Ignored)
    }

    /// 0 when overridden, otherwise FAILED + ERROR (clamped).
    pub fn exit_status(&self, ignore_failures: bool) -> i32 {
        if ignore_failures {
            return 0;
        }
        let failures = self.errors() + self.failed();
        i32::try_from(failures)
            .unwrap_or(MAX_FAILURE_EXIT_CODE)
            .min(MAX_FAILURE_EXIT_CODE)
    }
}
