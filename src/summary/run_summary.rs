//! Run summary (machine-readable report of one run)

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

use super::aggregator::{ResultAggregator, TestResult};
use crate::config::SettingsSource;
use crate::target::Target;

/// Schema version for the run summary
pub const RUN_SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for the run summary
pub const RUN_SUMMARY_SCHEMA_ID: &str = "settings-assert/run_summary@1";

/// Report of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When the summary was created
    pub created_at: DateTime<Utc>,

    /// `owner/repo` that was checked
    pub repository: String,

    /// Exit status the process reports
    pub exit_code: i32,

    /// Whether `--ignore-failures` was in effect
    pub ignore_failures: bool,

    pub test_count: usize,
    pub tests_succeeded: usize,
    pub tests_failed: usize,
    pub tests_errored: usize,
    pub tests_ignored: usize,

    /// Settings files that contributed to the document
    pub sources: Vec<SettingsSource>,

    /// Per-test results in execution order
    pub results: Vec<TestResult>,

    /// Human-readable summary
    pub human_summary: String,
}

impl RunSummary {
    pub fn from_results(
        results: &ResultAggregator,
        target: &Target,
        sources: &[SettingsSource],
        ignore_failures: bool,
    ) -> Self {
        let test_count = results.results().len();
        let tests_succeeded = results.succeeded();
        let tests_failed = results.failed();
        let tests_errored = results.errors();
        let tests_ignored = results.ignored();

        let human_summary = Self::generate_human_summary(
            test_count,
            tests_succeeded,
            tests_failed,
            tests_errored,
            tests_ignored,
        );

        Self {
            schema_version: RUN_SUMMARY_SCHEMA_VERSION,
            schema_id: RUN_SUMMARY_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            repository: target.to_string(),
            exit_code: results.exit_status(ignore_failures),
            ignore_failures,
            test_count,
            tests_succeeded,
            tests_failed,
            tests_errored,
            tests_ignored,
            sources: sources.to_vec(),
            results: results.results().to_vec(),
            human_summary,
        }
    }

    fn generate_human_summary(
        test_count: usize,
        succeeded: usize,
        failed: usize,
        errored: usize,
        ignored: usize,
    ) -> String {
        if test_count == 0 {
            return "No tests defined".to_string();
        }
        if failed + errored == 0 {
            return format!("All checks passed: {}/{} succeeded, {} ignored", succeeded, test_count, ignored);
        }
        format!(
            "Checks failed: {} succeeded, {} failed, {} errored, {} ignored",
            succeeded, failed, errored, ignored
        )
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e))
        })?;
        fs::write(path, json)
    }
}
