//! Per-test verdicts and exit codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exit code for configuration errors that abort the run
pub const FATAL_EXIT_CODE: i32 = 255;

/// Failure counts above this are clamped so they never read as fatal or wrap to 0
pub const MAX_FAILURE_EXIT_CODE: i32 = 254;

/// Outcome of one test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// Fetching the live data failed; nothing was compared
    Error,
    /// The comparison found at least one mismatch
    Failed,
    /// The comparison found no mismatches
    Success,
    /// The test is marked `ignore`; nothing was fetched
    Ignored,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Error => "ERROR",
            Verdict::Failed => "FAILED",
            Verdict::Success => "SUCCESS",
            Verdict::Ignored => "IGNORED",
        }
    }

    /// Counts towards the exit status
    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Error | Verdict::Failed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_verdicts() {
        assert!(Verdict::Error.is_failure());
        assert!(Verdict::Failed.is_failure());
        assert!(!Verdict::Success.is_failure());
        assert!(!Verdict::Ignored.is_failure());
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&Verdict::Failed).unwrap(), r#""FAILED""#);
        let parsed: Verdict = serde_json::from_str(r#""IGNORED""#).unwrap();
        assert_eq!(parsed, Verdict::Ignored);
    }

    #[test]
    fn test_display() {
        let names: Vec<String> = [Verdict::Error, Verdict::Failed, Verdict::Success, Verdict::Ignored]
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(names, vec!["ERROR", "FAILED", "SUCCESS", "IGNORED"]);
    }
}
