//! The repository under verification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("Repository must be given as owner/repo, got '{0}'")]
    InvalidFormat(String),
}

/// An `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub owner: String,
    pub repo: String,
}

impl Target {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Replace `{owner}` and `{repo}` in a test name or path template.
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{owner}", &self.owner)
            .replace("{repo}", &self.repo)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for Target {
    type Err = TargetError;

    /// Splits at the first `/`; both halves must be non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
                Ok(Self::new(owner, repo))
            }
            _ => Err(TargetError::InvalidFormat(s.to_string())),
        }
    }
}
