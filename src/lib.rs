//! Repository settings assertions
//!
//! Checks a live GitHub repository against a declarative settings document.
//! Each test in the document fetches one API path and compares the response
//! with an expected tree (`json`) or an expected set of items (`array`).

pub mod config;
pub mod run;
pub mod summary;
pub mod target;

pub use config::{ConfigError, LoaderConfig, Settings, SettingsSource, TestSpec};
pub use run::{RunError, RunOptions, Runner};
pub use summary::{render_table, ResultAggregator, RunSummary, TestResult, Verdict};
pub use target::{Target, TargetError};
