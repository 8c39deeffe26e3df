//! Verdicts, result aggregation and run summaries
//!
//! One verdict is recorded per test; the aggregate decides the exit status.

mod aggregator;
mod render;
mod run_summary;
mod verdict;

pub use aggregator::{ResultAggregator, TestResult};
pub use render::render_table;
pub use run_summary::{RunSummary, RUN_SUMMARY_SCHEMA_ID, RUN_SUMMARY_SCHEMA_VERSION};
pub use verdict::{Verdict, FATAL_EXIT_CODE, MAX_FAILURE_EXIT_CODE};
