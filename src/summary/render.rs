//! Plain-text table rendering of test results

use settings_assert_engine::render_value;

use super::aggregator::TestResult;

const NAME_HEADER: &str = "Test";
const VERDICT_HEADER: &str = "Result";

/// Render a `Test | Result` table.
///
/// FAILED and ERROR rows are followed by their mismatches (in path order),
/// the error message and the test's hints.
pub fn render_table(results: &[TestResult]) -> String {
    let name_width = results
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once(NAME_HEADER.len()))
        .max()
        .unwrap_or(NAME_HEADER.len());

    let mut out = String::new();
    out.push_str(&format!("{:<width$} | {}\n", NAME_HEADER, VERDICT_HEADER, width = name_width));
    out.push_str(&format!("{}-+-{}\n", "-".repeat(name_width), "-".repeat(7)));

    for result in results {
        out.push_str(&format!("{:<width$} | {}\n", result.name, result.verdict, width = name_width));

        if !result.verdict.is_failure() {
            continue;
        }
        for (path, mismatch) in &result.mismatches {
            out.push_str(&format!(
                "   - {} should be {} (currently {})\n",
                path,
                render_value(&mismatch.desired),
                mismatch.current
            ));
        }
        if let Some(error) = &result.error {
            out.push_str(&format!("   - {}\n", error));
        }
        for hint in &result.hints {
            out.push_str(&format!("   > {}\n", hint));
        }
    }

    out
}
