//! Declarative assertion engine for settings documents.
//!
//! The engine resolves `<placeholder>` tokens in a settings document, folds
//! the document's `defaults` region into its siblings, and compares expected
//! trees against live data, producing path-keyed mismatch records.
//!
//! Nothing here performs I/O; fetching and rendering live with the callers.

mod compare;
mod membership;
mod merge;
mod mismatch;
mod substitute;

pub use compare::{compare, values_equal};
pub use membership::compare_membership;
pub use merge::{apply_defaults, merge_defaults};
pub use mismatch::{render_value, Current, Mismatch, Mismatches};
pub use substitute::{substitute, Resolver, SubstituteError, DEFAULTS_KEY};
