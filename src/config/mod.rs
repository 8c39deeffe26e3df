//! Settings documents
//!
//! Loads the layered desired-state document and turns it into test specs:
//! 1. Project settings (`<workspace>/.repository-settings.yaml`)
//! 2. Global settings (`<config-dir>/default-repository-settings.yaml`)
//!
//! The first file to define a top-level key wins. The combined document is
//! then placeholder-resolved and its `defaults` region merged in.

mod loader;
mod settings;
mod test_spec;

pub use loader::{
    load_documents, parse_document, LoadedDocument, LoaderConfig,
    SettingsOrigin, SettingsSource, DEFAULT_CONFIG_DIR, GLOBAL_SETTINGS_FILE,
    PROJECT_SETTINGS_FILE,
};
pub use settings::Settings;
pub use test_spec::{Assertion, Binding, Prerequisite, TestSpec};

use settings_assert_engine::SubstituteError;
use std::io;
use std::path::PathBuf;

/// Configuration errors. All of them abort the run before any test executes.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse YAML in {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Settings in {origin} must be a mapping at the top level")]
    NotAMapping { origin: String },

    #[error("No settings found (looked in {searched})")]
    EmptyDocument { searched: String },

    #[error("Substitution failed: {0}")]
    Substitute(#[from] SubstituteError),

    #[error("'tests' must be a mapping of test name to test spec")]
    InvalidTests,

    #[error("Invalid test '{name}': {reason}")]
    InvalidTestSpec { name: String, reason: String },
}
