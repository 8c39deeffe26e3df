//! Layered settings loading with provenance
//!
//! Every contributing file is recorded with its origin, path and the
//! SHA-256 digest of its raw bytes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ConfigError;

/// Project settings file name, looked up in the workspace
pub const PROJECT_SETTINGS_FILE: &str = ".repository-settings.yaml";

/// Global settings file name, looked up in the config directory
pub const GLOBAL_SETTINGS_FILE: &str = "default-repository-settings.yaml";

/// Default global config directory
pub const DEFAULT_CONFIG_DIR: &str = "/etc/repository-settings";

/// Where a settings file sits in the layering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Project,
    Global,
}

/// A contributing settings file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsSource {
    /// Layer this file was loaded into
    pub origin: SettingsOrigin,

    /// File path as given
    pub path: String,

    /// SHA-256 digest of raw file bytes
    pub digest: String,
}

/// Locations of the two settings layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Project-local settings (highest precedence)
    pub project_path: PathBuf,

    /// Global fallback settings
    pub global_path: PathBuf,
}

impl LoaderConfig {
    /// Standard file names inside a workspace and a config directory
    pub fn from_dirs(workspace: &Path, config_dir: &Path) -> Self {
        Self {
            project_path: workspace.join(PROJECT_SETTINGS_FILE),
            global_path: config_dir.join(GLOBAL_SETTINGS_FILE),
        }
    }

    fn layers(&self) -> [(SettingsOrigin, &Path); 2] {
        [
            (SettingsOrigin::Project, self.project_path.as_path()),
            (SettingsOrigin::Global, self.global_path.as_path()),
        ]
    }
}

/// The raw layered document with the files it came from
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: Map<String, Value>,
    pub sources: Vec<SettingsSource>,
}

/// Load and layer the settings files.
///
/// Missing files are skipped. Per top-level key, the first file to define it
/// wins. Nothing found at all is an error.
pub fn load_documents(config: &LoaderConfig) -> Result<LoadedDocument, ConfigError> {
    let mut document = Map::new();
    let mut sources = Vec::new();

    for (origin, path) in config.layers() {
        let Some((layer, digest)) = load_file(path)? else {
            debug!(path = %path.display(), "settings file not found, skipping");
            continue;
        };
        debug!(path = %path.display(), ?origin, "using settings");

        for (key, value) in layer {
            document.entry(key).or_insert(value);
        }
        sources.push(SettingsSource {
            origin,
            path: path.to_string_lossy().to_string(),
            digest,
        });
    }

    if document.is_empty() {
        return Err(ConfigError::EmptyDocument {
            searched: format!(
                "{}, {}",
                config.project_path.display(),
                config.global_path.display()
            ),
        });
    }

    Ok(LoadedDocument { document, sources })
}

/// Read one settings file, returning its mapping and digest; `None` if absent.
fn load_file(path: &Path) -> Result<Option<(Map<String, Value>, String)>, ConfigError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let origin = path.display().to_string();
    let contents = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
        origin: origin.clone(),
        message: format!("Invalid UTF-8: {}", e),
    })?;

    let document = parse_document(&contents, &origin)?;
    Ok(Some((document, digest)))
}

/// Parse YAML settings text into a top-level mapping.
///
/// Blank documents parse as an empty mapping. `origin` labels errors.
pub fn parse_document(contents: &str, origin: &str) -> Result<Map<String, Value>, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(Map::new());
    }

    let value = serde_yaml::from_str::<Value>(contents).map_err(|e| ConfigError::Parse {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(ConfigError::NotAMapping {
            origin: origin.to_string(),
        }),
    }
}
