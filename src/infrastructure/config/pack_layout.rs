//! Resolution of the behavior/resource pack directory names from `config.json`

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::infrastructure::paths::map_pack_reference;

pub const DEFAULT_BEHAVIOR_PACK: &str = "BP";
pub const DEFAULT_RESOURCE_PACK: &str = "RP";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Non-fatal failures while reading the project configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not found in project root")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// Root directory names of the two content trees, as they appear in the
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackLayout {
    pub behavior_pack_dir: String,
    pub resource_pack_dir: String,
}

impl Default for PackLayout {
    fn default() -> Self {
        Self {
            behavior_pack_dir: DEFAULT_BEHAVIOR_PACK.to_string(),
            resource_pack_dir: DEFAULT_RESOURCE_PACK.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProjectConfig {
    #[serde(default)]
    packs: Option<PacksSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PacksSection {
    #[serde(default)]
    behavior_pack: Option<serde_json::Value>,
    #[serde(default)]
    resource_pack: Option<serde_json::Value>,
}

impl PackLayout {
    /// Reads `config.json` under `project_root`, falling back to `BP`/`RP`
    /// with a warning when it is missing or malformed.
    pub fn from_project_root(project_root: &Path) -> Self {
        match Self::try_from_project_root(project_root) {
            Ok(layout) => layout,
            Err(ConfigError::NotFound(name)) => {
                warn!("{name} not found in project root; using defaults BP/RP");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read packs from config.json; using defaults BP/RP");
                Self::default()
            }
        }
    }

    pub fn try_from_project_root(project_root: &Path) -> Result<Self, ConfigError> {
        let config_path = project_root.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(ConfigError::NotFound(CONFIG_FILE_NAME.to_string()));
        }

        let raw = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.display().to_string(),
            source,
        })?;

        Self::parse(&raw).map_err(|message| ConfigError::Parse {
            path: config_path.display().to_string(),
            message,
        })
    }

    /// Parses a JSON5 project configuration document.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let config: ProjectConfig = json5::from_str(raw).map_err(|e| e.to_string())?;
        let packs = config.packs.unwrap_or_default();

        let layout = Self {
            behavior_pack_dir: pack_dir(packs.behavior_pack.as_ref(), DEFAULT_BEHAVIOR_PACK),
            resource_pack_dir: pack_dir(packs.resource_pack.as_ref(), DEFAULT_RESOURCE_PACK),
        };
        debug!(?layout, "Resolved pack layout from config");
        Ok(layout)
    }
}

fn pack_dir(raw: Option<&serde_json::Value>, default: &str) -> String {
    raw.and_then(|value| value.as_str())
        .and_then(map_pack_reference)
        .unwrap_or_else(|| default.to_string())
}
