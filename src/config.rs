use crate::error::ConfigError;
use crate::world::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_HEIGHT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for the schematic library and command surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchematicsConfig {
    /// Directory holding `<name>.<extension>` files
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,
    /// File extension without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Entries per `list` page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub world: WorldSettings,
}

/// Shape of the world the tool creates when no host world is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSettings {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i32,
    #[serde(default = "default_max_height")]
    pub max_height: i32,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("Schematics")
}
fn default_extension() -> String {
    "schematic".to_string()
}
fn default_page_size() -> usize {
    9
}
fn default_chunk_size() -> i32 {
    DEFAULT_CHUNK_SIZE
}
fn default_max_height() -> i32 {
    DEFAULT_MAX_HEIGHT
}

impl Default for SchematicsConfig {
    fn default() -> Self {
        SchematicsConfig {
            storage_root: default_storage_root(),
            extension: default_extension(),
            page_size: default_page_size(),
            world: WorldSettings::default(),
        }
    }
}

impl Default for WorldSettings {
    fn default() -> Self {
        WorldSettings {
            chunk_size: default_chunk_size(),
            max_height: default_max_height(),
        }
    }
}

impl SchematicsConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_storage_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.storage_root = root.into();
        self
    }
}
