//! Runtime configuration, loadable from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::{width_for_block_limit, DEFAULT_BLOCK_LIMIT};
use crate::error::ConfigError;

/// Settings for creating or loading a map. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Master seed of the noise factory.
    pub seed: u64,
    /// Half extent of the world in blocks.
    pub block_limit: i32,
    /// Directory holding map blobs.
    pub save_directory: PathBuf,
    /// Blob to load and store. Without one the map is always generated and not saved.
    pub blob_name: Option<String>,
    /// Directory for debug images. Without one no images are written.
    pub export_directory: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            block_limit: DEFAULT_BLOCK_LIMIT,
            save_directory: PathBuf::from("saves"),
            blob_name: Some("map".to_string()),
            export_directory: None,
        }
    }
}

impl MapConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Grid width for the configured block limit.
    pub fn width(&self) -> usize {
        width_for_block_limit(self.block_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MapConfig::from_json(r#"{ "seed": 7, "export_directory": "out" }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.block_limit, DEFAULT_BLOCK_LIMIT);
        assert_eq!(config.export_directory, Some(PathBuf::from("out")));
        assert_eq!(config.width(), 502);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(MapConfig::from_json("{ seed: }"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("map.json");
        fs::write(&path, r#"{ "block_limit": 1000, "blob_name": null }"#).unwrap();

        let config = MapConfig::load(&path).unwrap();
        assert_eq!(config.block_limit, 1000);
        assert_eq!(config.blob_name, None);
        assert_eq!(config.width(), 12);
    }
}
