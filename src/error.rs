//! Error types for generation, persistence, configuration and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort map generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("pieces noise produced {count} distinct values, more than the {max} piece ids available")]
    TooManyPieces { count: usize, max: usize },
}

/// Failures reading or writing a persisted map.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("blob I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("blob encoding failed: {0}")]
    Encode(String),

    #[error("blob decoding failed: {0}")]
    Decode(String),

    #[error("blob has format version {found}, only up to {supported} is supported")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("blob holds a {found}-wide grid, expected {expected}")]
    SizeMismatch { expected: usize, found: usize },
}

/// Failures of the map lifecycle operations.
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("map has not been generated or loaded")]
    NotInitialized,
}

/// Failure of a single debug image.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not prepare output directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("export task failed: {0}")]
    Join(String),
}

/// Failure loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
