//! Map persistence.
//!
//! A map is stored as one named blob: a bincode-encoded record holding the
//! format version, the grid width and the flat row-major cell array.
//! Blobs live in a [`BlobStore`]; the directory store keeps one
//! `{name}.bin` file per blob.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::data::{MapData, CURRENT_VERSION};
use crate::error::StorageError;

/// Named byte blobs.
pub trait BlobStore: Send + Sync {
    /// Read a blob. Returns `None` if no blob with that name exists.
    fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Create or replace a blob.
    fn write_blob(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Stores blobs as files in a directory.
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.bin"))
    }
}

impl BlobStore for DirectoryBlobStore {
    fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.blob_path(name);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(path)?))
    }

    fn write_blob(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        // Write next to the target and rename so a crash never leaves half a blob.
        let path = self.blob_path(name);
        let partial = path.with_extension("bin.partial");
        {
            let mut file = fs::File::create(&partial)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(partial, path)?;

        Ok(())
    }
}

/// Keeps blobs in memory.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryBlobStore {
    fn read_blob(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(name).cloned())
    }

    fn write_blob(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

// =============================================================================
// ENCODING
// =============================================================================

#[derive(Deserialize)]
struct BlobHeader {
    version: u32,
}

#[derive(Serialize)]
struct MapBlobRef<'a> {
    version: u32,
    width: u32,
    cells: &'a [Cell],
}

#[derive(Deserialize)]
struct MapBlob {
    version: u32,
    width: u32,
    cells: Vec<Cell>,
}

/// Encode a map into blob bytes.
pub fn encode_map(data: &MapData) -> Result<Vec<u8>, StorageError> {
    let blob = MapBlobRef {
        version: CURRENT_VERSION,
        width: data.width() as u32,
        cells: data.cells().as_slice(),
    };
    bincode::serialize(&blob).map_err(|e| StorageError::Encode(e.to_string()))
}

/// Decode blob bytes into a map that must be `expected_width` cells wide.
pub fn decode_map(bytes: &[u8], expected_width: usize) -> Result<MapData, StorageError> {
    let header: BlobHeader = bincode::deserialize(bytes).map_err(|e| StorageError::Decode(e.to_string()))?;
    if header.version != CURRENT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: header.version,
            supported: CURRENT_VERSION,
        });
    }

    let blob: MapBlob = bincode::deserialize(bytes).map_err(|e| StorageError::Decode(e.to_string()))?;
    debug_assert_eq!(blob.version, header.version);

    let width = blob.width as usize;
    if width != expected_width {
        return Err(StorageError::SizeMismatch {
            expected: expected_width,
            found: width,
        });
    }

    let count = blob.cells.len();
    MapData::from_cells(width, blob.cells)
        .ok_or_else(|| StorageError::Decode(format!("{count} cells do not fill a {width}x{width} grid")))
}

/// Encode `data` and write it under `name`.
pub fn save_map(store: &dyn BlobStore, name: &str, data: &MapData) -> Result<(), StorageError> {
    let bytes = encode_map(data)?;
    store.write_blob(name, &bytes)?;
    tracing::debug!(name, bytes = bytes.len(), "Stored map blob");
    Ok(())
}

/// Read and decode the blob `name`. Returns `None` if it does not exist.
pub fn load_map(store: &dyn BlobStore, name: &str, expected_width: usize) -> Result<Option<MapData>, StorageError> {
    match store.read_blob(name)? {
        Some(bytes) => decode_map(&bytes, expected_width).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Conditions, StoneType};
    use tempfile::TempDir;

    fn sample_map() -> MapData {
        let mut data = MapData::new(4);
        for (x, y, cell) in data.cells_mut().iter_mut() {
            cell.height = x as f32 * 0.1 - y as f32 * 0.05;
            cell.continent = (x + y) as i16;
            cell.temperature = 0.25;
            cell.humidity = 0.75;
        }
        let cell = data.cell_mut(1, 2);
        cell.conditions = Conditions::RIFT | Conditions::CLIFF_WEST;
        cell.stone_type = StoneType::Marble;
        data
    }

    #[test]
    fn test_directory_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryBlobStore::new(dir.path().join("maps"));
        let data = sample_map();

        save_map(&store, "world", &data).unwrap();
        assert!(dir.path().join("maps").join("world.bin").exists());

        let loaded = load_map(&store, "world", 4).unwrap();
        assert_eq!(loaded, Some(data));
    }

    #[test]
    fn test_missing_blob_is_none() {
        let dir = TempDir::new().unwrap();
        let store = DirectoryBlobStore::new(dir.path());
        assert!(load_map(&store, "nothing", 4).unwrap().is_none());

        let memory = MemoryBlobStore::new();
        assert!(load_map(&memory, "nothing", 4).unwrap().is_none());
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let data = sample_map();
        let mut bytes = encode_map(&data).unwrap();
        // version is the leading little-endian u32
        bytes[..4].copy_from_slice(&(CURRENT_VERSION + 1).to_le_bytes());

        match decode_map(&bytes, 4) {
            Err(StorageError::UnsupportedVersion { found, supported }) => {
                assert_eq!(found, CURRENT_VERSION + 1);
                assert_eq!(supported, CURRENT_VERSION);
            }
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let bytes = encode_map(&sample_map()).unwrap();
        assert!(matches!(
            decode_map(&bytes, 6),
            Err(StorageError::SizeMismatch { expected: 6, found: 4 })
        ));
    }

    #[test]
    fn test_truncated_blob_is_decode_error() {
        let bytes = encode_map(&sample_map()).unwrap();
        assert!(matches!(decode_map(&bytes[..bytes.len() / 2], 4), Err(StorageError::Decode(_))));
        assert!(matches!(decode_map(&[], 4), Err(StorageError::Decode(_))));
    }

    #[test]
    fn test_memory_store_overwrites() {
        let store = MemoryBlobStore::new();
        store.write_blob("a", &[1, 2, 3]).unwrap();
        store.write_blob("a", &[4]).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.read_blob("a").unwrap(), Some(vec![4]));
    }
}
