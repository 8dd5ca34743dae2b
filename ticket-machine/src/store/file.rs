//! Disk-backed stores.
//!
//! Each store is a single JSON file. Replacing it writes a sibling temporary
//! file and renames it over the old one, so a reader sees either the old
//! contents or the new, never a half-written file.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{PricingDetails, Station};

use super::{PricingStore, StationStore, StoreError};

/// Stored data with the time it was written.
#[derive(Debug, Serialize, Deserialize)]
struct Stored<T> {
    /// Unix timestamp when the file was written.
    stored_at_secs: u64,
    data: T,
}

/// A JSON file replaced atomically.
#[derive(Debug, Clone)]
struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, e: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }

    /// Read the file. Returns `None` if it doesn't exist yet.
    fn read<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let stored: Stored<T> = serde_json::from_str(&contents).map_err(|e| StoreError::Json {
            message: format!("failed to parse {}: {}", self.path.display(), e),
        })?;

        Ok(Some(stored.data))
    }

    /// Replace the file contents.
    ///
    /// Creates parent directories if they don't exist.
    fn write<T: Serialize>(&self, data: &T) -> Result<(), StoreError> {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let stored = Stored {
            stored_at_secs: now,
            data,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(&stored).map_err(|e| StoreError::Json {
            message: format!("failed to serialize: {}", e),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            self.io_error(e)
        })?;

        Ok(())
    }
}

/// Station store persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct FileStationStore {
    file: JsonFile,
}

impl FileStationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

impl StationStore for FileStationStore {
    fn replace_all(&self, stations: &[Station]) -> Result<(), StoreError> {
        self.file.write(&stations)
    }

    fn load(&self) -> Result<Vec<Station>, StoreError> {
        Ok(self.file.read()?.unwrap_or_default())
    }
}

/// Fare table store persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct FilePricingStore {
    file: JsonFile,
}

impl FilePricingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

impl PricingStore for FilePricingStore {
    fn replace_all(&self, details: &PricingDetails) -> Result<(), StoreError> {
        self.file.write(details)
    }

    fn load(&self) -> Result<Option<PricingDetails>, StoreError> {
        self.file.read()
    }
}
