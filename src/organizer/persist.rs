//! Blob persistence behind the organizer.
//!
//! The store is one opaque string under one key; backends only move bytes.
//! [`FileBlobStore`] keeps each key as a JSON file under a data directory,
//! [`MemoryBlobStore`] backs tests.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::common::collections::HashMap;

/// Key the folder store is persisted under.
pub const STORE_KEY: &str = "accshift_folders";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("blob i/o failed: {0}")]
    Io(#[from] io::Error),
}

pub trait BlobStore {
    /// Read the blob stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// File-backed store: one `<key>.json` per key under `root`.
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn blob_path(&self, key: &str) -> PathBuf { self.root.join(format!("{key}.json")) }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.blob_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.blob_path(key), value)?;
        Ok(())
    }
}

/// In-memory store for tests. Counts writes so tests can assert how many
/// flushes an operation produced.
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryBlobStore {
    pub fn new() -> Self { Self::default() }

    /// Number of `set` calls served so far.
    pub fn writes(&self) -> usize { self.writes }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.writes += 1;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
