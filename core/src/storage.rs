//! Document store on RocksDB.
//!
//! Each collection lives in its own column family and holds JSON documents
//! keyed by a string id:
//! - `light_usage`: room name -> `LightUsage`
//! - `temperature`: `<city>/<timestamp>` -> `WeatherSnapshot`
//! - `users`: user id -> `User`
//! - `passwords`: user id -> password hash record
//! - `sessions`: token -> `Session`

use crate::{CasaError, Result};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub const CF_LIGHT_USAGE: &str = "light_usage";
pub const CF_TEMPERATURE: &str = "temperature";
pub const CF_USERS: &str = "users";
pub const CF_PASSWORDS: &str = "passwords";
pub const CF_SESSIONS: &str = "sessions";

const COLLECTIONS: [&str; 5] = [
    CF_LIGHT_USAGE,
    CF_TEMPERATURE,
    CF_USERS,
    CF_PASSWORDS,
    CF_SESSIONS,
];

/// Persistent storage using RocksDB
pub struct Storage {
    db: DB,
}

impl Storage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = COLLECTIONS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| CasaError::StorageError(e.to_string()))?;

        info!(target: "storage", "Storage initialized");
        Ok(Arc::new(Self { db }))
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| CasaError::StorageError(format!("Unknown collection: {}", name)))
    }

    /// Store a document
    pub fn put<V: Serialize>(&self, collection: &str, key: &str, value: &V) -> Result<()> {
        let serialized = serde_json::to_vec(value)?;
        self.db
            .put_cf(self.cf(collection)?, key.as_bytes(), serialized)
            .map_err(|e| CasaError::StorageError(e.to_string()))
    }

    /// Get a document by key
    pub fn get<V: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<V>> {
        match self.db.get_cf(self.cf(collection)?, key.as_bytes()) {
            Ok(Some(data)) => {
                let value = serde_json::from_slice(&data)?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(CasaError::StorageError(e.to_string())),
        }
    }

    /// Delete a document
    pub fn delete(&self, collection: &str, key: &str) -> Result<()> {
        self.db
            .delete_cf(self.cf(collection)?, key.as_bytes())
            .map_err(|e| CasaError::StorageError(e.to_string()))
    }

    /// All documents of a collection in key order
    pub fn scan<V: DeserializeOwned>(&self, collection: &str) -> Result<Vec<(String, V)>> {
        self.scan_from(collection, IteratorMode::Start, |_| true)
    }

    /// Documents whose key starts with `prefix`, in key order
    pub fn scan_prefix<V: DeserializeOwned>(
        &self,
        collection: &str,
        prefix: &str,
    ) -> Result<Vec<(String, V)>> {
        let mode = IteratorMode::From(prefix.as_bytes(), Direction::Forward);
        self.scan_from(collection, mode, |key| key.starts_with(prefix.as_bytes()))
    }

    fn scan_from<V: DeserializeOwned>(
        &self,
        collection: &str,
        mode: IteratorMode,
        keep: impl Fn(&[u8]) -> bool,
    ) -> Result<Vec<(String, V)>> {
        let mut documents = Vec::new();
        for item in self.db.iterator_cf(self.cf(collection)?, mode) {
            let (key, value) = item.map_err(|e| CasaError::StorageError(e.to_string()))?;
            if !keep(&key) {
                break;
            }
            let key = String::from_utf8_lossy(&key).into_owned();
            documents.push((key, serde_json::from_slice(&value)?));
        }
        Ok(documents)
    }

    /// Remove every document of a collection, returning how many were removed
    pub fn clear(&self, collection: &str) -> Result<usize> {
        let cf = self.cf(collection)?;
        let mut batch = WriteBatch::default();
        let mut removed = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _) = item.map_err(|e| CasaError::StorageError(e.to_string()))?;
            batch.delete_cf(cf, key);
            removed += 1;
        }
        self.db
            .write(batch)
            .map_err(|e| CasaError::StorageError(e.to_string()))?;

        debug!(target: "storage", collection = %collection, removed, "Collection cleared");
        Ok(removed)
    }

    /// Batch put operation
    pub fn batch_put<V: Serialize>(&self, collection: &str, items: Vec<(String, V)>) -> Result<()> {
        let cf = self.cf(collection)?;
        let mut batch = WriteBatch::default();
        for (key, value) in items {
            let serialized = serde_json::to_vec(&value)?;
            batch.put_cf(cf, key.as_bytes(), serialized);
        }
        self.db
            .write(batch)
            .map_err(|e| CasaError::StorageError(e.to_string()))
    }
}
