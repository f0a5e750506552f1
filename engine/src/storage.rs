//! Storage seams.
//!
//! The engine never touches the filesystem. Hosts implement
//! [`KeyValueStore`] for JSON documents and [`BlobStore`] for vault file
//! bytes; the in-memory versions here back tests and embedded hosts.

use crate::{error::Result, Error, RecordId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Key-value storage of JSON documents.
pub trait KeyValueStore {
    /// Read the raw JSON stored under `key`.
    fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Store raw JSON under `key`, replacing any previous value.
    fn put_raw(&mut self, key: &str, json: String) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Read and deserialize the value under `key`.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.get_raw(key)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| Error::Storage(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Serialize and store `value` under `key`.
    fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value).map_err(|e| Error::Storage(e.to_string()))?;
        self.put_raw(key, json)
    }
}

/// Storage of vault file payloads, keyed by record id.
pub trait BlobStore {
    fn put(&mut self, id: RecordId, bytes: &[u8]) -> Result<()>;

    /// Fails with [`Error::BlobNotFound`] for an unknown id.
    fn get(&self, id: RecordId) -> Result<Vec<u8>>;

    /// Deleting a missing blob is not an error.
    fn delete(&mut self, id: RecordId) -> Result<()>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put_raw(&mut self, key: &str, json: String) -> Result<()> {
        self.entries.insert(key.to_string(), json);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// In-memory [`BlobStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<RecordId, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, id: RecordId, bytes: &[u8]) -> Result<()> {
        self.blobs.insert(id, bytes.to_vec());
        Ok(())
    }

    fn get(&self, id: RecordId) -> Result<Vec<u8>> {
        self.blobs.get(&id).cloned().ok_or(Error::BlobNotFound(id))
    }

    fn delete(&mut self, id: RecordId) -> Result<()> {
        self.blobs.remove(&id);
        Ok(())
    }
}
