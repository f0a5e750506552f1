//! Filesystem-backed stores.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/<key>.json      key-value documents
//! <data_dir>/vault/<id>.bin  vault file bytes
//! ```
//!
//! All IO here is blocking `std::fs`; the app runs one session on one thread.

use calcvault_engine::{BlobStore, Error, KeyValueStore, RecordId};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const VAULT_DIR: &str = "vault";

/// Key-value and blob storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(VAULT_DIR))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, Error> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
        if !valid {
            return Err(Error::Storage(format!("invalid key: {key:?}")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }

    fn blob_path(&self, id: RecordId) -> PathBuf {
        self.root.join(VAULT_DIR).join(format!("{id}.bin"))
    }
}

fn storage_error(path: &Path, err: io::Error) -> Error {
    Error::Storage(format!("{}: {}", path.display(), err))
}

/// Write through a temporary file so a crash never leaves half a document.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(|e| storage_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| storage_error(path, e))
}

fn remove_if_present(path: &Path) -> Result<(), Error> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(storage_error(path, e)),
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&path, e)),
        }
    }

    fn put_raw(&mut self, key: &str, json: String) -> Result<(), Error> {
        let path = self.key_path(key)?;
        write_atomic(&path, json.as_bytes())
    }

    fn remove(&mut self, key: &str) -> Result<(), Error> {
        let path = self.key_path(key)?;
        remove_if_present(&path)
    }
}

impl BlobStore for FileStore {
    fn put(&mut self, id: RecordId, bytes: &[u8]) -> Result<(), Error> {
        write_atomic(&self.blob_path(id), bytes)
    }

    fn get(&self, id: RecordId) -> Result<Vec<u8>, Error> {
        let path = self.blob_path(id);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::BlobNotFound(id)),
            Err(e) => Err(storage_error(&path, e)),
        }
    }

    fn delete(&mut self, id: RecordId) -> Result<(), Error> {
        remove_if_present(&self.blob_path(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_layout() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("data");
        let store = FileStore::open(&root).unwrap();
        assert!(root.join("vault").is_dir());
        assert_eq!(store.root(), root.as_path());
    }

    #[test]
    fn documents_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get_raw("calcvault_state").unwrap(), None);
        store.put_raw("calcvault_state", "{\"a\":1}".into()).unwrap();
        assert_eq!(
            store.get_raw("calcvault_state").unwrap().as_deref(),
            Some("{\"a\":1}")
        );
        assert!(dir.path().join("calcvault_state.json").is_file());
        assert!(!dir.path().join("calcvault_state.tmp").exists());

        store.remove("calcvault_state").unwrap();
        store.remove("calcvault_state").unwrap();
        assert_eq!(store.get_raw("calcvault_state").unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.put_raw("../escape", "1".into()),
            Err(Error::Storage(_))
        ));
        assert!(store.get_raw("").is_err());
    }

    #[test]
    fn blobs_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();

        BlobStore::put(&mut store, 7, b"payload").unwrap();
        assert_eq!(BlobStore::get(&store, 7).unwrap(), b"payload");
        assert!(dir.path().join("vault/7.bin").is_file());

        BlobStore::delete(&mut store, 7).unwrap();
        assert_eq!(BlobStore::get(&store, 7), Err(Error::BlobNotFound(7)));
        BlobStore::delete(&mut store, 7).unwrap();
    }
}
