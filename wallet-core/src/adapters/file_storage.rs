//! File-backed key-value storage
//!
//! Each key is stored as `persist-<key>.json` in the wallet directory.
//! Writes go to a temp file in the same directory and are renamed into
//! place, so a crash mid-write leaves the previous value intact. All access
//! is serialized across processes with an exclusive lock on `.storage.lock`.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::KeyValueStorage;

const LOCK_FILE: &str = ".storage.lock";

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

/// Held for the duration of one storage operation
struct StorageLock {
    file: File,
}

impl Drop for StorageLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl FileStorage {
    /// Open storage rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("persist-{}.json", key)))
    }

    fn lock(&self) -> Result<StorageLock> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;
        file.lock_exclusive()
            .map_err(|e| Error::storage(format!("Failed to lock storage: {}", e)))?;
        Ok(StorageLock { file })
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        let _lock = self.lock()?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _lock = self.lock()?;

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&path)
            .map_err(|e| Error::storage(format!("Failed to replace {}: {}", path.display(), e)))?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _lock = self.lock()?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
