//! File-backed storage implementation.
//!
//! Each key is one file in the data directory; the file name is the key run
//! through [`keys::file_name`]. Each write goes to its own temporary file in
//! the same directory and is renamed into place, so a reader never sees a
//! half-written value and concurrent writers are last-writer-wins.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::keys;
use crate::Store;

/// Directory-backed store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(path = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// The directory this store writes to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(keys::file_name(key))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match std::fs::read(self.entry_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.entry_path(key);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn roundtrip_through_disk() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("aqualink:matricula", b"000012345").unwrap();
        assert_eq!(
            store.get("aqualink:matricula").unwrap(),
            Some(b"000012345".to_vec())
        );

        // A second handle on the same directory sees the value.
        let reopened = FileStore::open(dir.path()).unwrap();
        assert!(reopened.get("aqualink:matricula").unwrap().is_some());

        store.remove("aqualink:matricula").unwrap();
        assert!(reopened.get("aqualink:matricula").unwrap().is_none());
    }

    #[test]
    fn missing_key_is_none_and_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();
        assert!(store.get("absent").unwrap().is_none());
        store.remove("absent").unwrap();
    }

    #[test]
    fn concurrent_writers_never_tear_values() {
        const WRITERS: u8 = 6;
        const ROUNDS: usize = 50;
        const SIZE: usize = 256 * 1024;

        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("k", &vec![0; SIZE]).unwrap();

        let done = std::sync::atomic::AtomicBool::new(false);
        std::thread::scope(|scope| {
            let writers: Vec<_> = (1..=WRITERS)
                .map(|id| {
                    let store = &store;
                    scope.spawn(move || {
                        let value = vec![id; SIZE];
                        for _ in 0..ROUNDS {
                            store.set("k", &value).unwrap();
                        }
                    })
                })
                .collect();

            let reader = scope.spawn(|| {
                while !done.load(std::sync::atomic::Ordering::Relaxed) {
                    let value = store.get("k").unwrap().unwrap();
                    assert_eq!(value.len(), SIZE);
                    assert!(value.iter().all(|b| *b == value[0]), "torn value");
                }
            });

            for writer in writers {
                writer.join().unwrap();
            }
            done.store(true, std::sync::atomic::Ordering::Relaxed);
            reader.join().unwrap();
        });

        let last = store.get("k").unwrap().unwrap();
        assert!((1..=WRITERS).contains(&last[0]));

        // No temporary files are left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn keys_cannot_escape_directory() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.set("../outside", b"x").unwrap();
        assert!(!dir.path().parent().unwrap().join("outside").exists());
        assert_eq!(store.get("../outside").unwrap(), Some(b"x".to_vec()));
    }
}
