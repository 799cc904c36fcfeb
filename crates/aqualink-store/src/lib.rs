//! Local persistence for AquaLink.
//!
//! The API client keeps two kinds of data on the device: cached API responses
//! and the logged-in session. Both go through the byte-oriented [`Store`]
//! trait, so the backend can be swapped without touching the client.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local, used in tests and for `--ephemeral` runs
//! - [`FileStore`]: one file per key inside a data directory
//! - `RocksStore`: `RocksDB`, behind the `rocksdb-backend` feature
//!
//! # Example
//!
//! ```no_run
//! use aqualink_store::{FileStore, Store};
//!
//! let store = FileStore::open("/tmp/aqualink").unwrap();
//! store.set("aqualink:matricula", b"000012345").unwrap();
//! assert_eq!(store.get("aqualink:matricula").unwrap().as_deref(), Some(&b"000012345"[..]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

/// Key-value persistence used by the response cache and the session store.
///
/// Values are opaque bytes; callers own the encoding. Implementations must be
/// safe to share across tasks. Concurrent writes to the same key are
/// last-writer-wins.
pub trait Store: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}
