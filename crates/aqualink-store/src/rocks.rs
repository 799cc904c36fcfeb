//! `RocksDB` storage implementation.
//!
//! All keys live in a single column family; the response cache and the
//! session share one database.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options};

use crate::error::{Result, StoreError};
use crate::Store;

/// Column family holding every AquaLink key.
pub const CF_ENTRIES: &str = "entries";

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(CF_ENTRIES, Options::default())];

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(CF_ENTRIES)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {CF_ENTRIES}")))
    }
}

impl Store for RocksStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf()?;
        self.db
            .get_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let cf = self.cf()?;
        self.db
            .put_cf(&cf, key.as_bytes(), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let cf = self.cf()?;
        self.db
            .delete_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
