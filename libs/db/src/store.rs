//! Store: a logical database grouping column families under one directory.
//!
//! A store namespaces column families at `<base>/<store>/<column>`, lazily
//! opening each on first registration. Opening a store discovers and reopens
//! every column-family subdirectory already on disk, so a restart recovers
//! prior column families without re-registration.
//!
//! # Concurrency
//!
//! The name → column-family map is read on every operation and written only
//! on registration, so it sits behind an `RwLock` with a double-checked
//! insert: concurrent registrations of the same name perform exactly one
//! engine open, and the read path never blocks on engine I/O. The engine
//! handles themselves are safe for concurrent use per RocksDB's contract; no
//! extra locking is added around raw engine calls.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::codec;
use crate::column_family::ColumnFamily;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::registry::RegistryInner;

/// A logical database owning one or more column families.
///
/// Obtained from [`Registry::get_store`](crate::Registry::get_store); at most
/// one instance exists per name at any time.
pub struct Store {
    registry: Weak<RegistryInner>,
    name: String,
    path: PathBuf,
    options: Options,
    /// Shared by all of this store's column families.
    block_cache: rocksdb::Cache,
    columns: RwLock<HashMap<String, Arc<ColumnFamily>>>,
    closed: AtomicBool,
}

impl Store {
    /// Ensure the store directory exists and reopen every column-family
    /// subdirectory discovered on disk.
    pub(crate) fn open(
        registry: Weak<RegistryInner>,
        name: &str,
        options: &Options,
    ) -> Result<Self> {
        let path = options.db_path.join(name);
        std::fs::create_dir_all(&path)?;

        let store = Self {
            registry,
            name: name.to_string(),
            path,
            options: options.clone(),
            block_cache: options.engine.create_block_cache(),
            columns: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        };

        let discovered = store.discover_columns()?;
        tracing::info!(store = name, columns = discovered, "Opened store");
        Ok(store)
    }

    /// Store name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding this store's column families.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of currently open column families, sorted.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Idempotently ensure a column family exists and is open for each name.
    ///
    /// Returns the first error encountered; previously-registered names stay
    /// open (no rollback).
    pub fn register_columns(&self, names: &[&str]) -> Result<()> {
        self.ensure_open()?;
        for name in names {
            self.assert_column(name)?;
        }
        Ok(())
    }

    /// Look up the open column family for `name`.
    pub fn column_family(&self, name: &str) -> Result<Arc<ColumnFamily>> {
        self.ensure_open()?;
        self.columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    // =========================================================================
    // Raw access
    // =========================================================================

    /// Raw byte-level write to a registered column.
    pub fn put(&self, column: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.column_family(column)?.write(key, value)
    }

    /// Raw byte-level delete from a registered column.
    pub fn delete(&self, column: &str, key: &[u8]) -> Result<()> {
        self.column_family(column)?.delete(key)
    }

    /// Copy of the stored bytes, or empty if the key is absent.
    pub fn get_bytes(&self, column: &str, key: &[u8]) -> Result<Vec<u8>> {
        Ok(self
            .column_family(column)?
            .get(key)?
            .unwrap_or_default())
    }

    /// Visit `(key, value)` pairs with key >= `from_key` in ascending key
    /// order. The visitor returning `false` stops iteration without error.
    pub fn list<F>(&self, column: &str, from_key: &[u8], visit: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        self.column_family(column)?.list(from_key, visit)
    }

    // =========================================================================
    // Typed access
    //
    // Absent keys yield the type's zero value with no error; not-found is a
    // policy, not a failure, for typed reads.
    // =========================================================================

    /// Write an `i64` as 8 big-endian bytes.
    pub fn put_i64(&self, column: &str, key: &[u8], value: i64) -> Result<()> {
        self.put(column, key, &codec::encode_i64(value))
    }

    /// Read an `i64`, or 0 if the key is absent.
    pub fn get_i64(&self, column: &str, key: &[u8]) -> Result<i64> {
        match self.column_family(column)?.get(key)? {
            Some(data) => codec::decode_i64(&data),
            None => Ok(0),
        }
    }

    /// Write a `u64` as 8 big-endian bytes.
    pub fn put_u64(&self, column: &str, key: &[u8], value: u64) -> Result<()> {
        self.put(column, key, &codec::encode_u64(value))
    }

    /// Read a `u64`, or 0 if the key is absent.
    pub fn get_u64(&self, column: &str, key: &[u8]) -> Result<u64> {
        match self.column_family(column)?.get(key)? {
            Some(data) => codec::decode_u64(&data),
            None => Ok(0),
        }
    }

    /// Write an `f64` as the big-endian bytes of its bit pattern.
    pub fn put_f64(&self, column: &str, key: &[u8], value: f64) -> Result<()> {
        self.put(column, key, &codec::encode_f64(value))
    }

    /// Read an `f64`, or 0.0 if the key is absent.
    pub fn get_f64(&self, column: &str, key: &[u8]) -> Result<f64> {
        match self.column_family(column)?.get(key)? {
            Some(data) => codec::decode_f64(&data),
            None => Ok(0.0),
        }
    }

    /// Write a string as its raw UTF-8 bytes.
    pub fn put_string(&self, column: &str, key: &[u8], value: &str) -> Result<()> {
        self.put(column, key, &codec::encode_str(value))
    }

    /// Read a string, or empty if the key is absent.
    pub fn get_string(&self, column: &str, key: &[u8]) -> Result<String> {
        match self.column_family(column)?.get(key)? {
            Some(data) => codec::decode_string(&data),
            None => Ok(String::new()),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Close every owned column family, then detach from the registry.
    ///
    /// Best-effort sequential: every column family is closed even if an
    /// earlier one fails, and the first failure is reported. A second close
    /// is a no-op.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let columns: Vec<(String, Arc<ColumnFamily>)> = self
            .columns
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .collect();

        let mut first_err = None;
        for (name, cf) in columns {
            if let Err(e) = cf.close() {
                tracing::warn!(store = %self.name, column = %name, error = %e, "Failed to close column family");
                first_err.get_or_insert(e);
            }
        }

        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(&self.name);
        }

        tracing::info!(store = %self.name, "Closed store");
        first_err.map_or(Ok(()), Err)
    }

    /// Get the column family for `name`, opening it first if needed.
    ///
    /// Double-checked under the write lock so concurrent callers for the same
    /// name result in exactly one engine open.
    fn assert_column(&self, name: &str) -> Result<Arc<ColumnFamily>> {
        if let Some(cf) = self
            .columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return Ok(cf.clone());
        }

        let mut columns = self.columns.write().unwrap_or_else(|e| e.into_inner());
        if let Some(cf) = columns.get(name) {
            return Ok(cf.clone());
        }

        let cf = Arc::new(ColumnFamily::open(
            &self.path,
            name,
            &self.options.engine,
            &self.block_cache,
            self.options.scheduler.clone(),
        )?);
        columns.insert(name.to_string(), cf.clone());
        tracing::debug!(store = %self.name, column = name, "Registered column family");
        Ok(cf)
    }

    fn discover_columns(&self) -> Result<usize> {
        let mut discovered = 0;
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(column) => {
                    self.assert_column(column)?;
                    discovered += 1;
                }
                None => {
                    tracing::warn!(store = %self.name, "Skipping non-UTF-8 column directory");
                }
            }
        }
        Ok(discovered)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
