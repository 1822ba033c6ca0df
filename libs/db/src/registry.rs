//! Registry: the single entry point owning every store.
//!
//! The registry is an explicitly constructed value the caller passes by
//! reference; there is no process-global state. It lazily opens and memoizes
//! stores by name and tears everything down on [`Registry::close`].
//! Ownership flows strictly downward (Registry → Store → ColumnFamily); the
//! back-reference a store keeps for detaching itself is a `Weak` handle.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::error::Result;
use crate::options::Options;
use crate::store::Store;

/// Top-level handle over a base directory of stores.
///
/// # Example
///
/// ```rust,ignore
/// use strata_db::{Options, Registry};
///
/// let registry = Registry::open(Options::new("/var/lib/strata"))?;
/// let store = registry.get_store("testing")?;
/// store.register_columns(&["users"])?;
/// store.put_i64("users", b"1", 42)?;
/// registry.close()?;
/// ```
pub struct Registry {
    inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    options: Options,
    stores: RwLock<HashMap<String, Arc<Store>>>,
}

impl RegistryInner {
    /// Remove `name` from the mapping without closing it. Used by
    /// `Store::close` to detach itself; a no-op if already removed.
    pub(crate) fn unregister(&self, name: &str) {
        let removed = self
            .stores
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);
        if removed.is_some() {
            tracing::debug!(store = name, "Unregistered store");
        }
    }
}

impl Registry {
    /// Create the base directory and an empty registry.
    pub fn open(options: Options) -> Result<Self> {
        std::fs::create_dir_all(&options.db_path)?;
        tracing::info!(path = %options.db_path.display(), "Opened registry");
        Ok(Self {
            inner: Arc::new(RegistryInner {
                options,
                stores: RwLock::new(HashMap::new()),
            }),
        })
    }

    /// Base directory under which stores live.
    pub fn path(&self) -> &Path {
        &self.inner.options.db_path
    }

    /// Return the existing store for `name`, or open and memoize a new one.
    ///
    /// At most one store instance exists per name at any time.
    pub fn get_store(&self, name: &str) -> Result<Arc<Store>> {
        if let Some(store) = self
            .inner
            .stores
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return Ok(store.clone());
        }

        let mut stores = self.inner.stores.write().unwrap_or_else(|e| e.into_inner());
        if let Some(store) = stores.get(name) {
            return Ok(store.clone());
        }

        let store = Arc::new(Store::open(
            Arc::downgrade(&self.inner),
            name,
            &self.inner.options,
        )?);
        stores.insert(name.to_string(), store.clone());
        Ok(store)
    }

    /// Remove `name` from the mapping without closing it; closing the
    /// detached store remains the caller's responsibility.
    pub fn unregister_store(&self, name: &str) {
        self.inner.unregister(name);
    }

    /// Close every owned store, then clear the mapping.
    ///
    /// Best-effort sequential: every store is closed even if an earlier one
    /// fails, and the first failure is reported. Assumes single-threaded
    /// shutdown; not safe to call concurrently with `get_store`.
    pub fn close(&self) -> Result<()> {
        let stores: Vec<Arc<Store>> = self
            .inner
            .stores
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .drain()
            .map(|(_, store)| store)
            .collect();

        let mut first_err = None;
        for store in stores {
            // Store::close re-enters unregister(); the name is already gone,
            // so that is a no-op rather than a deadlock.
            if let Err(e) = store.close() {
                tracing::warn!(store = store.name(), error = %e, "Failed to close store");
                first_err.get_or_insert(e);
            }
        }

        tracing::info!(path = %self.inner.options.db_path.display(), "Closed registry");
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
