//! Column family: one engine handle plus the sync-coalescing scheduler.
//!
//! A column family owns a `rocksdb::DB` opened at `<store>/<column>` and
//! decides *when* unsynced writes are forced to durable storage. Writes go to
//! the WAL without fsync and arm a short debounce timer; bursts collapse into
//! a single `flush_wal(true)`. The trade-off is a bounded window of
//! volatility (one debounce interval after the last write, or one idle
//! interval in the worst case) in exchange for write throughput.
//!
//! # Scheduler state machine
//!
//! One dedicated thread per open column family:
//!
//! ```text
//!             request_sync()
//!   ┌──────┐ ──────────────► ┌──────────────┐
//!   │ Idle │                 │ PendingFlush │
//!   └──────┘ ◄────────────── └──────────────┘
//!      │  ▲    debounce timer fires: flush,
//!      │  │    clear pending, rearm idle
//!      └──┘
//!   idle timer fires:
//!   defensive flush
//!
//!   any state --shutdown--> flush once more, exit
//! ```
//!
//! `request_sync` while a flush is pending is a no-op; the pending flag is
//! true iff a future flush is scheduled and not yet executed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use rocksdb::{WriteOptions, DB};

use crate::error::{Error, Result};
use crate::options::{EngineConfig, SchedulerConfig};

// ============================================================================
// ColumnFamily
// ============================================================================

/// An independently-addressed key space under one store directory.
///
/// The engine handle stays open for as long as the column family is reachable
/// from its store. `close()` drains the scheduler thread, performs one final
/// flush, and is safe to call more than once.
pub struct ColumnFamily {
    name: String,
    path: PathBuf,
    db: Arc<DB>,
    /// True iff a flush is scheduled and not yet executed.
    pending_sync: Arc<AtomicBool>,
    syncs: Arc<AtomicU64>,
    control: Sender<Control>,
    scheduler: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

enum Control {
    SyncRequested,
    Shutdown,
}

impl ColumnFamily {
    /// Open (or create) the engine handle at `<store_path>/<name>` and start
    /// the sync scheduler.
    pub(crate) fn open(
        store_path: &Path,
        name: &str,
        engine: &EngineConfig,
        block_cache: &rocksdb::Cache,
        scheduler_config: SchedulerConfig,
    ) -> Result<Self> {
        let path = store_path.join(name);
        let db = DB::open(&engine.rocksdb_options(block_cache), &path).map_err(|source| {
            Error::Open {
                path: path.clone(),
                source,
            }
        })?;
        let db = Arc::new(db);

        let pending_sync = Arc::new(AtomicBool::new(false));
        let syncs = Arc::new(AtomicU64::new(0));
        let (control, receiver) = crossbeam_channel::unbounded();

        let scheduler = Scheduler {
            db: db.clone(),
            pending_sync: pending_sync.clone(),
            syncs: syncs.clone(),
            control: receiver,
            config: scheduler_config,
            column: name.to_string(),
        };
        let handle = std::thread::Builder::new()
            .name(format!("strata-sync-{}", name))
            .spawn(move || scheduler.run())?;

        tracing::debug!(column = name, path = %path.display(), "Opened column family");

        Ok(Self {
            name: name.to_string(),
            path,
            db,
            pending_sync,
            syncs,
            control,
            scheduler: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
        })
    }

    /// Column family name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding this column family's engine files.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a key non-durably and schedule a coalesced sync.
    ///
    /// The value is visible to subsequent reads immediately but is not
    /// guaranteed to survive a crash until the debounce window elapses or the
    /// column family is closed, whichever comes first.
    pub fn write(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.db
            .put_opt(key, value, &nosync_writes())
            .map_err(Error::Write)?;
        self.request_sync();
        Ok(())
    }

    /// Read a key. `Ok(None)` is the distinguished not-found.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        self.db.get(key).map_err(Error::Read)
    }

    /// Delete a key non-durably and schedule a coalesced sync.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.db
            .delete_opt(key, &nosync_writes())
            .map_err(Error::Write)?;
        self.request_sync();
        Ok(())
    }

    /// Visit `(key, value)` pairs with key >= `from_key` in engine key order
    /// (lexicographic over raw bytes). The visitor returning `false` stops
    /// iteration early without error.
    pub fn list<F>(&self, from_key: &[u8], mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        self.ensure_open()?;
        let mut iter = self.db.raw_iterator();
        iter.seek(from_key);
        while iter.valid() {
            let (Some(key), Some(value)) = (iter.key(), iter.value()) else {
                break;
            };
            if !visit(key, value) {
                return Ok(());
            }
            iter.next();
        }
        iter.status().map_err(Error::Iteration)
    }

    /// Idempotent request to flush "soon."
    ///
    /// Arms the debounce timer if no flush is currently pending; otherwise a
    /// no-op, so bursts of writes collapse into a single scheduled flush.
    pub fn request_sync(&self) {
        if self.pending_sync.swap(true, Ordering::AcqRel) {
            return;
        }
        // Send can only fail once the scheduler has shut down, in which case
        // close() already performed the final flush.
        let _ = self.control.send(Control::SyncRequested);
    }

    /// Number of WAL syncs the scheduler has executed so far.
    pub fn sync_count(&self) -> u64 {
        self.syncs.load(Ordering::Relaxed)
    }

    /// Stop the scheduler, wait for it to exit, then force one last flush.
    ///
    /// Nothing is lost between the last debounced write and shutdown: the
    /// final flush runs unconditionally after the scheduler thread has been
    /// joined. Calling close a second time is a no-op.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.shutdown_scheduler();
        self.db.flush_wal(true).map_err(Error::Write)?;
        tracing::debug!(
            column = %self.name,
            syncs = self.syncs.load(Ordering::Relaxed),
            "Closed column family"
        );
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        Ok(())
    }

    fn shutdown_scheduler(&self) {
        let _ = self.control.send(Control::Shutdown);
        let handle = self
            .scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::warn!(column = %self.name, "Sync scheduler thread panicked");
            }
        }
    }
}

impl Drop for ColumnFamily {
    fn drop(&mut self) {
        // Last-resort cleanup when the owning store never called close().
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.shutdown_scheduler();
            if let Err(e) = self.db.flush_wal(true) {
                tracing::warn!(column = %self.name, error = %e, "Final WAL sync failed on drop");
            }
        }
    }
}

fn nosync_writes() -> WriteOptions {
    let mut options = WriteOptions::default();
    options.set_sync(false);
    options
}

// ============================================================================
// Scheduler
// ============================================================================

/// State for the per-column-family scheduler thread.
///
/// The thread blocks only on its own control channel with a timeout; it never
/// takes a lock held by callers. The current timeout encodes the state:
/// `idle_interval` when idle, `debounce` once a sync has been requested.
struct Scheduler {
    db: Arc<DB>,
    pending_sync: Arc<AtomicBool>,
    syncs: Arc<AtomicU64>,
    control: Receiver<Control>,
    config: SchedulerConfig,
    column: String,
}

impl Scheduler {
    fn run(self) {
        let mut timeout = self.config.idle_interval;
        loop {
            match self.control.recv_timeout(timeout) {
                // A write landed; wait for a quiet period before syncing.
                // Receiving this again while pending just rearms the window.
                Ok(Control::SyncRequested) => timeout = self.config.debounce,
                Ok(Control::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    // Either the debounce window elapsed or the idle timer
                    // fired with nothing pending; the idle flush covers
                    // writes that raced the timer.
                    self.flush();
                    timeout = self.config.idle_interval;
                }
            }
        }
        tracing::trace!(column = %self.column, "Sync scheduler stopped");
    }

    fn flush(&self) {
        if let Err(e) = self.db.flush_wal(true) {
            // No caller to report to from this thread; the next explicit
            // flush (or close) will surface a persistent failure.
            tracing::warn!(column = %self.column, error = %e, "WAL sync failed");
        }
        self.syncs.fetch_add(1, Ordering::Relaxed);
        self.pending_sync.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "column_family_tests.rs"]
mod column_family_tests;
