//! Error types for the store/column-family layer.
//!
//! Every engine failure propagates unchanged through Store and Registry; the
//! only deliberate mapping is not-found-to-default for typed reads, which is
//! handled at the call sites (see `Store::get_bytes` and friends), never here.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the registry, store, and column-family layers.
#[derive(Debug, Error)]
pub enum Error {
    /// The engine could not be opened at the column family's directory.
    /// Fatal to that store/column family; never retried here.
    #[error("failed to open column family at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rocksdb::Error,
    },

    /// Caller referenced a column family that was never registered.
    #[error("column family not found: {0}")]
    ColumnNotFound(String),

    /// Engine-level write failure, surfaced verbatim.
    #[error("write failed: {0}")]
    Write(#[source] rocksdb::Error),

    /// Engine-level read failure, surfaced verbatim. A missing key is not a
    /// read failure.
    #[error("read failed: {0}")]
    Read(#[source] rocksdb::Error),

    /// Iterator-internal failure during a scan.
    #[error("iteration failed: {0}")]
    Iteration(#[source] rocksdb::Error),

    /// Stored bytes do not decode as the requested fixed-width type.
    #[error("codec error: {0}")]
    Codec(String),

    /// Operation against a store or column family that has been closed.
    #[error("store is closed")]
    Closed,

    /// Filesystem error while creating or enumerating directories.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
