//! Store/column-family management layer over RocksDB.
//!
//! This crate provides a hierarchical registry of independently-opened
//! logical databases ("stores"), each subdivided into independently-opened
//! column families, plus a write-coalescing durability scheduler that
//! amortizes WAL syncs across write bursts.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   │
//!   ▼
//! Registry ── get_store(name) ──► Store ── put/get/list(column, ...) ──► ColumnFamily
//!   │                               │                                       │
//!   │ owns name → Store map         │ owns name → ColumnFamily map          │ owns one rocksdb::DB
//!   │ base dir creation             │ discovery on open                     │ sync scheduler thread
//!   ▼                               ▼                                       ▼
//! <base>/                      <base>/<store>/                     <base>/<store>/<column>/
//! ```
//!
//! Typed encode/decode happens at the store layer ([`codec`]); raw engine
//! I/O happens at the column-family layer. Writes are acknowledged before
//! they are durable; durability is guaranteed once the debounce window
//! elapses or on close, whichever is first.

mod codec;
mod column_family;
mod error;
mod options;
mod registry;
mod store;

pub use codec::{
    decode_f64, decode_i64, decode_string, decode_u64, encode_f64, encode_i64, encode_str,
    encode_u64,
};
pub use column_family::ColumnFamily;
pub use error::{Error, Result};
pub use options::{EngineConfig, Options, SchedulerConfig};
pub use registry::Registry;
pub use store::Store;
