//! Configuration for the registry and the underlying RocksDB engine.
//!
//! `Options` is plain data the caller constructs once and hands to
//! [`Registry::open`](crate::Registry::open). Engine tuning is opaque
//! pass-through: none of it affects registry/store/scheduler logic, it is
//! materialized into `rocksdb::Options` at column-family open time.

use std::path::PathBuf;
use std::time::Duration;

use rocksdb::{BlockBasedOptions, Cache};

// ============================================================================
// Options
// ============================================================================

/// Top-level configuration for a [`Registry`](crate::Registry).
#[derive(Debug, Clone)]
pub struct Options {
    /// Base directory under which every store gets a subdirectory. Required.
    pub db_path: PathBuf,

    /// Debounce/idle intervals for the per-column-family sync scheduler.
    pub scheduler: SchedulerConfig,

    /// RocksDB tuning, applied to every column family's engine handle.
    pub engine: EngineConfig,
}

impl Options {
    /// Create options for the given base directory, with default tuning.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            scheduler: SchedulerConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Set the scheduler configuration.
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set the engine tuning configuration.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

// ============================================================================
// SchedulerConfig
// ============================================================================

/// Intervals driving the per-column-family sync scheduler.
///
/// A write arms the `debounce` timer; further writes inside that window
/// collapse into the same flush. With nothing pending, the scheduler wakes
/// every `idle_interval` and performs a defensive flush, which bounds
/// worst-case data loss when writes stop arriving without a close.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Quiet period after a write before the WAL is synced.
    pub debounce: Duration,

    /// Wake-up interval when no flush is pending.
    pub idle_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            idle_interval: Duration::from_secs(10),
        }
    }
}

// ============================================================================
// EngineConfig
// ============================================================================

/// RocksDB engine tuning shared by every column family.
///
/// Defaults favor write throughput (pipelined writes, concurrent memtable
/// writes, generous level-0 triggers) with a shared block cache per store.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Shared block cache size in bytes. One cache is created per store and
    /// shared by all of its column families.
    pub block_cache_size: usize,

    /// Block size for the block-based table factory.
    pub block_size: usize,

    /// Whether to cache index and filter blocks in the block cache.
    pub cache_index_and_filter_blocks: bool,

    /// Whether to pin L0 filter/index blocks in cache.
    pub pin_l0_filter_and_index: bool,

    /// Number of LSM levels.
    pub num_levels: i32,

    /// Background compaction/flush job limit.
    pub max_background_jobs: i32,

    /// Target SST size for level-1 compaction output.
    pub target_file_size_base: u64,

    /// Memtables allowed before writes stall.
    pub max_write_buffer_number: i32,

    /// Level-0 file count that triggers compaction.
    pub level0_file_num_compaction_trigger: i32,

    /// Level-0 file count that slows writes.
    pub level0_slowdown_writes_trigger: i32,

    /// Level-0 file count that stops writes.
    pub level0_stop_writes_trigger: i32,

    /// Max total bytes for level-1.
    pub max_bytes_for_level_base: u64,

    /// Growth multiplier between levels.
    pub max_bytes_for_level_multiplier: f64,

    /// Max open files (-1 keeps every file descriptor open).
    pub max_open_files: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_cache_size: 256 * 1024 * 1024,
            block_size: 4 * 1024,
            cache_index_and_filter_blocks: true,
            pin_l0_filter_and_index: true,
            num_levels: 4,
            max_background_jobs: 4,
            target_file_size_base: 64 * 1024 * 1024,
            max_write_buffer_number: 3,
            level0_file_num_compaction_trigger: 8,
            level0_slowdown_writes_trigger: 17,
            level0_stop_writes_trigger: 24,
            max_bytes_for_level_base: 512 * 1024 * 1024,
            max_bytes_for_level_multiplier: 8.0,
            max_open_files: -1,
        }
    }
}

impl EngineConfig {
    /// Create the block cache shared by a store's column families.
    pub(crate) fn create_block_cache(&self) -> Cache {
        Cache::new_lru_cache(self.block_cache_size)
    }

    /// Materialize `rocksdb::Options` for opening one column family's engine
    /// handle, wired to the store's shared block cache.
    pub(crate) fn rocksdb_options(&self, block_cache: &Cache) -> rocksdb::Options {
        let mut options = rocksdb::Options::default();
        options.create_if_missing(true);
        options.set_error_if_exists(false);

        options.set_enable_pipelined_write(true);
        options.set_allow_concurrent_memtable_write(true);
        options.set_optimize_filters_for_hits(true);

        options.set_num_levels(self.num_levels);
        options.set_max_background_jobs(self.max_background_jobs);
        options.set_target_file_size_base(self.target_file_size_base);
        options.set_max_write_buffer_number(self.max_write_buffer_number);
        options.set_level_zero_file_num_compaction_trigger(self.level0_file_num_compaction_trigger);
        options.set_level_zero_slowdown_writes_trigger(self.level0_slowdown_writes_trigger);
        options.set_level_zero_stop_writes_trigger(self.level0_stop_writes_trigger);
        options.set_max_bytes_for_level_base(self.max_bytes_for_level_base);
        options.set_max_bytes_for_level_multiplier(self.max_bytes_for_level_multiplier);
        options.set_max_open_files(self.max_open_files);

        let mut table_options = BlockBasedOptions::default();
        table_options.set_block_size(self.block_size);
        table_options.set_block_cache(block_cache);
        table_options.set_cache_index_and_filter_blocks(self.cache_index_and_filter_blocks);
        table_options.set_pin_l0_filter_and_index_blocks_in_cache(self.pin_l0_filter_and_index);
        options.set_block_based_table_factory(&table_options);

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_new() {
        let options = Options::new("/tmp/strata");
        assert_eq!(options.db_path, PathBuf::from("/tmp/strata"));
        assert_eq!(options.scheduler.debounce, Duration::from_millis(100));
        assert_eq!(options.scheduler.idle_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.num_levels, 4);
        assert_eq!(config.max_open_files, -1);
        assert_eq!(config.block_size, 4 * 1024);
    }

    #[test]
    fn test_rocksdb_options_materialize() {
        let config = EngineConfig::default();
        let cache = config.create_block_cache();
        // Options are created successfully
        let opts = config.rocksdb_options(&cache);
        drop(opts);
    }

    #[test]
    fn test_options_builders() {
        let options = Options::new("/tmp/strata").with_scheduler(SchedulerConfig {
            debounce: Duration::from_millis(5),
            idle_interval: Duration::from_secs(1),
        });
        assert_eq!(options.scheduler.debounce, Duration::from_millis(5));
    }
}
