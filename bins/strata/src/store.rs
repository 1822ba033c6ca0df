use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args as ClapArgs, Subcommand, ValueEnum};
use strata_db::{Options, Registry};

#[allow(unused_imports)]
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, ClapArgs)]
#[clap(args_conflicts_with_subcommands = false)]
pub struct Command {
    /// Path to the base database directory
    #[clap(long, short = 'p')]
    pub db_dir: PathBuf,

    #[clap(subcommand)]
    pub verb: Verb,
}

#[derive(Debug, Subcommand)]
pub enum Verb {
    /// List stores under the base directory
    List(List),
    /// List column families of a store
    Columns(Columns),
    /// Dump contents of a column family
    Scan(Scan),
    /// Read a single key from a column family
    Get(Get),
}

#[derive(Debug, ClapArgs)]
pub struct List {}

#[derive(Debug, ClapArgs)]
pub struct Columns {
    /// Store name
    pub store: String,
}

#[derive(Debug, ClapArgs)]
pub struct Scan {
    /// Store name
    pub store: String,

    /// Column family to dump
    pub column: String,

    /// Start key (inclusive lower bound)
    #[clap(long, default_value = "")]
    pub from: String,

    /// Maximum number of results (default: 100)
    #[clap(long, default_value = "100")]
    pub limit: usize,

    /// How to render values
    #[clap(long, value_enum, default_value_t = ValueFormat::String)]
    pub format: ValueFormat,
}

#[derive(Debug, ClapArgs)]
pub struct Get {
    /// Store name
    pub store: String,

    /// Column family to read from
    pub column: String,

    /// Key to read
    pub key: String,

    /// How to render the value
    #[clap(long, value_enum, default_value_t = ValueFormat::String)]
    pub format: ValueFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum ValueFormat {
    /// Lossy UTF-8 rendering
    #[default]
    String,
    /// Hex dump
    Hex,
    /// 8-byte big-endian signed integer
    I64,
    /// 8-byte big-endian unsigned integer
    U64,
    /// 8-byte big-endian IEEE-754 float
    F64,
}

pub fn run(args: &Command) -> anyhow::Result<()> {
    match &args.verb {
        Verb::List(_) => list_stores(&args.db_dir),
        Verb::Columns(columns) => list_columns(&args.db_dir, columns),
        Verb::Scan(scan) => scan_column(&args.db_dir, scan),
        Verb::Get(get) => get_key(&args.db_dir, get),
    }
}

fn list_stores(db_dir: &Path) -> anyhow::Result<()> {
    let entries = std::fs::read_dir(db_dir)
        .with_context(|| format!("Failed to read {}", db_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            println!("{}", entry.file_name().to_string_lossy());
        }
    }
    Ok(())
}

fn list_columns(db_dir: &Path, args: &Columns) -> anyhow::Result<()> {
    let registry = Registry::open(Options::new(db_dir))?;
    let store = registry.get_store(&args.store)?;
    for name in store.column_names() {
        println!("{}", name);
    }
    registry.close()?;
    Ok(())
}

fn scan_column(db_dir: &Path, args: &Scan) -> anyhow::Result<()> {
    let registry = Registry::open(Options::new(db_dir))?;
    let store = registry.get_store(&args.store)?;

    let mut count = 0usize;
    store.list(&args.column, args.from.as_bytes(), |key, value| {
        println!(
            "{}\t{}",
            String::from_utf8_lossy(key),
            render(value, args.format)
        );
        count += 1;
        count < args.limit
    })?;

    info!(count, "Scan complete");
    registry.close()?;
    Ok(())
}

fn get_key(db_dir: &Path, args: &Get) -> anyhow::Result<()> {
    let registry = Registry::open(Options::new(db_dir))?;
    let store = registry.get_store(&args.store)?;

    let value = store.get_bytes(&args.column, args.key.as_bytes())?;
    if value.is_empty() {
        println!("(not found)");
    } else {
        println!("{}", render(&value, args.format));
    }

    registry.close()?;
    Ok(())
}

fn render(value: &[u8], format: ValueFormat) -> String {
    match format {
        ValueFormat::String => String::from_utf8_lossy(value).into_owned(),
        ValueFormat::Hex => value.iter().map(|b| format!("{:02x}", b)).collect(),
        ValueFormat::I64 => strata_db::decode_i64(value)
            .map(|v| v.to_string())
            .unwrap_or_else(|e| format!("({})", e)),
        ValueFormat::U64 => strata_db::decode_u64(value)
            .map(|v| v.to_string())
            .unwrap_or_else(|e| format!("({})", e)),
        ValueFormat::F64 => strata_db::decode_f64(value)
            .map(|v| v.to_string())
            .unwrap_or_else(|e| format!("({})", e)),
    }
}
