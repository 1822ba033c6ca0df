//! Telemetry module providing tracing subscriber initialization.
//!
//! The library crates only emit `tracing` events; subscriber setup belongs to
//! the binary (or test) that hosts them. Two initializers are provided:
//! - `init_dev_subscriber()` - stderr logging at DEBUG and above
//! - `init_dev_subscriber_with_env_filter()` - same, but respects `RUST_LOG`
//!
//! # Usage
//!
//! ```no_run
//! use strata_core::telemetry;
//!
//! fn main() {
//!     telemetry::init_dev_subscriber();
//!     tracing::info!("Application started");
//! }
//! ```

use tracing::Level;
use tracing_subscriber::fmt;

/// Initialize a simple stderr subscriber for development.
///
/// This sets up a tracing subscriber that:
/// - Outputs to stderr
/// - Shows DEBUG level and above
/// - Includes target (module path), file, and line number
/// - Uses a compact format suitable for terminal output
///
/// Call this at application startup (not in the library).
///
/// # Panics
/// Panics if a global subscriber has already been set.
pub fn init_dev_subscriber() {
    let subscriber = fmt::Subscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Initialize a simple stderr subscriber that respects the `RUST_LOG`
/// environment variable for filtering. Defaults to DEBUG if unset.
///
/// # Example
/// ```no_run
/// use strata_core::telemetry;
///
/// fn main() {
///     // RUST_LOG=strata_db=debug,info
///     telemetry::init_dev_subscriber_with_env_filter();
///     tracing::info!("Application started");
/// }
/// ```
pub fn init_dev_subscriber_with_env_filter() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}
