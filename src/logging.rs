//! Logger setup for the simulation binary and tests.
//!
//! Phase transitions are logged at info level. Per-frame knockback hits,
//! jump completion and dropped snapshots are debug level.

use env_logger::{Builder, Env};

/// Filter used when `verbose` is off: phase changes and errors only.
const QUIET_FILTER: &str = "info";
/// Filter used when `verbose` is on: this crate's per-frame detail, while
/// other crates stay at info.
const VERBOSE_FILTER: &str = "info,spider_ai=debug";

/// Installs the global `env_logger`.
///
/// `verbose` turns on this crate's per-frame knockback and jump messages.
/// `RUST_LOG` overrides both defaults. Calling this again after a logger is
/// installed does nothing.
pub fn init(verbose: bool) {
    let filter = if verbose { VERBOSE_FILTER } else { QUIET_FILTER };
    let mut builder = Builder::from_env(Env::default().default_filter_or(filter));
    builder.format_timestamp_millis();

    if builder.try_init().is_err() {
        log::trace!("logger already installed");
    }
}
