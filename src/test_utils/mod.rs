//! Test utilities for plugin-mirror
//!
//! Everything a pipeline test needs without touching the network, `git`, or
//! `gh`:
//! - [`CallLog`], a shared, ordered record of capability calls
//! - fakes for each capability trait that record their calls and return
//!   scripted exit codes ([`fakes`])
//! - archive fixtures ([`fixtures`])
//!
//! # Example
//!
//! ```rust,no_run
//! use plugin_mirror::test_utils::{CallLog, FakeVcs};
//!
//! let log = CallLog::default();
//! let vcs = FakeVcs::new(log.clone()).with_code("commit", 1);
//! // ... run the pipeline with `&vcs` ...
//! assert!(log.calls().iter().any(|c| c.starts_with("git commit")));
//! ```

pub mod fakes;
pub mod fixtures;

pub use fakes::{
    CallLog, FakeFetcher, FakeOracle, FakeReleaseClient, FakeVcs, RecordingArchiver,
    RecordingSynchronizer,
};
pub use fixtures::plugin_zip;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. An explicit `level` wins; otherwise
/// `RUST_LOG` is honored, and without either nothing is logged.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
