//! Test utilities for hal-resource
//!
//! Shared by the unit tests inside the crate and by the `tests/` suites (through
//! the `test-utils` feature):
//! - [`init_test_logging`] for tracing output in tests
//! - [`fixtures`] with the canonical `parent` → `child` → `grandChild` definition
//!   set and matching documents
//!
//! # Example
//!
//! ```rust,no_run
//! use hal_resource::graph::Prefix;
//! use hal_resource::render::Renderer;
//! use hal_resource::test_utils::{fixtures, init_test_logging};
//!
//! init_test_logging(None);
//! let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();
//! ```

pub mod fixtures;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs a subscriber on the test writer once per process. Uses `level` when
/// given, otherwise `RUST_LOG`; with neither, nothing is installed.
///
/// ```bash
/// RUST_LOG=hal_resource=trace cargo test
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
            .with_ansi(true)
            .try_init();
    });
}
