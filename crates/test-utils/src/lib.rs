//! Shared test utilities for the nwm-catalog workspace.
//!
//! This crate provides common testing infrastructure including:
//! - NWM naming fixtures and HTML listing builders
//! - Temporary on-disk NWM trees
//! - A counting in-memory [`CatalogLoader`](nwm_catalog::CatalogLoader)
//! - A local HTTP server for remote listing tests
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Use it from integration tests (`tests/`), which link against the same build of
//! `nwm-catalog` as this crate.

pub mod fixtures;
pub mod generators;
pub mod loader;
pub mod paths;
pub mod server;

pub use fixtures::*;
pub use generators::*;
pub use loader::*;
pub use paths::*;
pub use server::*;

/// Macro to read a test file, skipping the test if it is not found.
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_listing() {
///     let html = require_test_file!("nomads/prod.html");
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::read_test_file($name) {
            Some(contents) => contents,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Restore crates/nwm-catalog/testdata or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Assert that files are ordered by ascending step.
///
/// ```ignore
/// use test_utils::assert_steps_ascending;
///
/// assert_steps_ascending!(series.files());
/// ```
#[macro_export]
macro_rules! assert_steps_ascending {
    ($files:expr) => {{
        let steps: Vec<Option<u64>> = $files.iter().map(|file| file.step).collect();
        if steps.windows(2).any(|pair| pair[0] > pair[1]) {
            panic!("assertion failed: steps are not ascending: {:?}", steps);
        }
    }};
}
