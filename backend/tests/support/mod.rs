//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! shared helpers live here and are pulled in with `mod support;`.

pub mod cluster_skip;

pub use cluster_skip::{handle_cluster_setup_failure, test_database_url};
