//! Helpers for controlling database-backed test behaviour.
//!
//! Suites that need PostgreSQL read its URL from `TEST_DATABASE_URL`. When the
//! database is unavailable they either skip or fail depending on the
//! `SKIP_TEST_CLUSTER` policy, so every suite behaves consistently.

/// Environment variable naming the PostgreSQL database used by tests.
pub const TEST_DATABASE_URL_ENV: &str = "TEST_DATABASE_URL";

/// Returns true when the `SKIP_TEST_CLUSTER` environment variable is set to a
/// truthy value.
///
/// Truthy values: "1", "true", "yes" (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Handles database setup failures consistently across integration tests.
///
/// When `SKIP_TEST_CLUSTER` is truthy, prints a skip marker and returns `None`.
/// Otherwise, panics with a clear failure message so CI breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test database setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Database URL for the test cluster.
///
/// A missing `TEST_DATABASE_URL` always skips: developers without a local
/// PostgreSQL can still run the rest of the suite.
pub fn test_database_url() -> Option<String> {
    match std::env::var(TEST_DATABASE_URL_ENV) {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP-TEST-CLUSTER: {TEST_DATABASE_URL_ENV} is not set");
            None
        }
    }
}
