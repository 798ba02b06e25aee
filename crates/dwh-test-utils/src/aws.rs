//! AWS test utilities
//!
//! Provides region detection and unique run ID generation for AWS integration tests.

use chrono::Utc;

/// Get the AWS region for tests.
///
/// Checks `AWS_REGION`, then `AWS_DEFAULT_REGION`, then falls back to
/// us-west-2 (the region the warehouse sources live in).
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-west-2".to_string())
}

/// Generate a unique run ID for test resources.
///
/// Format: `test-{timestamp_ms}-{counter}`.
pub fn test_run_id() -> String {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let ts = Utc::now().timestamp_millis();
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("test-{}-{}", ts, counter)
}

/// Cluster identifier for a live test cluster.
///
/// Redshift identifiers must start with a letter and contain only lowercase
/// alphanumerics and hyphens.
pub fn test_cluster_identifier() -> String {
    format!("dwh-{}", test_run_id())
}

/// IAM role name for a live test role
pub fn test_role_name() -> String {
    format!("dwhRole-{}", test_run_id())
}
