//! Default configuration values and fixed AWS identifiers
//!
//! These constants keep the provisioning, teardown and ELT paths in agreement
//! about names that are never read from the config file.

use std::time::Duration;

/// Region used when the `[AWS]` section does not name one
pub const DEFAULT_REGION: &str = "us-west-2";

/// Default Redshift port
pub const DEFAULT_PORT: u16 = 5439;

/// Default interval between cluster status checks
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "dwh.cfg";

/// Managed policy granting the cluster read access to S3
pub const S3_READ_ONLY_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonS3ReadOnlyAccess";

/// Service principal allowed to assume the warehouse role
pub const REDSHIFT_SERVICE_PRINCIPAL: &str = "redshift.amazonaws.com";

/// Source range opened on the cluster's security group
pub const OPEN_CIDR: &str = "0.0.0.0/0";

/// Placeholder name for the cluster endpoint address
pub const HOST_PLACEHOLDER: &str = "redshift_host";

/// Placeholder name for the warehouse role ARN
pub const ROLE_ARN_PLACEHOLDER: &str = "iam_role_arn";

/// Returns the default poll interval as a `Duration`
pub fn default_poll_interval() -> Duration {
    Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)
}
