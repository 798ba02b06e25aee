//! S3 source checks for the ELT load step

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::classify_sdk_error;
use anyhow::{Context, Result};
use aws_sdk_s3::Client;
use tracing::debug;

/// A parsed `s3://bucket/prefix` location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    /// Key prefix, possibly empty
    pub prefix: String,
}

impl std::fmt::Display for S3Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix)
    }
}

/// Parse an `s3://bucket[/prefix]` URI
pub fn parse_s3_uri(uri: &str) -> Result<S3Location> {
    let rest = uri
        .strip_prefix("s3://")
        .with_context(|| format!("Not an s3:// URI: {uri}"))?;
    let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
        anyhow::bail!("S3 URI has no bucket: {uri}");
    }
    Ok(S3Location {
        bucket: bucket.to_string(),
        prefix: prefix.to_string(),
    })
}

/// S3 client for source preflight checks
pub struct S3Client {
    client: Client,
}

impl FromAwsContext for S3Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
        }
    }
}

impl S3Client {
    /// Check whether at least one object exists under the location
    pub async fn has_objects(&self, location: &S3Location) -> Result<bool> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&location.bucket)
            .prefix(&location.prefix)
            .max_keys(1)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to list {location}"))?;

        let found = response.key_count().unwrap_or_default() > 0 || !response.contents().is_empty();
        debug!(location = %location, found, "Checked S3 source");
        Ok(found)
    }
}

/// Trait for S3 operations that can be mocked in tests.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait S3Operations: Send + Sync {
    /// Check whether at least one object exists under the location
    async fn has_objects(&self, location: &S3Location) -> Result<bool>;
}

impl S3Operations for S3Client {
    async fn has_objects(&self, location: &S3Location) -> Result<bool> {
        S3Client::has_objects(self, location).await
    }
}
