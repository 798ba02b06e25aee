//! Redshift operations trait for testing

use super::RedshiftClient;
use super::types::ClusterDescriptor;
use crate::config::ClusterSpec;
use anyhow::Result;

/// Trait for Redshift operations that can be mocked in tests.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait RedshiftOperations: Send + Sync {
    /// Submit cluster creation with the role attached
    async fn create_cluster(&self, spec: &ClusterSpec, role_arn: &str) -> Result<()>;

    /// Describe a cluster. A missing cluster is `AwsError::NotFound`.
    async fn describe_cluster(&self, cluster_identifier: &str) -> Result<ClusterDescriptor>;

    /// Delete a cluster without a final snapshot
    async fn delete_cluster(&self, cluster_identifier: &str) -> Result<()>;
}

impl RedshiftOperations for RedshiftClient {
    async fn create_cluster(&self, spec: &ClusterSpec, role_arn: &str) -> Result<()> {
        RedshiftClient::create_cluster(self, spec, role_arn).await
    }

    async fn describe_cluster(&self, cluster_identifier: &str) -> Result<ClusterDescriptor> {
        RedshiftClient::describe_cluster(self, cluster_identifier).await
    }

    async fn delete_cluster(&self, cluster_identifier: &str) -> Result<()> {
        RedshiftClient::delete_cluster(self, cluster_identifier).await
    }
}
