//! Cluster create/describe/delete

use super::RedshiftClient;
use super::types::ClusterDescriptor;
use crate::aws::error::{AwsError, classify_sdk_error};
use crate::config::ClusterSpec;
use anyhow::{Context, Result};
use aws_sdk_redshift::types::Tag;
use chrono::Utc;
use dwh_common::tags;
use tracing::{debug, info};

impl RedshiftClient {
    /// Submit cluster creation.
    ///
    /// Returns once the request is accepted; the cluster then advances through
    /// `creating` on its own. The node count is only sent for multi-node
    /// clusters.
    pub async fn create_cluster(&self, spec: &ClusterSpec, role_arn: &str) -> Result<()> {
        info!(
            cluster = %spec.cluster_identifier,
            cluster_type = %spec.cluster_type,
            node_type = %spec.node_type,
            nodes = spec.node_count,
            "Creating Redshift cluster"
        );

        let mut request = self
            .client
            .create_cluster()
            .cluster_identifier(&spec.cluster_identifier)
            .cluster_type(spec.cluster_type.as_ref())
            .node_type(&spec.node_type)
            .db_name(&spec.database_name)
            .master_username(&spec.admin_user)
            .master_user_password(&spec.admin_password)
            .iam_roles(role_arn)
            .publicly_accessible(true)
            .port(i32::from(spec.port));

        if spec.is_multi_node() {
            let nodes = i32::try_from(spec.node_count).context("DWH_NUM_NODES out of range")?;
            request = request.number_of_nodes(nodes);
        }

        for (key, value) in tags::standard_tags(&spec.cluster_identifier, Utc::now()) {
            request = request.tags(Tag::builder().key(key).value(value).build());
        }

        request
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to create cluster {}", spec.cluster_identifier))?;

        debug!(cluster = %spec.cluster_identifier, "Create request accepted");
        Ok(())
    }

    /// Describe one cluster
    pub async fn describe_cluster(&self, cluster_identifier: &str) -> Result<ClusterDescriptor> {
        let response = self
            .client
            .describe_clusters()
            .cluster_identifier(cluster_identifier)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to describe cluster {cluster_identifier}"))?;

        let cluster = response.clusters().first().ok_or_else(|| AwsError::NotFound {
            code: "ClusterNotFound".to_string(),
            message: format!("Cluster {cluster_identifier} not found."),
        })?;

        Ok(ClusterDescriptor::from_sdk(cluster))
    }

    /// Delete the cluster, skipping the final snapshot
    pub async fn delete_cluster(&self, cluster_identifier: &str) -> Result<()> {
        info!(cluster = %cluster_identifier, "Deleting Redshift cluster");

        self.client
            .delete_cluster()
            .cluster_identifier(cluster_identifier)
            .skip_final_cluster_snapshot(true)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to delete cluster {cluster_identifier}"))?;

        info!(cluster = %cluster_identifier, "Cluster deletion started");
        Ok(())
    }
}
