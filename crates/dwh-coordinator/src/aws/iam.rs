//! IAM role management for the warehouse cluster
//!
//! The cluster assumes one role to read the S3 sources during COPY. The role
//! trusts the Redshift service principal and carries the managed S3
//! read-only policy.

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::aws::error::classify_sdk_error;
use anyhow::{Context, Result};
use aws_sdk_iam::Client;
use aws_sdk_iam::types::Tag;
use chrono::Utc;
use dwh_common::defaults::{REDSHIFT_SERVICE_PRINCIPAL, S3_READ_ONLY_POLICY_ARN};
use dwh_common::tags;
use tracing::{debug, info};

/// Role the cluster assumes, referenced by ARN once created.
///
/// The managed policy must be detached before the role can be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub role_name: String,
    pub trust_principal: String,
    pub attached_policy_arn: String,
}

impl RoleGrant {
    /// Grant for the warehouse role: trusted by Redshift, S3 read-only
    pub fn for_warehouse(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            trust_principal: REDSHIFT_SERVICE_PRINCIPAL.to_string(),
            attached_policy_arn: S3_READ_ONLY_POLICY_ARN.to_string(),
        }
    }

    /// Trust policy allowing the principal to assume the role
    pub fn trust_policy(&self) -> String {
        serde_json::json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Principal": { "Service": self.trust_principal },
                    "Action": "sts:AssumeRole"
                }
            ]
        })
        .to_string()
    }
}

/// IAM client for managing the warehouse role
pub struct IamClient {
    client: Client,
}

impl FromAwsContext for IamClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.iam_client(),
        }
    }
}

fn iam_tag(key: &str, value: &str) -> Result<Tag> {
    Tag::builder()
        .key(key)
        .value(value)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build IAM tag: {}", e))
}

impl IamClient {
    /// Create the role with its trust policy.
    ///
    /// An existing role surfaces as `AwsError::AlreadyExists` in the error
    /// chain; callers decide whether that is acceptable.
    pub async fn create_role(&self, grant: &RoleGrant, cluster_identifier: &str) -> Result<()> {
        info!(role_name = %grant.role_name, "Creating IAM role");

        let mut request = self
            .client
            .create_role()
            .path("/")
            .role_name(&grant.role_name)
            .assume_role_policy_document(grant.trust_policy())
            .description("Allows Redshift clusters to call AWS services on your behalf.");
        for (key, value) in tags::standard_tags(cluster_identifier, Utc::now()) {
            request = request.tags(iam_tag(key, &value)?);
        }

        request
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to create IAM role {}", grant.role_name))?;

        debug!(role_name = %grant.role_name, "IAM role created");
        Ok(())
    }

    /// Attach a managed policy. Attaching an already-attached policy succeeds.
    pub async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to attach {policy_arn} to {role_name}"))?;

        debug!(role_name = %role_name, policy_arn = %policy_arn, "Managed policy attached");
        Ok(())
    }

    /// Look up the role ARN
    pub async fn get_role_arn(&self, role_name: &str) -> Result<String> {
        let response = self
            .client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to get IAM role {role_name}"))?;

        let arn = response
            .role()
            .map(|role| role.arn().to_string())
            .context("No role in GetRole response")?;
        Ok(arn)
    }

    /// Detach a managed policy
    pub async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.client
            .detach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to detach {policy_arn} from {role_name}"))?;

        info!(role_name = %role_name, policy_arn = %policy_arn, "Managed policy detached");
        Ok(())
    }

    /// Delete the role. Fails with `DeleteConflict` while policies are attached.
    pub async fn delete_role(&self, role_name: &str) -> Result<()> {
        self.client
            .delete_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to delete IAM role {role_name}"))?;

        info!(role_name = %role_name, "IAM role deleted");
        Ok(())
    }
}

/// Trait for IAM operations that can be mocked in tests.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait IamOperations: Send + Sync {
    /// Create a role for the grant, tagged with the cluster identifier
    async fn create_role(&self, grant: &RoleGrant, cluster_identifier: &str) -> Result<()>;

    /// Attach a managed policy to a role
    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;

    /// Get a role's ARN
    async fn get_role_arn(&self, role_name: &str) -> Result<String>;

    /// Detach a managed policy from a role
    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()>;

    /// Delete a role
    async fn delete_role(&self, role_name: &str) -> Result<()>;
}

impl IamOperations for IamClient {
    async fn create_role(&self, grant: &RoleGrant, cluster_identifier: &str) -> Result<()> {
        IamClient::create_role(self, grant, cluster_identifier).await
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        IamClient::attach_role_policy(self, role_name, policy_arn).await
    }

    async fn get_role_arn(&self, role_name: &str) -> Result<String> {
        IamClient::get_role_arn(self, role_name).await
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        IamClient::detach_role_policy(self, role_name, policy_arn).await
    }

    async fn delete_role(&self, role_name: &str) -> Result<()> {
        IamClient::delete_role(self, role_name).await
    }
}
