//! Security group lookup and ingress rules

use super::Ec2Client;
use super::types::SecurityRule;
use crate::aws::error::classify_sdk_error;
use anyhow::{Context, Result};
use aws_sdk_ec2::types::{Filter, IpPermission, IpRange};
use tracing::{debug, info};

impl Ec2Client {
    /// Return the first security group in `vpc_id`, or `None` if the VPC has none
    pub async fn first_security_group(&self, vpc_id: &str) -> Result<Option<String>> {
        let response = self
            .client
            .describe_security_groups()
            .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| format!("Failed to describe security groups in {vpc_id}"))?;

        let group = response
            .security_groups()
            .iter()
            .find_map(|sg| sg.group_id())
            .map(str::to_string);

        debug!(vpc_id = %vpc_id, security_group = ?group, "Looked up VPC security group");
        Ok(group)
    }

    /// Authorize an inbound rule.
    ///
    /// A duplicate rule surfaces as `AwsError::AlreadyExists` in the error chain.
    pub async fn authorize_ingress(&self, security_group_id: &str, rule: &SecurityRule) -> Result<()> {
        let permission = IpPermission::builder()
            .ip_protocol(rule.protocol)
            .from_port(i32::from(rule.from_port))
            .to_port(i32::from(rule.to_port))
            .ip_ranges(
                IpRange::builder()
                    .cidr_ip(&rule.source_cidr)
                    .description("Redshift client access")
                    .build(),
            )
            .build();

        self.client
            .authorize_security_group_ingress()
            .group_id(security_group_id)
            .ip_permissions(permission)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))
            .with_context(|| {
                format!(
                    "Failed to authorize {}/{} from {} on {security_group_id}",
                    rule.protocol, rule.from_port, rule.source_cidr
                )
            })?;

        info!(
            security_group = %security_group_id,
            port = rule.from_port,
            cidr = %rule.source_cidr,
            "Ingress rule authorized"
        );
        Ok(())
    }
}
