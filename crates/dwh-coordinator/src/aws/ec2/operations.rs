//! EC2 operations trait for testing

use super::Ec2Client;
use super::types::SecurityRule;
use anyhow::Result;

/// Trait for EC2 operations that can be mocked in tests.
#[allow(async_fn_in_trait)] // Internal use only, Send+Sync bounds on trait are sufficient
#[cfg_attr(test, mockall::automock)]
pub trait Ec2Operations: Send + Sync {
    /// First security group found in a VPC, if any
    async fn first_security_group(&self, vpc_id: &str) -> Result<Option<String>>;

    /// Add an inbound rule to a security group
    async fn authorize_ingress(&self, security_group_id: &str, rule: &SecurityRule) -> Result<()>;
}

impl Ec2Operations for Ec2Client {
    async fn first_security_group(&self, vpc_id: &str) -> Result<Option<String>> {
        Ec2Client::first_security_group(self, vpc_id).await
    }

    async fn authorize_ingress(&self, security_group_id: &str, rule: &SecurityRule) -> Result<()> {
        Ec2Client::authorize_ingress(self, security_group_id, rule).await
    }
}
