//! EC2 access for the cluster's network settings

mod operations;
mod security_group;
mod types;

pub use operations::Ec2Operations;
pub use types::SecurityRule;

#[cfg(test)]
pub use operations::MockEc2Operations;

use crate::aws::context::{AwsContext, FromAwsContext};
use aws_sdk_ec2::Client;

/// EC2 client for security group lookups and ingress rules
pub struct Ec2Client {
    pub(crate) client: Client,
}

impl FromAwsContext for Ec2Client {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
        }
    }
}
