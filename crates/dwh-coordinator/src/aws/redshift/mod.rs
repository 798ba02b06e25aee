//! Redshift cluster lifecycle calls

mod cluster;
mod operations;
mod types;

pub use operations::RedshiftOperations;
pub use types::ClusterDescriptor;

#[cfg(test)]
pub use operations::MockRedshiftOperations;

use crate::aws::context::{AwsContext, FromAwsContext};
use aws_sdk_redshift::Client;

/// Redshift client for creating, describing and deleting the cluster
pub struct RedshiftClient {
    pub(crate) client: Client,
}

impl FromAwsContext for RedshiftClient {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.redshift_client(),
        }
    }
}
