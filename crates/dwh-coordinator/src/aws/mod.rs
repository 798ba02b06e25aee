//! AWS client modules for the coordinator
//!
//! This module provides wrappers around AWS SDK clients for:
//! - IAM: the role the cluster assumes
//! - Redshift: cluster create/describe/delete
//! - EC2: security group ingress for the database port
//! - S3: source preflight before COPY
//! - STS: Account ID lookup

pub mod account;
pub mod context;
pub mod ec2;
pub mod error;
pub mod iam;
pub mod redshift;
pub mod s3;

pub use account::{AccountId, get_current_account_id};
pub use context::{AwsContext, FromAwsContext};
pub use ec2::{Ec2Client, Ec2Operations, SecurityRule};
pub use iam::{IamClient, IamOperations, RoleGrant};
pub use redshift::{ClusterDescriptor, RedshiftClient, RedshiftOperations};
pub use s3::{S3Client, S3Location, S3Operations, parse_s3_uri};

pub use error::{AwsError, classify_anyhow_error, classify_aws_error, classify_sdk_error};
