//! Orchestration errors

use crate::config::ConfigError;
use crate::wait::WaitError;
use thiserror::Error;

/// Fatal provisioning failures.
///
/// Idempotent conflicts (existing role, existing cluster, duplicate ingress
/// rule) never reach this type.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("failed to validate AWS account")]
    Account(#[source] anyhow::Error),

    #[error("failed to prepare IAM role {role_name}")]
    Role {
        role_name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cluster {cluster} did not become available")]
    Wait {
        cluster: String,
        #[source]
        source: WaitError,
    },

    #[error("cluster {cluster} is available but reports no endpoint address")]
    MissingEndpoint { cluster: String },

    #[error("no security group found for cluster {cluster} (vpc: {})", vpc_id.as_deref().unwrap_or("unknown"))]
    NoSecurityGroup {
        cluster: String,
        vpc_id: Option<String>,
    },

    #[error("failed to look up security groups for cluster {cluster}")]
    SecurityGroupLookup {
        cluster: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to open port {port} on security group {security_group_id}")]
    Ingress {
        security_group_id: String,
        port: u16,
        #[source]
        source: anyhow::Error,
    },
}

impl ProvisionError {
    /// True when the operator interrupted the wait
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ProvisionError::Wait {
                source: WaitError::Cancelled { .. },
                ..
            }
        )
    }
}
