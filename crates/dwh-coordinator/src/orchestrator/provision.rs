//! Cluster provisioning sequence
//!
//! role → cluster → wait until available → open the database port.
//! Each step is safe to re-run against resources left by an earlier run.

use super::error::ProvisionError;
use super::progress::{Phase, ProgressReporter};
use super::types::ProvisionOutcome;
use crate::aws::error::{is_already_exists, is_not_found};
use crate::aws::{
    ClusterDescriptor, Ec2Operations, IamOperations, RedshiftOperations, RoleGrant, SecurityRule,
};
use crate::config::{ClusterSpec, ProvisionSettings};
use crate::wait::{PollConfig, poll_until};
use dwh_common::ClusterState;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Runs the provisioning steps against a set of AWS operations
pub struct Provisioner<'a, I, R, E> {
    iam: &'a I,
    redshift: &'a R,
    ec2: &'a E,
    reporter: &'a dyn ProgressReporter,
    cancel: Option<&'a CancellationToken>,
}

impl<'a, I, R, E> Provisioner<'a, I, R, E>
where
    I: IamOperations,
    R: RedshiftOperations,
    E: Ec2Operations,
{
    pub fn new(iam: &'a I, redshift: &'a R, ec2: &'a E, reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            iam,
            redshift,
            ec2,
            reporter,
            cancel: None,
        }
    }

    /// Abort the readiness wait when the token fires
    pub fn with_cancel(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Make sure the role exists with its policy attached and return its ARN.
    ///
    /// An existing role is reused. Attaching an attached policy is a no-op.
    pub async fn ensure_role(
        &self,
        grant: &RoleGrant,
        cluster_identifier: &str,
    ) -> Result<String, ProvisionError> {
        let role_error = |source| ProvisionError::Role {
            role_name: grant.role_name.clone(),
            source,
        };

        match self.iam.create_role(grant, cluster_identifier).await {
            Ok(()) => info!(role_name = %grant.role_name, "IAM role created"),
            Err(e) if is_already_exists(&e) => {
                info!(role_name = %grant.role_name, "IAM role already exists, continuing")
            }
            Err(e) => return Err(role_error(e)),
        }

        self.iam
            .attach_role_policy(&grant.role_name, &grant.attached_policy_arn)
            .await
            .map_err(role_error)?;

        let arn = self
            .iam
            .get_role_arn(&grant.role_name)
            .await
            .map_err(role_error)?;
        info!(role_arn = %arn, "IAM role ready");
        Ok(arn)
    }

    /// Submit cluster creation. Never fails: an existing cluster, or any
    /// other rejection, is logged and the readiness wait decides the outcome.
    pub async fn submit_cluster(&self, spec: &ClusterSpec, role_arn: &str) {
        match self.redshift.create_cluster(spec, role_arn).await {
            Ok(()) => info!(cluster = %spec.cluster_identifier, "Cluster creation submitted"),
            Err(e) if is_already_exists(&e) => {
                info!(cluster = %spec.cluster_identifier, "Cluster already exists, continuing")
            }
            Err(e) => {
                warn!(cluster = %spec.cluster_identifier, error = %format!("{e:#}"), "Cluster creation failed, waiting anyway")
            }
        }
    }

    /// Poll until the cluster reports `available`.
    ///
    /// A cluster that is not visible yet counts as still creating.
    pub async fn wait_until_available(
        &self,
        cluster_identifier: &str,
        poll: &PollConfig,
    ) -> Result<ClusterDescriptor, ProvisionError> {
        info!(
            cluster = %cluster_identifier,
            interval_secs = poll.interval.as_secs(),
            "Waiting for cluster to become available"
        );

        poll_until(poll, self.cancel, cluster_identifier, is_not_found, |attempt| async move {
            match self.redshift.describe_cluster(cluster_identifier).await {
                Ok(descriptor) => {
                    self.reporter
                        .report_cluster_status(cluster_identifier, &descriptor.status, attempt);
                    Ok(descriptor.status.is_available().then_some(descriptor))
                }
                Err(e) => {
                    if is_not_found(&e) {
                        self.reporter.report_cluster_status(
                            cluster_identifier,
                            &ClusterState::NotFound,
                            attempt,
                        );
                    }
                    Err(e)
                }
            }
        })
        .await
        .map_err(|source| ProvisionError::Wait {
            cluster: cluster_identifier.to_string(),
            source,
        })
    }

    /// Resolve the security group guarding the cluster: its first VPC
    /// security group, else the first group in its VPC.
    async fn security_group_for(
        &self,
        descriptor: &ClusterDescriptor,
    ) -> Result<String, ProvisionError> {
        if let Some(group) = descriptor.vpc_security_group_ids.first() {
            return Ok(group.clone());
        }

        let no_group = || ProvisionError::NoSecurityGroup {
            cluster: descriptor.identifier.clone(),
            vpc_id: descriptor.vpc_id.clone(),
        };
        let vpc_id = descriptor.vpc_id.as_deref().ok_or_else(no_group)?;

        self.ec2
            .first_security_group(vpc_id)
            .await
            .map_err(|source| ProvisionError::SecurityGroupLookup {
                cluster: descriptor.identifier.clone(),
                source,
            })?
            .ok_or_else(no_group)
    }

    /// Open the database port on the cluster's security group.
    ///
    /// An identical existing rule counts as success.
    pub async fn authorize_ingress(
        &self,
        descriptor: &ClusterDescriptor,
        port: u16,
    ) -> Result<String, ProvisionError> {
        let group = self.security_group_for(descriptor).await?;
        let rule = SecurityRule::open_tcp(port);

        match self.ec2.authorize_ingress(&group, &rule).await {
            Ok(()) => {}
            Err(e) if is_already_exists(&e) => {
                info!(security_group = %group, port, "Ingress rule already exists")
            }
            Err(source) => {
                return Err(ProvisionError::Ingress {
                    security_group_id: group,
                    port,
                    source,
                });
            }
        }
        Ok(group)
    }

    /// Run every provisioning step in order
    #[instrument(skip_all, fields(cluster = %settings.cluster.cluster_identifier))]
    pub async fn provision(
        &self,
        settings: &ProvisionSettings,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let spec = &settings.cluster;
        let grant = RoleGrant::for_warehouse(&settings.role_name);

        self.reporter.report_phase(Phase::EnsuringRole);
        let role_arn = self.ensure_role(&grant, &spec.cluster_identifier).await?;

        self.reporter.report_phase(Phase::CreatingCluster);
        self.submit_cluster(spec, &role_arn).await;

        self.reporter.report_phase(Phase::WaitingForCluster);
        let descriptor = self
            .wait_until_available(&spec.cluster_identifier, &PollConfig::from(settings.poll))
            .await?;
        for (key, value) in descriptor.summary_rows() {
            info!("{key:>18}: {value}");
        }

        let endpoint = descriptor
            .endpoint_address
            .clone()
            .ok_or_else(|| ProvisionError::MissingEndpoint {
                cluster: spec.cluster_identifier.clone(),
            })?;

        self.reporter.report_phase(Phase::AuthorizingIngress);
        let security_group_id = self.authorize_ingress(&descriptor, spec.port).await?;

        info!(endpoint = %endpoint, role_arn = %role_arn, "Cluster provisioned");
        Ok(ProvisionOutcome {
            role_arn,
            endpoint,
            port: spec.port,
            security_group_id,
            descriptor,
        })
    }
}
