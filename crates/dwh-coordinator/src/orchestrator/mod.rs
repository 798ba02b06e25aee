//! Cluster lifecycle orchestration
//!
//! `provision` brings up the role, the cluster and its ingress rule, then
//! writes the endpoint and role ARN back into `dwh.cfg`. `teardown` reverses
//! it step by step and restores the placeholders.
//!
//! The `run_*` functions build real AWS clients from the config; the `*_with`
//! variants take any implementation of the operation traits.

pub mod error;
pub mod progress;
pub mod provision;
pub mod render;
pub mod teardown;
pub mod types;

pub use error::ProvisionError;
pub use progress::{LogReporter, Phase, ProgressReporter};
pub use provision::Provisioner;
pub use render::{cluster_table, teardown_table};
pub use teardown::{Teardown, teardown_with};
pub use types::{CleanupResult, ProvisionOutcome, TeardownReport};

use crate::aws::{
    AwsContext, ClusterDescriptor, Ec2Client, Ec2Operations, FromAwsContext, IamClient,
    IamOperations, RedshiftClient, RedshiftOperations, get_current_account_id,
};
use crate::config::{
    ConfigDocument, ConfigError, ProvisionSettings, ResolvedValues, TeardownSettings,
    reset_placeholders, write_resolved,
};
use anyhow::Context;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Provision the warehouse described by the config at `path`
#[instrument(skip_all, fields(config = %path.display()))]
pub async fn run_provision(
    path: &Path,
    reporter: &dyn ProgressReporter,
    cancel: Option<&CancellationToken>,
) -> Result<ProvisionOutcome, ProvisionError> {
    // A previous run may have left resolved values behind
    reset_placeholders(path)?;
    let settings = ProvisionSettings::from_document(&ConfigDocument::load(path)?)?;

    let ctx = AwsContext::from_settings(&settings.aws).await;
    reporter.report_phase(Phase::ValidatingAccount);
    let account = get_current_account_id(&ctx)
        .await
        .map_err(ProvisionError::Account)?;
    reporter.report_account_info(&account);

    let iam = IamClient::from_context(&ctx);
    let redshift = RedshiftClient::from_context(&ctx);
    let ec2 = Ec2Client::from_context(&ctx);

    provision_with(path, &settings, &iam, &redshift, &ec2, reporter, cancel).await
}

/// Provision with the given operations and write the results to `path`
pub async fn provision_with<I, R, E>(
    path: &Path,
    settings: &ProvisionSettings,
    iam: &I,
    redshift: &R,
    ec2: &E,
    reporter: &dyn ProgressReporter,
    cancel: Option<&CancellationToken>,
) -> Result<ProvisionOutcome, ProvisionError>
where
    I: IamOperations,
    R: RedshiftOperations,
    E: Ec2Operations,
{
    let mut provisioner = Provisioner::new(iam, redshift, ec2, reporter);
    if let Some(token) = cancel {
        provisioner = provisioner.with_cancel(token);
    }
    let outcome = provisioner.provision(settings).await?;

    reporter.report_phase(Phase::WritingConfig);
    write_resolved(
        path,
        &ResolvedValues {
            host: outcome.endpoint.clone(),
            role_arn: outcome.role_arn.clone(),
        },
    )?;

    reporter.report_phase(Phase::Done);
    Ok(outcome)
}

/// Tear down the warehouse named in the config at `path`.
///
/// Only an unreadable config is an error; AWS failures are in the report.
#[instrument(skip_all, fields(config = %path.display()))]
pub async fn run_teardown(
    path: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<TeardownReport, ConfigError> {
    let settings = TeardownSettings::from_document(&ConfigDocument::load(path)?)?;
    let ctx = AwsContext::from_settings(&settings.aws).await;

    reporter.report_phase(Phase::ValidatingAccount);
    match get_current_account_id(&ctx).await {
        Ok(account) => reporter.report_account_info(&account),
        Err(e) => warn!(error = %format!("{e:#}"), "Could not validate AWS account, continuing"),
    }

    let iam = IamClient::from_context(&ctx);
    let redshift = RedshiftClient::from_context(&ctx);
    Ok(teardown_with(path, &settings, &iam, &redshift, reporter).await)
}

/// Describe the cluster named in the config at `path`
pub async fn run_status(path: &Path) -> anyhow::Result<ClusterDescriptor> {
    let settings = TeardownSettings::from_document(&ConfigDocument::load(path)?)?;
    let ctx = AwsContext::from_settings(&settings.aws).await;
    let redshift = RedshiftClient::from_context(&ctx);

    let descriptor = redshift
        .describe_cluster(&settings.cluster_identifier)
        .await
        .with_context(|| format!("Cluster {} is not reachable", settings.cluster_identifier))?;
    info!(cluster = %descriptor.identifier, status = %descriptor.status, "Cluster described");
    Ok(descriptor)
}
