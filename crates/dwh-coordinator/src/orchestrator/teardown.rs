//! Best-effort teardown
//!
//! Resources are removed in [`ResourceKind::TEARDOWN_ORDER`]. Every step runs
//! even if an earlier one failed; failures end up in the [`TeardownReport`].

use super::progress::{Phase, ProgressReporter};
use super::types::{CleanupResult, TeardownReport};
use crate::aws::error::is_not_found;
use crate::aws::{IamOperations, RedshiftOperations};
use crate::config::{TeardownSettings, reset_placeholders};
use anyhow::Result;
use dwh_common::ResourceKind;
use dwh_common::defaults::S3_READ_ONLY_POLICY_ARN;
use std::path::Path;
use tracing::{info, instrument};

/// Deletes the cluster and the role it assumes
pub struct Teardown<'a, I, R> {
    iam: &'a I,
    redshift: &'a R,
    reporter: &'a dyn ProgressReporter,
}

impl<'a, I, R> Teardown<'a, I, R>
where
    I: IamOperations,
    R: RedshiftOperations,
{
    pub fn new(iam: &'a I, redshift: &'a R, reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            iam,
            redshift,
            reporter,
        }
    }

    async fn delete(&self, kind: ResourceKind, settings: &TeardownSettings) -> Result<()> {
        match kind {
            ResourceKind::RedshiftCluster => {
                self.redshift
                    .delete_cluster(&settings.cluster_identifier)
                    .await
            }
            ResourceKind::IamPolicyAttachment => {
                self.iam
                    .detach_role_policy(&settings.role_name, S3_READ_ONLY_POLICY_ARN)
                    .await
            }
            ResourceKind::IamRole => self.iam.delete_role(&settings.role_name).await,
        }
    }

    /// Run every step and collect the results. Never fails.
    pub async fn run(&self, settings: &TeardownSettings) -> TeardownReport {
        let mut report = TeardownReport::default();

        for kind in ResourceKind::TEARDOWN_ORDER {
            let result = match self.delete(kind, settings).await {
                Ok(()) => CleanupResult::Deleted,
                Err(e) if is_not_found(&e) => CleanupResult::AlreadyDeleted,
                Err(e) => CleanupResult::Failed(format!("{e:#}")),
            };
            self.reporter.report_cleanup(kind, &result);
            report.steps.push((kind, result));
        }

        report
    }
}

/// Tear down the resources named in `settings`, then reset the config at
/// `path` back to its placeholder form.
///
/// The reset runs whatever happened to the AWS resources.
#[instrument(skip_all, fields(cluster = %settings.cluster_identifier, role = %settings.role_name))]
pub async fn teardown_with<I, R>(
    path: &Path,
    settings: &TeardownSettings,
    iam: &I,
    redshift: &R,
    reporter: &dyn ProgressReporter,
) -> TeardownReport
where
    I: IamOperations,
    R: RedshiftOperations,
{
    reporter.report_phase(Phase::TearingDown);
    let mut report = Teardown::new(iam, redshift, reporter).run(settings).await;

    reporter.report_phase(Phase::ResettingConfig);
    if let Err(e) = reset_placeholders(path) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to reset config placeholders");
        report.reset_error = Some(e.to_string());
    }

    info!(
        clean = report.is_clean(),
        failures = report.failures().count(),
        "Teardown finished"
    );
    reporter.report_phase(Phase::Done);
    report
}
