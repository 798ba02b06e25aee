//! Progress reporting abstractions for the orchestrator
//!
//! Provisioning and teardown report what they are doing through
//! [`ProgressReporter`]; the CLI logs it, tests record it.

use super::types::CleanupResult;
use dwh_common::{ClusterState, ResourceKind};
use tracing::{info, warn};

/// Provisioning and teardown phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    ValidatingAccount,
    EnsuringRole,
    CreatingCluster,
    WaitingForCluster,
    AuthorizingIngress,
    WritingConfig,
    TearingDown,
    ResettingConfig,
    Done,
}

/// Trait for reporting orchestration progress
pub trait ProgressReporter: Send + Sync {
    /// Report a phase change
    fn report_phase(&self, phase: Phase);

    /// Report AWS account info
    fn report_account_info(&self, account_id: &str);

    /// Report a cluster status observed while polling
    fn report_cluster_status(&self, cluster_identifier: &str, state: &ClusterState, attempt: u32);

    /// Report the result of a teardown step
    fn report_cleanup(&self, kind: ResourceKind, result: &CleanupResult);
}

/// Progress reporter that logs through `tracing`
#[derive(Debug, Default)]
pub struct LogReporter;

impl LogReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for LogReporter {
    fn report_phase(&self, phase: Phase) {
        info!(phase = %phase, "Phase");
    }

    fn report_account_info(&self, account_id: &str) {
        info!(account_id = %account_id, "Using AWS account");
    }

    fn report_cluster_status(&self, cluster_identifier: &str, state: &ClusterState, attempt: u32) {
        match state {
            ClusterState::NotFound => {
                info!(cluster = %cluster_identifier, attempt, "Cluster not found yet, waiting")
            }
            _ => info!(cluster = %cluster_identifier, status = %state, attempt, "Cluster status"),
        }
    }

    fn report_cleanup(&self, kind: ResourceKind, result: &CleanupResult) {
        match result {
            CleanupResult::Failed(reason) => {
                warn!(resource = %kind, error = %reason, "Teardown step failed, continuing")
            }
            _ => info!(resource = %kind, result = %result, "Teardown step"),
        }
    }
}
