//! Orchestration result types

use crate::aws::ClusterDescriptor;
use dwh_common::ResourceKind;
use serde::Serialize;

/// What a successful `provision` produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    pub role_arn: String,
    /// Endpoint address written to `CLUSTER.HOST`
    pub endpoint: String,
    pub port: u16,
    pub security_group_id: String,
    pub descriptor: ClusterDescriptor,
}

/// Result of a single teardown step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "kebab-case")]
pub enum CleanupResult {
    /// Resource was deleted (or detached)
    Deleted,
    /// Resource was already gone
    AlreadyDeleted,
    /// The step failed; teardown continued anyway
    Failed(String),
}

impl CleanupResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, CleanupResult::Failed(_))
    }
}

impl std::fmt::Display for CleanupResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupResult::Deleted => f.write_str("deleted"),
            CleanupResult::AlreadyDeleted => f.write_str("already deleted"),
            CleanupResult::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Outcome of every teardown step, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub steps: Vec<(ResourceKind, CleanupResult)>,
    /// Set when resetting the config placeholders failed
    pub reset_error: Option<String>,
}

impl TeardownReport {
    /// True when no step failed and the config was reset
    pub fn is_clean(&self) -> bool {
        self.reset_error.is_none() && !self.steps.iter().any(|(_, r)| r.is_failed())
    }

    pub fn failures(&self) -> impl Iterator<Item = (ResourceKind, &str)> {
        self.steps.iter().filter_map(|(kind, result)| match result {
            CleanupResult::Failed(reason) => Some((*kind, reason.as_str())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_is_clean() {
        let mut report = TeardownReport {
            steps: vec![
                (ResourceKind::RedshiftCluster, CleanupResult::Deleted),
                (ResourceKind::IamPolicyAttachment, CleanupResult::AlreadyDeleted),
            ],
            reset_error: None,
        };
        assert!(report.is_clean());
        assert_eq!(report.failures().count(), 0);

        report
            .steps
            .push((ResourceKind::IamRole, CleanupResult::Failed("DeleteConflict".into())));
        assert!(!report.is_clean());
        assert_eq!(
            report.failures().collect::<Vec<_>>(),
            vec![(ResourceKind::IamRole, "DeleteConflict")]
        );
    }

    #[test]
    fn test_reset_error_makes_report_unclean() {
        let report = TeardownReport {
            steps: vec![],
            reset_error: Some("permission denied".to_string()),
        };
        assert!(!report.is_clean());
    }

    #[test]
    fn test_cleanup_result_display() {
        assert_eq!(CleanupResult::Deleted.to_string(), "deleted");
        assert_eq!(
            CleanupResult::Failed("boom".into()).to_string(),
            "failed: boom"
        );
    }
}
