//! AWS resource types and teardown ordering
//!
//! Resources must be removed in dependency order: the cluster references the
//! role, and IAM refuses to delete a role that still has policies attached.

/// Types of AWS resources managed by the coordinator
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, serde::Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Redshift cluster (references the IAM role)
    RedshiftCluster,
    /// Managed policy attached to the warehouse role
    IamPolicyAttachment,
    /// IAM role assumed by the cluster
    IamRole,
}

impl ResourceKind {
    /// All kinds in teardown order
    pub const TEARDOWN_ORDER: [ResourceKind; 3] = [
        ResourceKind::RedshiftCluster,
        ResourceKind::IamPolicyAttachment,
        ResourceKind::IamRole,
    ];

    /// Get teardown priority (lower number = removed first)
    ///
    /// - 0: Delete the cluster
    /// - 1: Detach the managed policy
    /// - 2: Delete the role (IAM rejects deletion while policies are attached)
    pub fn cleanup_priority(self) -> u8 {
        match self {
            ResourceKind::RedshiftCluster => 0,
            ResourceKind::IamPolicyAttachment => 1,
            ResourceKind::IamRole => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::RedshiftCluster => "redshift-cluster",
            ResourceKind::IamPolicyAttachment => "iam-policy-attachment",
            ResourceKind::IamRole => "iam-role",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detach_before_delete() {
        assert!(
            ResourceKind::IamPolicyAttachment.cleanup_priority()
                < ResourceKind::IamRole.cleanup_priority(),
            "Policy must be detached before the role is deleted"
        );
    }

    #[test]
    fn test_teardown_order_is_sorted_by_priority() {
        let mut sorted = ResourceKind::TEARDOWN_ORDER;
        sorted.sort_by_key(|k| k.cleanup_priority());
        assert_eq!(sorted, ResourceKind::TEARDOWN_ORDER);
    }

    #[test]
    fn test_display_matches_as_str() {
        for kind in ResourceKind::TEARDOWN_ORDER {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }
}
