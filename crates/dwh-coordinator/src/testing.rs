//! Centralized test fixtures and helpers.
//!
//! [`FakeCloud`] is a small stateful stand-in for IAM, Redshift and EC2 that
//! answers with the same error codes the real services use, so idempotence
//! and teardown ordering can be checked across repeated runs.

use crate::aws::{
    AwsError, ClusterDescriptor, Ec2Operations, IamOperations, RedshiftOperations, RoleGrant,
    SecurityRule, classify_aws_error,
};
use crate::config::{ClusterSpec, ConfigDocument, ProvisionSettings};
use anyhow::Result;
use dwh_common::ClusterState;
use dwh_test_utils::config::TEMPLATE;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Mutex;

pub const TEST_ACCOUNT: &str = "123456789012";
pub const TEST_ENDPOINT: &str = "dwhcluster.abc123.us-west-2.redshift.amazonaws.com";
pub const TEST_VPC: &str = "vpc-123";
pub const TEST_CLUSTER_SG: &str = "sg-cluster";
pub const TEST_VPC_DEFAULT_SG: &str = "sg-vpc-default";

/// Settings parsed from the shared config template
pub fn provision_settings() -> ProvisionSettings {
    let doc = ConfigDocument::parse(TEMPLATE).expect("template parses");
    ProvisionSettings::from_document(&doc).expect("template is complete")
}

/// A descriptor for the template cluster in the given service status.
///
/// Only an `available` cluster has an endpoint.
pub fn descriptor(status: &str) -> ClusterDescriptor {
    let state = ClusterState::parse(status);
    let available = state.is_available();
    ClusterDescriptor {
        identifier: "dwhcluster".to_string(),
        status: state,
        node_type: "dc2.large".to_string(),
        master_username: "dwhuser".to_string(),
        db_name: "dwh".to_string(),
        endpoint_address: available.then(|| TEST_ENDPOINT.to_string()),
        endpoint_port: available.then_some(5439),
        number_of_nodes: 4,
        vpc_id: Some(TEST_VPC.to_string()),
        vpc_security_group_ids: vec![TEST_CLUSTER_SG.to_string()],
    }
}

fn aws_error(code: &str, message: &str) -> anyhow::Error {
    anyhow::Error::new(classify_aws_error(Some(code), Some(message)))
}

/// Scripted DescribeClusters answer
#[derive(Debug, Clone)]
pub enum Scripted {
    NotFound,
    Status(&'static str),
    Descriptor(ClusterDescriptor),
}

/// Operations that can be made to fail with `AccessDenied`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    CreateRole,
    DeleteCluster,
    DetachPolicy,
    DeleteRole,
}

#[derive(Debug, Default)]
struct FakeRole {
    arn: String,
    policies: BTreeSet<String>,
}

#[derive(Debug)]
struct FakeCluster {
    spec: ClusterSpec,
    role_arn: String,
}

#[derive(Debug, Default)]
struct FakeState {
    roles: HashMap<String, FakeRole>,
    cluster: Option<FakeCluster>,
    script: VecDeque<Scripted>,
    ingress: HashSet<(String, u16, String)>,
    failing: HashSet<FakeOp>,
    describe_calls: u32,
    create_cluster_calls: u32,
}

/// In-memory IAM, Redshift and EC2
#[derive(Debug, Default)]
pub struct FakeCloud {
    state: Mutex<FakeState>,
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().expect("fake cloud lock"))
    }

    /// Queue describe answers; once drained, describe reflects stored state
    pub fn script_describes(&self, answers: impl IntoIterator<Item = Scripted>) {
        self.with(|s| s.script.extend(answers));
    }

    /// Make an operation fail with `AccessDenied`
    pub fn fail(&self, op: FakeOp) {
        self.with(|s| s.failing.insert(op));
    }

    fn check_failing(s: &FakeState, op: FakeOp) -> Result<()> {
        if s.failing.contains(&op) {
            return Err(aws_error("AccessDenied", &format!("{op:?} denied")));
        }
        Ok(())
    }

    pub fn describe_calls(&self) -> u32 {
        self.with(|s| s.describe_calls)
    }

    pub fn create_cluster_calls(&self) -> u32 {
        self.with(|s| s.create_cluster_calls)
    }

    pub fn role_count(&self) -> usize {
        self.with(|s| s.roles.len())
    }

    pub fn has_role(&self, role_name: &str) -> bool {
        self.with(|s| s.roles.contains_key(role_name))
    }

    pub fn attached_policies(&self, role_name: &str) -> Vec<String> {
        self.with(|s| {
            s.roles
                .get(role_name)
                .map(|r| r.policies.iter().cloned().collect())
                .unwrap_or_default()
        })
    }

    pub fn has_cluster(&self) -> bool {
        self.with(|s| s.cluster.is_some())
    }

    /// Cluster parameters and role ARN the cluster was created with
    pub fn cluster_spec(&self) -> Option<(ClusterSpec, String)> {
        self.with(|s| {
            s.cluster
                .as_ref()
                .map(|c| (c.spec.clone(), c.role_arn.clone()))
        })
    }

    pub fn ingress_rules(&self) -> Vec<(String, u16, String)> {
        self.with(|s| s.ingress.iter().cloned().collect())
    }
}

impl IamOperations for FakeCloud {
    async fn create_role(&self, grant: &RoleGrant, _cluster_identifier: &str) -> Result<()> {
        self.with(|s| {
            Self::check_failing(s, FakeOp::CreateRole)?;
            if s.roles.contains_key(&grant.role_name) {
                return Err(aws_error(
                    "EntityAlreadyExists",
                    &format!("Role with name {} already exists.", grant.role_name),
                ));
            }
            s.roles.insert(
                grant.role_name.clone(),
                FakeRole {
                    arn: format!("arn:aws:iam::{TEST_ACCOUNT}:role/{}", grant.role_name),
                    policies: BTreeSet::new(),
                },
            );
            Ok(())
        })
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.with(|s| match s.roles.get_mut(role_name) {
            Some(role) => {
                role.policies.insert(policy_arn.to_string());
                Ok(())
            }
            None => Err(aws_error("NoSuchEntity", role_name)),
        })
    }

    async fn get_role_arn(&self, role_name: &str) -> Result<String> {
        self.with(|s| {
            s.roles
                .get(role_name)
                .map(|r| r.arn.clone())
                .ok_or_else(|| aws_error("NoSuchEntity", role_name))
        })
    }

    async fn detach_role_policy(&self, role_name: &str, policy_arn: &str) -> Result<()> {
        self.with(|s| {
            Self::check_failing(s, FakeOp::DetachPolicy)?;
            match s.roles.get_mut(role_name) {
                Some(role) if role.policies.remove(policy_arn) => Ok(()),
                _ => Err(aws_error("NoSuchEntity", policy_arn)),
            }
        })
    }

    async fn delete_role(&self, role_name: &str) -> Result<()> {
        self.with(|s| {
            Self::check_failing(s, FakeOp::DeleteRole)?;
            match s.roles.get(role_name) {
                None => Err(aws_error("NoSuchEntity", role_name)),
                Some(role) if !role.policies.is_empty() => Err(aws_error(
                    "DeleteConflict",
                    "Cannot delete entity, must detach all policies first.",
                )),
                Some(_) => {
                    s.roles.remove(role_name);
                    Ok(())
                }
            }
        })
    }
}

impl RedshiftOperations for FakeCloud {
    async fn create_cluster(&self, spec: &ClusterSpec, role_arn: &str) -> Result<()> {
        self.with(|s| {
            s.create_cluster_calls += 1;
            if s.cluster.is_some() {
                return Err(aws_error("ClusterAlreadyExists", "Cluster already exists"));
            }
            s.cluster = Some(FakeCluster {
                spec: spec.clone(),
                role_arn: role_arn.to_string(),
            });
            Ok(())
        })
    }

    async fn describe_cluster(&self, cluster_identifier: &str) -> Result<ClusterDescriptor> {
        self.with(|s| {
            s.describe_calls += 1;
            let not_found = || {
                anyhow::Error::new(AwsError::NotFound {
                    code: "ClusterNotFound".to_string(),
                    message: format!("Cluster {cluster_identifier} not found."),
                })
            };
            match s.script.pop_front() {
                Some(Scripted::NotFound) => Err(not_found()),
                Some(Scripted::Status(status)) => Ok(descriptor(status)),
                Some(Scripted::Descriptor(d)) => Ok(d),
                None if s.cluster.is_some() => Ok(descriptor("available")),
                None => Err(not_found()),
            }
        })
    }

    async fn delete_cluster(&self, cluster_identifier: &str) -> Result<()> {
        self.with(|s| {
            Self::check_failing(s, FakeOp::DeleteCluster)?;
            match s.cluster.take() {
                Some(_) => Ok(()),
                None => Err(aws_error(
                    "ClusterNotFound",
                    &format!("Cluster {cluster_identifier} not found."),
                )),
            }
        })
    }
}

impl Ec2Operations for FakeCloud {
    async fn first_security_group(&self, vpc_id: &str) -> Result<Option<String>> {
        Ok((vpc_id == TEST_VPC).then(|| TEST_VPC_DEFAULT_SG.to_string()))
    }

    async fn authorize_ingress(&self, security_group_id: &str, rule: &SecurityRule) -> Result<()> {
        self.with(|s| {
            let key = (
                security_group_id.to_string(),
                rule.from_port,
                rule.source_cidr.clone(),
            );
            if !s.ingress.insert(key) {
                return Err(aws_error(
                    "InvalidPermission.Duplicate",
                    "the specified rule already exists",
                ));
            }
            Ok(())
        })
    }
}
