//! Redshift types

use dwh_common::ClusterState;
use serde::{Serialize, Serializer};
use std::fmt::Display;

fn as_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Snapshot of a cluster as returned by DescribeClusters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterDescriptor {
    pub identifier: String,
    #[serde(serialize_with = "as_display")]
    pub status: ClusterState,
    pub node_type: String,
    pub master_username: String,
    pub db_name: String,
    /// Only present once the cluster is available
    pub endpoint_address: Option<String>,
    pub endpoint_port: Option<u16>,
    pub number_of_nodes: u32,
    pub vpc_id: Option<String>,
    pub vpc_security_group_ids: Vec<String>,
}

impl ClusterDescriptor {
    pub(crate) fn from_sdk(cluster: &aws_sdk_redshift::types::Cluster) -> Self {
        let endpoint = cluster.endpoint();
        Self {
            identifier: cluster.cluster_identifier().unwrap_or_default().to_string(),
            status: cluster
                .cluster_status()
                .map(ClusterState::parse)
                .unwrap_or_default(),
            node_type: cluster.node_type().unwrap_or_default().to_string(),
            master_username: cluster.master_username().unwrap_or_default().to_string(),
            db_name: cluster.db_name().unwrap_or_default().to_string(),
            endpoint_address: endpoint.and_then(|e| e.address()).map(str::to_string),
            endpoint_port: endpoint
                .and_then(|e| e.port())
                .and_then(|p| u16::try_from(p).ok()),
            number_of_nodes: cluster
                .number_of_nodes()
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or_default(),
            vpc_id: cluster.vpc_id().map(str::to_string),
            vpc_security_group_ids: cluster
                .vpc_security_groups()
                .iter()
                .filter_map(|g| g.vpc_security_group_id())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Endpoint as `address:port`, if the cluster has one yet
    pub fn endpoint(&self) -> Option<String> {
        let address = self.endpoint_address.as_deref()?;
        Some(match self.endpoint_port {
            Some(port) => format!("{address}:{port}"),
            None => address.to_string(),
        })
    }

    /// Key/value rows for the human-readable cluster summary
    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
        vec![
            ("ClusterIdentifier", self.identifier.clone()),
            ("NodeType", self.node_type.clone()),
            ("ClusterStatus", self.status.to_string()),
            ("MasterUsername", self.master_username.clone()),
            ("DBName", self.db_name.clone()),
            ("Endpoint", or_dash(self.endpoint())),
            ("NumberOfNodes", self.number_of_nodes.to_string()),
            ("VpcId", or_dash(self.vpc_id.clone())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_redshift::types::{Cluster, Endpoint, VpcSecurityGroupMembership};

    fn sdk_cluster() -> Cluster {
        Cluster::builder()
            .cluster_identifier("dwhcluster")
            .cluster_status("available")
            .node_type("dc2.large")
            .master_username("dwhuser")
            .db_name("dwh")
            .endpoint(
                Endpoint::builder()
                    .address("dwhcluster.abc.us-west-2.redshift.amazonaws.com")
                    .port(5439)
                    .build(),
            )
            .number_of_nodes(4)
            .vpc_id("vpc-123")
            .vpc_security_groups(
                VpcSecurityGroupMembership::builder()
                    .vpc_security_group_id("sg-abc")
                    .status("active")
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_from_sdk() {
        let d = ClusterDescriptor::from_sdk(&sdk_cluster());
        assert_eq!(d.identifier, "dwhcluster");
        assert!(d.status.is_available());
        assert_eq!(d.number_of_nodes, 4);
        assert_eq!(d.endpoint_port, Some(5439));
        assert_eq!(d.vpc_security_group_ids, vec!["sg-abc".to_string()]);
    }

    #[test]
    fn test_creating_cluster_has_no_endpoint() {
        let cluster = Cluster::builder()
            .cluster_identifier("dwhcluster")
            .cluster_status("creating")
            .build();
        let d = ClusterDescriptor::from_sdk(&cluster);
        assert_eq!(d.status, ClusterState::Creating);
        assert_eq!(d.endpoint(), None);
        assert!(d.vpc_security_group_ids.is_empty());
    }

    #[test]
    fn test_summary_rows() {
        let d = ClusterDescriptor::from_sdk(&sdk_cluster());
        let rows = d.summary_rows();
        let keys: Vec<_> = rows.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "ClusterIdentifier",
                "NodeType",
                "ClusterStatus",
                "MasterUsername",
                "DBName",
                "Endpoint",
                "NumberOfNodes",
                "VpcId"
            ]
        );
        assert_eq!(
            rows[5].1,
            "dwhcluster.abc.us-west-2.redshift.amazonaws.com:5439"
        );
    }

    #[test]
    fn test_json_status_is_string() {
        let json = serde_json::to_value(ClusterDescriptor::from_sdk(&sdk_cluster())).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["number_of_nodes"], 4);
    }
}
