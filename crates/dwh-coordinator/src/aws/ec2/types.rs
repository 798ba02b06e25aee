//! EC2 types

use dwh_common::defaults::OPEN_CIDR;

/// One inbound TCP rule on a security group.
///
/// At most one rule exists per (port, cidr); authorizing a duplicate is
/// treated as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRule {
    pub protocol: &'static str,
    pub from_port: u16,
    pub to_port: u16,
    pub source_cidr: String,
}

impl SecurityRule {
    /// TCP access to a single port from anywhere
    pub fn open_tcp(port: u16) -> Self {
        Self {
            protocol: "tcp",
            from_port: port,
            to_port: port,
            source_cidr: OPEN_CIDR.to_string(),
        }
    }
}
