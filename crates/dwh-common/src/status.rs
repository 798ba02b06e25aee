//! Redshift cluster lifecycle states
//!
//! The managed service advances these states on its own; the coordinator only
//! observes them while polling.

/// Cluster state as observed through `DescribeClusters`
///
/// `NotFound` is not a service status string: it is reported when the
/// describe call itself fails because the cluster is not (yet) visible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, strum::EnumString, strum::IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum ClusterState {
    /// Cluster is being created
    #[default]
    #[strum(serialize = "creating")]
    Creating,
    /// Cluster accepts connections
    #[strum(serialize = "available")]
    Available,
    /// Cluster is being deleted
    #[strum(serialize = "deleting")]
    Deleting,
    /// Cluster is not visible to the API
    #[strum(serialize = "not-found")]
    NotFound,
    /// Any other service status (modifying, rebooting, ...)
    #[strum(default)]
    Other(String),
}

impl std::fmt::Display for ClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterState::Other(raw) => f.write_str(raw),
            known => f.write_str(known.into()),
        }
    }
}

impl ClusterState {
    /// Parse a service status string. Unknown values map to `Other`.
    pub fn parse(s: &str) -> Self {
        s.parse()
            .unwrap_or_else(|_| ClusterState::Other(s.to_string()))
    }

    /// Check if the cluster is ready for connections
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}
