//! AWS resource tag constants
//!
//! The role and cluster created by the coordinator carry these tags so they
//! can be recognised in the console and by later cleanup.
//!
//! ## Tag Schema
//!
//! | Tag Key | Description |
//! |---------|-------------|
//! | `dwh:tool` | Static identifier ("dwh-coordinator") |
//! | `dwh:created-at` | RFC 3339 creation timestamp |
//! | `dwh:cluster` | Cluster identifier the resource belongs to |

/// Tag key for tool identification
pub const TAG_TOOL: &str = "dwh:tool";

/// Tag value for tool identification
pub const TAG_TOOL_VALUE: &str = "dwh-coordinator";

/// Tag key for creation timestamp (RFC 3339 format)
pub const TAG_CREATED_AT: &str = "dwh:created-at";

/// Tag key linking a resource to its cluster identifier
pub const TAG_CLUSTER: &str = "dwh:cluster";

/// Helper to format creation timestamp for tags
pub fn format_created_at(time: chrono::DateTime<chrono::Utc>) -> String {
    time.to_rfc3339()
}

/// Standard tag set for a resource belonging to `cluster_identifier`.
pub fn standard_tags(
    cluster_identifier: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> Vec<(&'static str, String)> {
    vec![
        (TAG_TOOL, TAG_TOOL_VALUE.to_string()),
        (TAG_CREATED_AT, format_created_at(now)),
        (TAG_CLUSTER, cluster_identifier.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_created_at_is_rfc3339() {
        let now = Utc::now();
        let formatted = format_created_at(now);
        let parsed = chrono::DateTime::parse_from_rfc3339(&formatted).unwrap();

        let diff = (now - parsed.with_timezone(&Utc)).num_seconds().abs();
        assert!(diff <= 1, "Roundtrip diff {} > 1 second", diff);
    }

    #[test]
    fn test_standard_tags() {
        let tags = standard_tags("dwhCluster", Utc::now());
        let keys: Vec<_> = tags.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![TAG_TOOL, TAG_CREATED_AT, TAG_CLUSTER]);
        assert_eq!(tags[2].1, "dwhCluster");
    }
}
