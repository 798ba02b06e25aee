//! Typed views over the `dwh.cfg` document

use super::error::ConfigError;
use super::store::ConfigDocument;
use super::template::DynamicKey;
use dwh_common::defaults::{DEFAULT_PORT, DEFAULT_REGION, default_poll_interval};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

fn value<'a>(doc: &'a ConfigDocument, section: &str, key: &str) -> Result<&'a str, ConfigError> {
    if !doc.has_section(section) {
        return Err(ConfigError::MissingSection(section.to_string()));
    }
    match doc.get(section, key) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingKey {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn optional<'a>(doc: &'a ConfigDocument, section: &str, key: &str) -> Option<&'a str> {
    doc.get(section, key).filter(|v| !v.is_empty())
}

/// First whitespace-delimited token, for identifier-like values
fn token(v: &str) -> &str {
    v.split_whitespace().next().unwrap_or("")
}

fn parse_number<T: FromStr>(section: &str, key: &str, raw: &str) -> Result<T, ConfigError> {
    token(raw).parse().map_err(|_| ConfigError::InvalidNumber {
        section: section.to_string(),
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn number<T: FromStr>(doc: &ConfigDocument, section: &str, key: &str) -> Result<T, ConfigError> {
    parse_number(section, key, value(doc, section, key)?)
}

fn optional_number<T: FromStr>(
    doc: &ConfigDocument,
    section: &str,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    optional(doc, section, key)
        .map(|raw| parse_number(section, key, raw))
        .transpose()
}

fn optional_positive<T: FromStr + Default + PartialEq>(
    doc: &ConfigDocument,
    section: &str,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match optional_number::<T>(doc, section, key)? {
        Some(n) if n == T::default() => Err(ConfigError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: optional(doc, section, key).unwrap_or_default().to_string(),
            expected: "a positive integer",
        }),
        n => Ok(n),
    }
}

/// Fail if a dynamic key still holds placeholder syntax
fn resolved(doc: &ConfigDocument, key: DynamicKey) -> Result<String, ConfigError> {
    let v = value(doc, key.section(), key.key())?;
    if v.contains("${") {
        return Err(ConfigError::NotProvisioned {
            section: key.section().to_string(),
            key: key.key().to_string(),
            value: v.to_string(),
        });
    }
    Ok(v.to_string())
}

/// Static access keys from `[AWS]`
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &"** redacted **")
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// AWS region and credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: String,
    /// `None` uses the SDK's default credential chain
    pub credentials: Option<StaticCredentials>,
}

impl AwsSettings {
    pub fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        let region = optional(doc, "AWS", "REGION")
            .map(token)
            .unwrap_or(DEFAULT_REGION)
            .to_string();

        let key = optional(doc, "AWS", "KEY");
        let secret = optional(doc, "AWS", "SECRET");
        let credentials = match (key, secret) {
            (Some(key), Some(secret)) => Some(StaticCredentials {
                access_key_id: token(key).to_string(),
                secret_access_key: token(secret).to_string(),
                session_token: optional(doc, "AWS", "SESSION").map(|s| token(s).to_string()),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteCredentials),
        };

        Ok(Self {
            region,
            credentials,
        })
    }
}

/// Redshift cluster layout
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ClusterType {
    SingleNode,
    MultiNode,
}

/// Parameters submitted to create-cluster. Never changes after submission.
#[derive(Clone, PartialEq, Eq)]
pub struct ClusterSpec {
    pub cluster_type: ClusterType,
    pub node_type: String,
    /// Only sent for multi-node clusters
    pub node_count: u32,
    pub database_name: String,
    pub admin_user: String,
    pub admin_password: String,
    pub cluster_identifier: String,
    pub port: u16,
}

impl fmt::Debug for ClusterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterSpec")
            .field("cluster_type", &self.cluster_type)
            .field("node_type", &self.node_type)
            .field("node_count", &self.node_count)
            .field("database_name", &self.database_name)
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"** redacted **")
            .field("cluster_identifier", &self.cluster_identifier)
            .field("port", &self.port)
            .finish()
    }
}

impl ClusterSpec {
    pub fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        let raw_type = value(doc, "DWH", "DWH_CLUSTER_TYPE")?;
        let cluster_type =
            ClusterType::from_str(token(raw_type)).map_err(|_| ConfigError::InvalidValue {
                section: "DWH".to_string(),
                key: "DWH_CLUSTER_TYPE".to_string(),
                value: raw_type.to_string(),
                expected: "one of single-node, multi-node",
            })?;

        let node_count = match cluster_type {
            ClusterType::MultiNode => number(doc, "DWH", "DWH_NUM_NODES")?,
            ClusterType::SingleNode => optional_number(doc, "DWH", "DWH_NUM_NODES")?.unwrap_or(1),
        };

        Ok(Self {
            cluster_type,
            node_type: token(value(doc, "DWH", "DWH_NODE_TYPE")?).to_string(),
            node_count,
            database_name: token(value(doc, "DWH", "DWH_DB")?).to_string(),
            admin_user: token(value(doc, "DWH", "DWH_DB_USER")?).to_string(),
            admin_password: value(doc, "DWH", "DWH_DB_PASSWORD")?.to_string(),
            cluster_identifier: token(value(doc, "DWH", "DWH_CLUSTER_IDENTIFIER")?).to_string(),
            port: optional_number(doc, "DWH", "DWH_PORT")?.unwrap_or(DEFAULT_PORT),
        })
    }

    pub fn is_multi_node(&self) -> bool {
        self.cluster_type == ClusterType::MultiNode
    }
}

/// Poll timing for the readiness wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// `None` waits forever
    pub timeout: Option<Duration>,
    /// `None` polls forever
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            timeout: None,
            max_attempts: None,
        }
    }
}

impl PollSettings {
    /// `[PROVISION]` is optional; absent keys keep their defaults.
    /// Interval and attempt counts must be positive.
    pub fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            interval: optional_positive::<u64>(doc, "PROVISION", "POLL_INTERVAL_SECS")?
                .map_or(defaults.interval, Duration::from_secs),
            timeout: optional_number::<u64>(doc, "PROVISION", "POLL_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            max_attempts: optional_positive(doc, "PROVISION", "POLL_MAX_ATTEMPTS")?,
        })
    }
}

/// Everything `provision` and `teardown` read from the config
#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub aws: AwsSettings,
    pub cluster: ClusterSpec,
    pub role_name: String,
    pub poll: PollSettings,
}

impl ProvisionSettings {
    pub fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        Ok(Self {
            aws: AwsSettings::from_document(doc)?,
            cluster: ClusterSpec::from_document(doc)?,
            role_name: token(value(doc, "DWH", "DWH_IAM_ROLE_NAME")?).to_string(),
            poll: PollSettings::from_document(doc)?,
        })
    }
}

/// What `teardown` and `status` need: less than a full cluster spec, so a
/// partially edited config can still be cleaned up
#[derive(Debug, Clone)]
pub struct TeardownSettings {
    pub aws: AwsSettings,
    pub cluster_identifier: String,
    pub role_name: String,
}

impl TeardownSettings {
    pub fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        Ok(Self {
            aws: AwsSettings::from_document(doc)?,
            cluster_identifier: token(value(doc, "DWH", "DWH_CLUSTER_IDENTIFIER")?).to_string(),
            role_name: token(value(doc, "DWH", "DWH_IAM_ROLE_NAME")?).to_string(),
        })
    }
}

/// Database connection parameters from `[CLUSTER]`
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub db_name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("db_name", &self.db_name)
            .field("user", &self.user)
            .field("password", &"** redacted **")
            .field("port", &self.port)
            .finish()
    }
}

impl ConnectionSettings {
    /// Fails with `NotProvisioned` while `HOST` is still a placeholder
    pub fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        Ok(Self {
            host: resolved(doc, DynamicKey::Host)?,
            db_name: token(value(doc, "CLUSTER", "DB_NAME")?).to_string(),
            user: token(value(doc, "CLUSTER", "DB_USER")?).to_string(),
            password: value(doc, "CLUSTER", "DB_PASSWORD")?.to_string(),
            port: optional_number(doc, "CLUSTER", "DB_PORT")?.unwrap_or(DEFAULT_PORT),
        })
    }
}

/// S3 locations of the raw event and song data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Sources {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
}

impl S3Sources {
    pub fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        Ok(Self {
            log_data: token(value(doc, "S3", "LOG_DATA")?).to_string(),
            log_jsonpath: token(value(doc, "S3", "LOG_JSONPATH")?).to_string(),
            song_data: token(value(doc, "S3", "SONG_DATA")?).to_string(),
        })
    }
}

/// Everything the ELT commands read from the config
#[derive(Debug, Clone)]
pub struct EltSettings {
    pub region: String,
    pub connection: ConnectionSettings,
    pub role_arn: String,
    pub sources: S3Sources,
}

impl EltSettings {
    pub fn from_document(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        Ok(Self {
            region: AwsSettings::from_document(doc)?.region,
            connection: ConnectionSettings::from_document(doc)?,
            role_arn: resolved(doc, DynamicKey::IamRoleArn)?,
            sources: S3Sources::from_document(doc)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwh_test_utils::config::TEMPLATE;

    fn template() -> ConfigDocument {
        ConfigDocument::parse(TEMPLATE).unwrap()
    }

    #[test]
    fn test_provision_settings_from_template() {
        let settings = ProvisionSettings::from_document(&template()).unwrap();

        assert_eq!(settings.aws.region, "us-west-2");
        assert!(settings.aws.credentials.is_some());
        assert_eq!(settings.cluster.cluster_type, ClusterType::MultiNode);
        assert_eq!(settings.cluster.node_count, 4);
        assert_eq!(settings.cluster.port, 5439);
        assert_eq!(settings.cluster.cluster_identifier, "dwhCluster");
        assert_eq!(settings.role_name, "dwhRole");
        assert_eq!(settings.poll.interval, Duration::from_secs(30));
        assert_eq!(settings.poll.timeout, None);
        assert_eq!(settings.poll.max_attempts, None);
    }

    #[test]
    fn test_teardown_settings_ignore_cluster_shape() {
        let mut doc = template();
        doc.set("DWH", "DWH_NODE_TYPE", "");
        doc.set("DWH", "DWH_CLUSTER_TYPE", "bogus");
        let settings = TeardownSettings::from_document(&doc).unwrap();
        assert_eq!(settings.cluster_identifier, "dwhCluster");
        assert_eq!(settings.role_name, "dwhRole");
    }

    #[test]
    fn test_single_node_without_count() {
        let mut doc = template();
        doc.set("DWH", "DWH_CLUSTER_TYPE", "single-node");
        doc.set("DWH", "DWH_NUM_NODES", "");
        let spec = ClusterSpec::from_document(&doc).unwrap();
        assert!(!spec.is_multi_node());
        assert_eq!(spec.node_count, 1);
    }

    #[test]
    fn test_multi_node_requires_count() {
        let mut doc = template();
        doc.set("DWH", "DWH_NUM_NODES", "");
        let err = ClusterSpec::from_document(&doc).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { ref key, .. } if key == "DWH_NUM_NODES"));
    }

    #[test]
    fn test_unknown_cluster_type() {
        let mut doc = template();
        doc.set("DWH", "DWH_CLUSTER_TYPE", "three-node");
        assert!(matches!(
            ClusterSpec::from_document(&doc),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_invalid_port() {
        let mut doc = template();
        doc.set("DWH", "DWH_PORT", "not-a-port");
        assert!(matches!(
            ClusterSpec::from_document(&doc),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_number_uses_first_token() {
        let mut doc = template();
        doc.set("DWH", "DWH_NUM_NODES", "2 nodes");
        assert_eq!(ClusterSpec::from_document(&doc).unwrap().node_count, 2);
    }

    #[test]
    fn test_missing_section() {
        let doc = ConfigDocument::parse("[AWS]\nREGION=us-east-1\n").unwrap();
        assert!(matches!(
            ClusterSpec::from_document(&doc),
            Err(ConfigError::MissingSection(ref s)) if s == "DWH"
        ));
    }

    #[test]
    fn test_credentials_must_be_paired() {
        let doc = ConfigDocument::parse("[AWS]\nKEY=abc\n").unwrap();
        assert!(matches!(
            AwsSettings::from_document(&doc),
            Err(ConfigError::IncompleteCredentials)
        ));
    }

    #[test]
    fn test_default_chain_and_region() {
        let doc = ConfigDocument::parse("[AWS]\n").unwrap();
        let aws = AwsSettings::from_document(&doc).unwrap();
        assert_eq!(aws.region, DEFAULT_REGION);
        assert!(aws.credentials.is_none());
    }

    #[test]
    fn test_session_token_read() {
        let mut doc = template();
        doc.set("AWS", "SESSION", "FwoGZXIvYXdzEXAMPLE");
        let creds = AwsSettings::from_document(&doc).unwrap().credentials.unwrap();
        assert_eq!(creds.session_token.as_deref(), Some("FwoGZXIvYXdzEXAMPLE"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = ProvisionSettings::from_document(&template()).unwrap();
        let debug = format!("{settings:?}");
        assert!(!debug.contains("wJalrXUtnFEMI"));
        assert!(!debug.contains("Passw0rd"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_poll_settings_override() {
        let mut doc = template();
        doc.set("PROVISION", "POLL_INTERVAL_SECS", "5");
        doc.set("PROVISION", "POLL_TIMEOUT_SECS", "600");
        doc.set("PROVISION", "POLL_MAX_ATTEMPTS", "3");
        let poll = PollSettings::from_document(&doc).unwrap();
        assert_eq!(poll.interval, Duration::from_secs(5));
        assert_eq!(poll.timeout, Some(Duration::from_secs(600)));
        assert_eq!(poll.max_attempts, Some(3));
    }

    #[test]
    fn test_poll_settings_reject_zero() {
        for key in ["POLL_INTERVAL_SECS", "POLL_MAX_ATTEMPTS"] {
            let mut doc = template();
            doc.set("PROVISION", key, "0");
            match PollSettings::from_document(&doc) {
                Err(ConfigError::InvalidValue { key: k, value, .. }) => {
                    assert_eq!(k, key);
                    assert_eq!(value, "0");
                }
                other => panic!("unexpected: {other:?}"),
            }
        }

        let mut doc = template();
        doc.set("PROVISION", "POLL_TIMEOUT_SECS", "0");
        assert!(PollSettings::from_document(&doc).is_ok());
    }

    #[test]
    fn test_connection_requires_provisioned_host() {
        let err = ConnectionSettings::from_document(&template()).unwrap_err();
        assert!(matches!(err, ConfigError::NotProvisioned { ref key, .. } if key == "HOST"));
    }

    #[test]
    fn test_elt_settings_after_provision() {
        let mut doc = template();
        doc.set("CLUSTER", "HOST", "dwhcluster.example.redshift.amazonaws.com");
        doc.set("IAM_ROLE", "IAM_ROLE_ARN", "arn:aws:iam::123456789012:role/dwhRole");
        let elt = EltSettings::from_document(&doc).unwrap();
        assert_eq!(elt.connection.port, 5439);
        assert_eq!(elt.connection.db_name, "dwh");
        assert_eq!(elt.role_arn, "arn:aws:iam::123456789012:role/dwhRole");
        assert_eq!(elt.sources.song_data, "s3://udacity-dend/song_data");
    }

    #[test]
    fn test_elt_settings_requires_role_arn() {
        let mut doc = template();
        doc.set("CLUSTER", "HOST", "dwhcluster.example.redshift.amazonaws.com");
        let err = EltSettings::from_document(&doc).unwrap_err();
        assert!(matches!(err, ConfigError::NotProvisioned { ref key, .. } if key == "IAM_ROLE_ARN"));
    }
}
