//! Warehouse configuration
//!
//! `dwh.cfg` is both input (cluster topology, credentials, connection
//! parameters) and output (endpoint host and role ARN written back after
//! provisioning).
//!
//! - [`store`]: line-preserving sectioned key/value document
//! - [`template`]: `${name}` placeholder handling
//! - [`settings`]: typed views used by the commands
//! - [`writer`]: write-back and placeholder reset

pub mod error;
pub mod settings;
pub mod store;
pub mod template;
pub mod writer;

pub use error::ConfigError;
pub use settings::{
    AwsSettings, ClusterSpec, ClusterType, ConnectionSettings, EltSettings, PollSettings,
    ProvisionSettings, S3Sources, StaticCredentials, TeardownSettings,
};
pub use store::ConfigDocument;
pub use template::DynamicKey;
pub use writer::{ResolvedValues, reset_placeholders, write_resolved};
