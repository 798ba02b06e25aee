//! dwh-common - Shared types and constants
//!
//! Types used by the coordinator and its test helpers, without any AWS SDK
//! dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Default configuration values and fixed AWS identifiers
//! - [`resource_kind`]: AWS resources managed by the coordinator and their teardown order
//! - [`status`]: Redshift cluster lifecycle states
//! - [`tags`]: AWS resource tag constants for discovery and cleanup

pub mod defaults;
pub mod resource_kind;
pub mod status;
pub mod tags;

// Re-export commonly used types
pub use resource_kind::ResourceKind;
pub use status::ClusterState;
