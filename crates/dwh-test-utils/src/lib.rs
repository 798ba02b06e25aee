//! Shared test utilities for the warehouse coordinator
//!
//! ## Modules
//!
//! - [`aws`]: AWS region detection and test run ID generation
//! - [`config`]: `dwh.cfg` template fixtures

pub mod aws;
pub mod config;

pub use aws::{get_test_region, test_run_id};
pub use config::{TEMPLATE, write_template};
