//! dwh-coordinator - Redshift warehouse lifecycle and ELT runner
//!
//! Provisions the IAM role, Redshift cluster and ingress rule described in
//! `dwh.cfg`, writes the resulting endpoint back into the config, tears it
//! all down again, and runs the staging/star-schema SQL against the cluster.

pub mod aws;
pub mod config;
pub mod etl;
pub mod orchestrator;
pub mod wait;

#[cfg(test)]
mod testing;
