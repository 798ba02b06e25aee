//! Placeholder tokens in config values
//!
//! Values only known after provisioning are written to `dwh.cfg` as `${name}`
//! tokens. This module finds, substitutes and validates those tokens; it knows
//! nothing about files.

use super::error::ConfigError;
use dwh_common::defaults::{HOST_PLACEHOLDER, ROLE_ARN_PLACEHOLDER};
use std::collections::HashMap;

/// Config keys whose values are produced by provisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum DynamicKey {
    #[strum(to_string = "CLUSTER.HOST")]
    Host,
    #[strum(to_string = "IAM_ROLE.IAM_ROLE_ARN")]
    IamRoleArn,
}

impl DynamicKey {
    pub fn section(self) -> &'static str {
        match self {
            Self::Host => "CLUSTER",
            Self::IamRoleArn => "IAM_ROLE",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Host => "HOST",
            Self::IamRoleArn => "IAM_ROLE_ARN",
        }
    }

    /// Placeholder name, without `${}`
    pub fn placeholder_name(self) -> &'static str {
        match self {
            Self::Host => HOST_PLACEHOLDER,
            Self::IamRoleArn => ROLE_ARN_PLACEHOLDER,
        }
    }

    /// Full placeholder token, e.g. `${redshift_host}`
    pub fn placeholder(self) -> String {
        token(self.placeholder_name())
    }
}

/// Wrap a name as a `${name}` token
pub fn token(name: &str) -> String {
    format!("${{{name}}}")
}

/// Names of all well-formed `${name}` tokens in `text`, in order of appearance
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                found.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    found
}

/// Replace every `${name}` whose name is bound. Unknown names are left intact.
pub fn substitute(text: &str, bindings: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match bindings.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Check that rendered config text holds no placeholder syntax and no
/// placeholder names.
///
/// The host token is checked first, then the role ARN token, then any other
/// `${` occurrence. Bare names catch damaged tokens such as `$redshift_host`
/// that substitution cannot match.
pub fn validate_resolved(text: &str) -> Result<(), ConfigError> {
    if text.contains(&DynamicKey::Host.placeholder()) {
        return Err(ConfigError::HostPlaceholderRemained);
    }
    if text.contains(&DynamicKey::IamRoleArn.placeholder()) {
        return Err(ConfigError::RoleArnPlaceholderRemained);
    }
    if text.contains("${") {
        let mut names: Vec<String> = placeholders(text).into_iter().map(String::from).collect();
        if names.is_empty() {
            names.push("${".to_string());
        }
        return Err(ConfigError::PlaceholderSyntaxRemained { names });
    }
    if text.contains(DynamicKey::Host.placeholder_name()) {
        return Err(ConfigError::HostPlaceholderRemained);
    }
    if text.contains(DynamicKey::IamRoleArn.placeholder_name()) {
        return Err(ConfigError::RoleArnPlaceholderRemained);
    }
    Ok(())
}
