//! Write provisioning results into `dwh.cfg` and reset them on teardown

use super::error::ConfigError;
use super::store::ConfigDocument;
use super::template::{self, DynamicKey};
use std::collections::HashMap;
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::{debug, info};

/// Values discovered by provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValues {
    /// Cluster endpoint address
    pub host: String,
    /// Warehouse role ARN
    pub role_arn: String,
}

impl ResolvedValues {
    fn bindings(&self) -> HashMap<&str, &str> {
        HashMap::from([
            (DynamicKey::Host.placeholder_name(), self.host.as_str()),
            (
                DynamicKey::IamRoleArn.placeholder_name(),
                self.role_arn.as_str(),
            ),
        ])
    }
}

/// Substitute provisioning results into every placeholder, persist, then
/// re-read the file and check that no placeholder survived.
///
/// Substitution covers the whole file, comments included.
pub fn write_resolved(path: &Path, values: &ResolvedValues) -> Result<(), ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
    let rendered = template::substitute(&text, &values.bindings());
    ConfigDocument::parse(&rendered)?.save(path)?;

    let written = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
    template::validate_resolved(&written)?;

    info!(
        path = %path.display(),
        host = %values.host,
        role_arn = %values.role_arn,
        "Wrote cluster endpoint and role ARN to config"
    );
    Ok(())
}

/// Put the placeholder tokens back into the dynamic keys.
///
/// Missing keys (or sections) are created so the file is always ready for the
/// next `provision`.
pub fn reset_placeholders(path: &Path) -> Result<(), ConfigError> {
    let mut doc = ConfigDocument::load(path)?;
    for key in DynamicKey::iter() {
        debug!(key = %key, "Resetting to placeholder");
        doc.set(key.section(), key.key(), &key.placeholder());
    }
    doc.save(path)?;
    info!(path = %path.display(), "Reset dynamic config keys to placeholders");
    Ok(())
}
