//! Configuration errors
//!
//! Typed errors for loading, resolving and validating the `dwh.cfg` store.

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the config file
    #[error("Failed to access config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A key/value line appears before the first section header
    #[error("line {line}: entry '{key}' appears before any [SECTION] header")]
    EntryOutsideSection { line: usize, key: String },

    /// A line that is neither a section, an entry, nor a comment
    #[error("line {line}: cannot parse '{content}'")]
    Malformed { line: usize, content: String },

    /// Required section is absent
    #[error("missing section [{0}]")]
    MissingSection(String),

    /// Required key is absent or empty
    #[error("missing key {key} in section [{section}]")]
    MissingKey { section: String, key: String },

    /// Value could not be parsed as a number
    #[error("{section}.{key} must be a number, got '{value}'")]
    InvalidNumber {
        section: String,
        key: String,
        value: String,
    },

    /// Value is outside the accepted range or choices
    #[error("{section}.{key} must be {expected}, got '{value}'")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        expected: &'static str,
    },

    /// KEY and SECRET must be given together
    #[error("[AWS] KEY and SECRET must both be set (or both omitted to use the default credential chain)")]
    IncompleteCredentials,

    /// A value needed at runtime still holds its placeholder
    #[error("{section}.{key} is still '{value}' - run `provision` first")]
    NotProvisioned {
        section: String,
        key: String,
        value: String,
    },

    /// The endpoint placeholder survived substitution
    #[error("HOST placeholder still present in config after substitution")]
    HostPlaceholderRemained,

    /// The role ARN placeholder survived substitution
    #[error("IAM_ROLE_ARN placeholder still present in config after substitution")]
    RoleArnPlaceholderRemained,

    /// Some other `${...}` token survived substitution
    #[error("unresolved placeholder syntax remains in config: {}", names.join(", "))]
    PlaceholderSyntaxRemained { names: Vec<String> },
}

impl ConfigError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this error is a failed post-substitution validation
    pub fn is_placeholder_error(&self) -> bool {
        matches!(
            self,
            Self::HostPlaceholderRemained
                | Self::RoleArnPlaceholderRemained
                | Self::PlaceholderSyntaxRemained { .. }
        )
    }
}
