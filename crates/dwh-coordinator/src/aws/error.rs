//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format.

use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

/// AWS error categories for idempotency, polling and cleanup logic
#[derive(Debug, Clone, Error)]
pub enum AwsError {
    /// Resource was not found (safe to skip in cleanup, transient while polling)
    #[error("Resource not found ({code}): {message}")]
    NotFound { code: String, message: String },

    /// Resource already exists (safe to ignore in create operations)
    #[error("Resource already exists ({code})")]
    AlreadyExists { code: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    Throttled,

    /// Resource is still referenced or busy
    #[error("Resource has dependent objects or is busy: {message}")]
    DependencyViolation { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is an "already exists" error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, AwsError::AlreadyExists { .. })
    }

    /// Check if retrying later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AwsError::Throttled | AwsError::DependencyViolation { .. }
        )
    }

    /// Error code reported by the service, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { code, .. } | AwsError::AlreadyExists { code } => Some(code),
            AwsError::Sdk { code, .. } => code.as_deref(),
            AwsError::Throttled | AwsError::DependencyViolation { .. } => None,
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            AwsError::Throttled => suggestion_for_code("Throttling"),
            AwsError::Sdk { code: Some(c), .. } => suggestion_for_code(c),
            _ => None,
        }
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "ClusterNotFound",
    "ClusterNotFoundFault",
    "NoSuchEntity",
    "InvalidGroup.NotFound",
    "InvalidPermission.NotFound",
    "InvalidVpcID.NotFound",
    "NoSuchBucket",
];

/// Known AWS error codes for "already exists" conditions
const ALREADY_EXISTS_CODES: &[&str] = &[
    "ClusterAlreadyExists",
    "ClusterAlreadyExistsFault",
    "EntityAlreadyExists",
    "InvalidPermission.Duplicate",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &["Throttling", "ThrottlingException", "RequestLimitExceeded"];

/// Known AWS error codes for resources that are still in use
const DEPENDENCY_CODES: &[&str] = &[
    "DependencyViolation",
    "DeleteConflict",
    "InvalidClusterState",
    "InvalidClusterStateFault",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(c) if ALREADY_EXISTS_CODES.contains(&c) => AwsError::AlreadyExists {
            code: c.to_string(),
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled,
        Some(c) if DEPENDENCY_CODES.contains(&c) => AwsError::DependencyViolation { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify any SDK error that carries service error metadata.
///
/// Errors without a service message (dispatch failures, timeouts) keep the
/// full display chain as their message.
pub fn classify_sdk_error<E>(error: &E) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    let fallback;
    let message = match error.message() {
        Some(m) => m,
        None => {
            fallback = DisplayErrorContext(error).to_string();
            fallback.as_str()
        }
    };
    classify_aws_error(error.code(), Some(message))
}

/// Classify an error from an anyhow::Error.
///
/// Client wrappers attach an [`AwsError`] to every failed call, so the chain
/// is searched for one first. Falls back to string matching on the Debug
/// representation if no typed error is found.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<AwsError>() {
            return e.clone();
        }
    }

    let debug_str = format!("{:?}", error);
    if let Some(code) = extract_error_code(&debug_str) {
        return classify_aws_error(Some(&code), Some(&error.to_string()));
    }

    AwsError::Sdk {
        code: None,
        message: error.to_string(),
    }
}

/// Check whether an anyhow error chain holds a not-found AWS error
pub fn is_not_found(error: &anyhow::Error) -> bool {
    classify_anyhow_error(error).is_not_found()
}

/// Check whether an anyhow error chain holds an already-exists AWS error
pub fn is_already_exists(error: &anyhow::Error) -> bool {
    classify_anyhow_error(error).is_already_exists()
}

/// All known AWS error codes for extraction from debug strings (flat list)
const ALL_KNOWN_CODES: &[&str] = &[
    // Not found
    "ClusterNotFound",
    "NoSuchEntity",
    "InvalidGroup.NotFound",
    "InvalidPermission.NotFound",
    "InvalidVpcID.NotFound",
    "NoSuchBucket",
    // Already exists
    "ClusterAlreadyExists",
    "EntityAlreadyExists",
    "InvalidPermission.Duplicate",
    // Throttling
    "ThrottlingException",
    "Throttling",
    "RequestLimitExceeded",
    // Dependency
    "DependencyViolation",
    "DeleteConflict",
    "InvalidClusterState",
];

/// Extract an AWS error code from a debug string representation
fn extract_error_code(debug_str: &str) -> Option<String> {
    for code in ALL_KNOWN_CODES {
        if debug_str.contains(code) {
            return Some((*code).to_string());
        }
    }

    if let Some(start) = debug_str.find("code: Some(\"") {
        let rest = &debug_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    None
}

const CREDENTIALS_HINT: &str =
    "Check KEY, SECRET and SESSION in the [AWS] section of the config file.";
const PERMISSION_HINT: &str =
    "The credentials lack permission for this call. Grant IAM, Redshift and EC2 access to the caller.";
const CAPACITY_HINT: &str = "Try a different DWH_NODE_TYPE or a smaller DWH_NUM_NODES.";
const QUOTA_HINT: &str =
    "Request a Redshift quota increase via the AWS Service Quotas console, or reduce DWH_NUM_NODES.";
const THROTTLE_HINT: &str = "AWS API rate limit hit. Wait a moment and rerun the command.";

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    ("InvalidClientTokenId", CREDENTIALS_HINT),
    ("SignatureDoesNotMatch", CREDENTIALS_HINT),
    ("ExpiredToken", CREDENTIALS_HINT),
    ("AuthFailure", CREDENTIALS_HINT),
    ("AccessDenied", PERMISSION_HINT),
    ("AccessDeniedException", PERMISSION_HINT),
    ("UnauthorizedOperation", PERMISSION_HINT),
    ("InsufficientClusterCapacity", CAPACITY_HINT),
    ("InsufficientClusterCapacityFault", CAPACITY_HINT),
    ("InvalidParameterValue", CAPACITY_HINT),
    ("ClusterQuotaExceeded", QUOTA_HINT),
    ("ClusterQuotaExceededFault", QUOTA_HINT),
    ("NumberOfNodesQuotaExceeded", QUOTA_HINT),
    ("NumberOfNodesQuotaExceededFault", QUOTA_HINT),
    ("Throttling", THROTTLE_HINT),
    ("ThrottlingException", THROTTLE_HINT),
    ("RequestLimitExceeded", THROTTLE_HINT),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}
