//! AWS account validation and identity

use crate::aws::context::AwsContext;
use anyhow::{Context, Result};
use tracing::info;

/// Strongly-typed AWS account ID (12-digit string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    /// Create an AccountId for testing purposes
    #[cfg(test)]
    pub fn new(s: String) -> Self {
        AccountId(s)
    }
}

/// Fetch the current AWS account ID via STS GetCallerIdentity
///
/// Needs no permissions, so a failure here means the credentials themselves
/// are bad. Provisioning treats that as fatal; teardown only warns.
pub async fn get_current_account_id(ctx: &AwsContext) -> Result<AccountId> {
    let identity = ctx
        .sts_client()
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| crate::aws::error::classify_sdk_error(&e))
        .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(
        account_id = %account,
        arn = identity.arn().unwrap_or_default(),
        "AWS account validated"
    );

    Ok(AccountId(account.to_string()))
}
