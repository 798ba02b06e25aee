//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once and
//! creating multiple service clients from the same config.

use crate::config::AwsSettings;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use std::sync::Arc;
use tracing::debug;

/// Name reported by credentials read from the config file
const CONFIG_CREDENTIALS_PROVIDER: &str = "dwh-config";

/// Shared AWS configuration context for creating service clients.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::from_settings(&settings.aws).await;
///
/// let iam = IamClient::from_context(&aws);
/// let redshift = RedshiftClient::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
}

impl AwsContext {
    /// Load AWS configuration for the region using the default credential
    /// chain (environment, profile files, instance metadata).
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        Self {
            config: Arc::new(config),
            region: region.to_string(),
        }
    }

    /// Load AWS configuration from the `[AWS]` config section.
    ///
    /// Static keys (with an optional session token) take precedence; without
    /// them the default credential chain is used.
    pub async fn from_settings(settings: &AwsSettings) -> Self {
        let Some(creds) = &settings.credentials else {
            debug!(region = %settings.region, "Using default AWS credential chain");
            return Self::new(&settings.region).await;
        };

        debug!(
            region = %settings.region,
            session = creds.session_token.is_some(),
            "Using static AWS credentials from config"
        );
        let credentials = Credentials::new(
            &creds.access_key_id,
            &creds.secret_access_key,
            creds.session_token.clone(),
            None,
            CONFIG_CREDENTIALS_PROVIDER,
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Self {
            config: Arc::new(config),
            region: settings.region.clone(),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the region string.
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn ec2_client(&self) -> aws_sdk_ec2::Client {
        aws_sdk_ec2::Client::new(self.sdk_config())
    }

    pub fn iam_client(&self) -> aws_sdk_iam::Client {
        aws_sdk_iam::Client::new(self.sdk_config())
    }

    pub fn redshift_client(&self) -> aws_sdk_redshift::Client {
        aws_sdk_redshift::Client::new(self.sdk_config())
    }

    pub fn sts_client(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(self.sdk_config())
    }

    pub fn s3_client(&self) -> aws_sdk_s3::Client {
        aws_sdk_s3::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Service wrappers that can be built from a loaded context
pub trait FromAwsContext {
    fn from_context(ctx: &AwsContext) -> Self;
}
