//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use anyhow::Context;
use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use backend_storage::attachment::DEFAULT_UPLOAD_URL_EXPIRY_SECS;

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for presigned URL expiry in seconds
        presign_expiry_override: Option<u64>,
    },
}

/// Names of the backing resources, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// `DynamoDB` table holding todo items
    pub todos_table: String,
    /// GSI on `userId` used to list a user's items
    pub todos_by_user_index: String,
    /// S3 bucket holding attachments
    pub attachments_bucket: String,
    /// Lifetime of attachment upload URLs
    pub upload_url_expiry_secs: u64,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let presign_expiry_override = env::var("PRESIGNED_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok());

                Self::Development {
                    presign_expiry_override,
                }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Reads the table, index and bucket names
    ///
    /// # Errors
    ///
    /// Returns an error naming the first of `TODOS_TABLE`, `TODOS_BY_USER_INDEX`
    /// or `ATTACHMENTS_S3_BUCKET` that is unset or empty
    pub fn storage_config(&self) -> anyhow::Result<StorageConfig> {
        Ok(StorageConfig {
            todos_table: required_var("TODOS_TABLE")?,
            todos_by_user_index: required_var("TODOS_BY_USER_INDEX")?,
            attachments_bucket: required_var("ATTACHMENTS_S3_BUCKET")?,
            upload_url_expiry_secs: self.presigned_url_expiry_secs(),
        })
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// `LocalStack` endpoint in Development, `None` for deployed stages
    #[must_use]
    pub const fn aws_endpoint_override(&self) -> Option<&'static str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development { .. } => Some(LOCALSTACK_ENDPOINT),
        }
    }

    /// Shared AWS configuration for the `DynamoDB` and S3 clients
    ///
    /// The SDK retries throttled and transient failures itself; nothing above
    /// the adapters retries again.
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(3))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(10))
                    .build(),
            );

        if let Some(endpoint_url) = self.aws_endpoint_override() {
            loader = loader.endpoint_url(endpoint_url);
        }

        loader.load().await
    }

    /// S3 client configuration derived from [`Self::aws_config`]
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        // LocalStack only serves path-style bucket URLs
        aws_sdk_s3::config::Builder::from(&self.aws_config().await)
            .force_path_style(self.aws_endpoint_override().is_some())
            .build()
    }

    /// Presigned upload URL expiry time in seconds
    #[must_use]
    pub fn presigned_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => DEFAULT_UPLOAD_URL_EXPIRY_SECS,
            Self::Development {
                presign_expiry_override,
            } => presign_expiry_override.unwrap_or(DEFAULT_UPLOAD_URL_EXPIRY_SECS),
        }
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    let value = env::var(name).with_context(|| format!("{name} environment variable is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("{name} environment variable is empty");
    }
    Ok(value)
}
