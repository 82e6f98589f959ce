//! S3-based attachment storage operations
mod error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{presigning::PresigningConfig, Client as S3Client};

pub use error::{AttachmentStorageError, AttachmentStorageResult};

/// Default lifetime of an upload URL
pub const DEFAULT_UPLOAD_URL_EXPIRY_SECS: u64 = 300;

/// Object store contract for todo attachments
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Returns a write-capable URL for `attachment_id`, valid for a fixed window
    ///
    /// Constructing the URL signs it locally; no request reaches the object store.
    ///
    /// # Errors
    ///
    /// Returns `AttachmentStorageError` if signing fails (e.g. missing credentials)
    async fn issue_upload_url(&self, attachment_id: &str) -> AttachmentStorageResult<String>;

    /// Returns the public retrieval URL for `attachment_id`
    ///
    /// Does not check that the object exists.
    fn public_url(&self, attachment_id: &str) -> String;
}

/// Attachment storage client for S3 operations
pub struct AttachmentStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    upload_url_expiry_secs: u64,
}

impl AttachmentStorage {
    /// Creates a new attachment storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for attachments
    /// * `upload_url_expiry_secs` - Lifetime of issued upload URLs in seconds
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        upload_url_expiry_secs: u64,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            upload_url_expiry_secs,
        }
    }
}

#[async_trait]
impl AttachmentStore for AttachmentStorage {
    async fn issue_upload_url(&self, attachment_id: &str) -> AttachmentStorageResult<String> {
        let presigned_config =
            PresigningConfig::expires_in(Duration::from_secs(self.upload_url_expiry_secs))
                .map_err(|e| {
                    AttachmentStorageError::ConfigError(format!(
                        "Failed to create presigning config: {e}"
                    ))
                })?;

        let presigned_request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(attachment_id)
            .presigned(presigned_config)
            .await
            .map_err(|e| {
                AttachmentStorageError::S3Error(format!("Failed to generate presigned URL: {e}"))
            })?;

        Ok(presigned_request.uri().to_string())
    }

    fn public_url(&self, attachment_id: &str) -> String {
        public_attachment_url(&self.bucket_name, attachment_id)
    }
}

/// Virtual-hosted-style public URL of an object in `bucket_name`
#[must_use]
pub fn public_attachment_url(bucket_name: &str, attachment_id: &str) -> String {
    format!("https://{bucket_name}.s3.amazonaws.com/{attachment_id}")
}
