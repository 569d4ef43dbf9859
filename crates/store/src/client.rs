//! Low-level storage client seam.
//!
//! The store composes five raw operations against an S3-compatible service.
//! They are behind a trait so the service logic can be exercised against a
//! call-counting fake; production wires in [`S3StorageClient`], a thin
//! wrapper over the AWS SDK.

use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;

use crate::config::StoreConfig;

/// Error from a single client operation.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The bucket or object does not exist (modeled not-found or HTTP 404).
    #[error("not found")]
    NotFound,

    /// Any other failure: auth, transport, unexpected status.
    #[error("{0}")]
    Unexpected(String),
}

/// Minimal S3 surface the store composes.
///
/// Implementations must be safe for concurrent use by multiple outstanding
/// operations.
pub trait StorageClient: Send + Sync {
    /// Probe bucket existence via a head request.
    ///
    /// An absent bucket is reported as [`ClientError::NotFound`],
    /// distinguishable from every other failure.
    fn head_bucket(
        &self,
        bucket: &str,
    ) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;

    /// Create a bucket. Racing a concurrent creation is harmless; a bucket
    /// that already exists and is owned by the caller counts as success.
    fn create_bucket(
        &self,
        bucket: &str,
    ) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;

    /// Attach an access-policy document to a bucket.
    fn put_bucket_policy(
        &self,
        bucket: &str,
        policy: String,
    ) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;

    /// Write an object.
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;

    /// Delete an object. Deleting an absent key succeeds.
    fn delete_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;
}

/// [`StorageClient`] backed by the AWS SDK against any S3-compatible
/// endpoint (MinIO in development).
pub struct S3StorageClient {
    client: Client,
}

impl S3StorageClient {
    /// Build a client from explicit configuration.
    ///
    /// Credentials, endpoint, and addressing style all come from the passed
    /// config; nothing is read from the ambient environment.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "glint-store",
        );

        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(config.path_style)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
        }
    }
}

impl StorageClient for S3StorageClient {
    async fn head_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            // MinIO reports an absent bucket either as a modeled NotFound
            // or as a bare 404.
            Err(SdkError::ServiceError(ctx))
                if ctx.err().is_not_found() || ctx.raw().status().as_u16() == 404 =>
            {
                Err(ClientError::NotFound)
            }
            Err(err) => Err(ClientError::Unexpected(
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        match self.client.create_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(()),
            // A concurrent ensure_bucket may have won the race.
            Err(SdkError::ServiceError(ctx))
                if ctx.err().is_bucket_already_owned_by_you()
                    || ctx.err().is_bucket_already_exists() =>
            {
                Ok(())
            }
            Err(err) => Err(ClientError::Unexpected(
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: String) -> Result<(), ClientError> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| ClientError::Unexpected(DisplayErrorContext(&err).to_string()))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), ClientError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| ClientError::Unexpected(DisplayErrorContext(&err).to_string()))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| ClientError::Unexpected(DisplayErrorContext(&err).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_config() {
        let config = StoreConfig::default()
            .with_endpoint("http://minio:9000")
            .with_credentials("key", "secret");

        // Construction is infallible and purely local; no network I/O.
        let _client = S3StorageClient::from_config(&config);
    }

    #[test]
    fn test_client_error_display() {
        assert_eq!(ClientError::NotFound.to_string(), "not found");
        assert_eq!(
            ClientError::Unexpected("connection refused".to_string()).to_string(),
            "connection refused"
        );
    }
}
