//! Object store service implementation.

use bytes::Bytes;
use tracing::{error, info};
use uuid::Uuid;

use crate::client::{ClientError, S3StorageClient, StorageClient};
use crate::config::StoreConfig;
use crate::error::StoreError;

/// Request to upload a file.
///
/// Caller-owned and transient; the store retains nothing past the call.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename as supplied by the uploader. Must not be empty;
    /// an extension is optional.
    pub filename: String,
    /// File contents.
    pub content: Bytes,
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadedObject {
    /// Object key within the bucket; the handle for a later [`ObjectStore::delete`].
    pub key: String,
    /// Publicly resolvable URL. Constructed from configuration, never
    /// verified against the store.
    pub url: String,
}

/// Storage facade owning one client connection and one bucket.
///
/// All operations are async network calls with no shared mutable state
/// beyond the immutable configuration, so one store may serve any number
/// of concurrent uploads. Concurrent calls may race on bucket provisioning;
/// that race is resolved by the backing store's idempotent create/policy
/// semantics, not deduplicated here.
pub struct ObjectStore<C: StorageClient> {
    client: C,
    config: StoreConfig,
}

impl ObjectStore<S3StorageClient> {
    /// Create a store backed by the AWS SDK client.
    #[must_use]
    pub fn from_config(config: StoreConfig) -> Self {
        let client = S3StorageClient::from_config(&config);
        Self { client, config }
    }
}

impl<C: StorageClient> ObjectStore<C> {
    /// Create a store over an explicit client.
    #[must_use]
    pub fn new(client: C, config: StoreConfig) -> Self {
        Self { client, config }
    }

    /// Bucket this store writes to.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Ensure the configured bucket exists with a public-read policy.
    ///
    /// Probes the bucket with a head request. If it exists, returns with no
    /// side effect. If the probe reports not-found, creates the bucket and
    /// then applies the public-read policy, in that order; the policy is
    /// only ever attached to buckets this component created, never blindly
    /// reapplied to pre-existing ones. The result is not cached: every call
    /// re-probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StorageUnavailable`] if the probe fails for a
    /// reason other than not-found (creation is not attempted), or
    /// [`StoreError::BucketCreationFailed`] if creation or policy
    /// application fails.
    pub async fn ensure_bucket(&self) -> Result<(), StoreError> {
        let bucket = &self.config.bucket;

        match self.client.head_bucket(bucket).await {
            Ok(()) => Ok(()),
            Err(ClientError::NotFound) => {
                self.client.create_bucket(bucket).await.map_err(|e| {
                    error!(bucket = %bucket, error = %e, "Failed to create bucket");
                    StoreError::bucket_creation_failed(bucket, e.to_string())
                })?;
                info!(bucket = %bucket, "Bucket created");

                self.set_public_bucket_policy().await
            }
            Err(e) => {
                error!(bucket = %bucket, error = %e, "Bucket probe failed");
                Err(StoreError::storage_unavailable(bucket, e.to_string()))
            }
        }
    }

    /// Upload a file and return its key and public URL.
    ///
    /// Every upload re-checks the bucket, derives a fresh collision-free
    /// key (`<uuid>-<filename>`), infers the content type from the filename
    /// extension, and writes the object. The returned URL is
    /// `<endpoint>/<bucket>/<key>` by plain concatenation; the object is
    /// not read back to confirm it resolves.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFilename`] for an empty filename, any
    /// [`ObjectStore::ensure_bucket`] error, or [`StoreError::UploadFailed`]
    /// if the put-object call fails. Retrying is the caller's decision.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadedObject, StoreError> {
        if request.filename.is_empty() {
            return Err(StoreError::InvalidFilename);
        }

        self.ensure_bucket().await?;

        let bucket = &self.config.bucket;
        let key = object_key(&request.filename);
        let content_type = content_type_for(&request.filename);

        self.client
            .put_object(bucket, &key, request.content, content_type)
            .await
            .map_err(|e| {
                error!(bucket = %bucket, key = %key, error = %e, "Failed to upload object");
                StoreError::upload_failed(bucket, &key, e.to_string())
            })?;

        let url = self.object_url(&key);
        info!(bucket = %bucket, key = %key, content_type = %content_type, "Object uploaded");

        Ok(UploadedObject { key, url })
    }

    /// Delete an object by key.
    ///
    /// The key is not validated against existence; deleting an absent key
    /// succeeds, per standard object-storage semantics.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DeleteFailed`] if the delete call fails
    /// (transport or auth, never absence).
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let bucket = &self.config.bucket;

        self.client.delete_object(bucket, key).await.map_err(|e| {
            error!(bucket = %bucket, key = %key, error = %e, "Failed to delete object");
            StoreError::delete_failed(bucket, key, e.to_string())
        })?;

        info!(bucket = %bucket, key = %key, "Object deleted");
        Ok(())
    }

    /// Apply the fixed public-read policy to the configured bucket.
    ///
    /// The document is static, so reapplication is harmless; no idempotence
    /// guard is needed.
    async fn set_public_bucket_policy(&self) -> Result<(), StoreError> {
        let bucket = &self.config.bucket;
        let policy = public_read_policy(bucket);

        self.client
            .put_bucket_policy(bucket, policy)
            .await
            .map_err(|e| {
                error!(bucket = %bucket, error = %e, "Failed to apply bucket policy");
                StoreError::bucket_creation_failed(bucket, e.to_string())
            })?;

        info!(bucket = %bucket, "Public-read policy applied");
        Ok(())
    }

    /// Public URL of an object: `<endpoint>/<bucket>/<key>`.
    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket,
            key
        )
    }
}

/// Derive a collision-free object key: `<uuid-v4>-<filename>`.
///
/// The filename is kept verbatim; uniqueness comes entirely from the UUID,
/// so identical filenames never collide.
fn object_key(filename: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), filename)
}

/// Infer a MIME type from the lowercase suffix after the last `.`.
///
/// Extension-only inference; the bytes are never sniffed, so a mismatched
/// extension is mis-tagged. Callers depend on this exact mapping.
fn content_type_for(filename: &str) -> &'static str {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return "application/octet-stream";
    };

    match extension.to_ascii_lowercase().as_str() {
        "avif" => "image/avif",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Access document granting anonymous `s3:GetObject` on every key under
/// the bucket ARN.
fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Effect": "Allow",
                "Principal": "*",
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{bucket}/*")]
            }
        ]
    })
    .to_string()
}


#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;
    use uuid::Uuid;

    use super::{content_type_for, object_key};

    // Property: every derived key is `<uuid>-<filename>` with the filename
    // carried verbatim.
    proptest! {
        #[test]
        fn prop_object_key_format(filename in "[a-zA-Z0-9._-]{1,40}") {
            let key = object_key(&filename);

            prop_assert!(Uuid::parse_str(&key[..36]).is_ok());
            prop_assert_eq!(&key[36..37], "-");
            prop_assert_eq!(&key[37..], filename.as_str());
        }
    }

    // Property: extensions outside the known image set always fall back to
    // the generic binary type.
    proptest! {
        #[test]
        fn prop_unknown_extension_falls_back(ext in "[a-z0-9]{1,8}") {
            prop_assume!(!matches!(
                ext.as_str(),
                "avif" | "png" | "jpg" | "jpeg" | "gif"
            ));

            let filename = format!("upload.{ext}");
            prop_assert_eq!(content_type_for(&filename), "application/octet-stream");
        }
    }

    // Property: the known extensions map to their exact MIME string in any
    // casing.
    proptest! {
        #[test]
        fn prop_known_extension_ignores_case(
            (ext, expected) in prop_oneof![
                Just(("avif", "image/avif")),
                Just(("png", "image/png")),
                Just(("jpg", "image/jpeg")),
                Just(("jpeg", "image/jpeg")),
                Just(("gif", "image/gif")),
            ],
            mask in any::<u8>(),
        ) {
            let mixed: String = ext
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    if (mask >> (i % 8)) & 1 == 1 {
                        c.to_ascii_uppercase()
                    } else {
                        c
                    }
                })
                .collect();

            let filename = format!("photo.{mixed}");
            prop_assert_eq!(content_type_for(&filename), expected);
        }
    }
}
