//! Store error types.

use thiserror::Error;

/// Object store operation errors.
///
/// Every failure is logged with bucket/key context where it is detected and
/// then surfaced unchanged; this crate never retries, suppresses, or
/// downgrades an error. Translating these into user-visible behavior (HTTP
/// status codes etc.) is the caller's job.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bucket existence probe failed for a reason other than not-found
    /// (auth, network, unexpected status). Fatal; creation is not attempted.
    #[error("storage unavailable while probing bucket '{bucket}': {reason}")]
    StorageUnavailable {
        /// Bucket that was probed.
        bucket: String,
        /// Underlying failure.
        reason: String,
    },

    /// Bucket creation or policy application failed after a not-found probe.
    #[error("failed to provision bucket '{bucket}': {reason}")]
    BucketCreationFailed {
        /// Bucket that could not be provisioned.
        bucket: String,
        /// Underlying failure.
        reason: String,
    },

    /// Put-object call failed.
    #[error("failed to upload '{key}' to bucket '{bucket}': {reason}")]
    UploadFailed {
        /// Target bucket.
        bucket: String,
        /// Object key that was being written.
        key: String,
        /// Underlying failure.
        reason: String,
    },

    /// Delete-object call failed. Deleting an absent key is not a failure;
    /// this covers transport and auth errors only.
    #[error("failed to delete '{key}' from bucket '{bucket}': {reason}")]
    DeleteFailed {
        /// Target bucket.
        bucket: String,
        /// Object key that was being deleted.
        key: String,
        /// Underlying failure.
        reason: String,
    },

    /// Upload was requested with an empty filename.
    #[error("upload filename must not be empty")]
    InvalidFilename,
}

impl StoreError {
    /// Create a storage unavailable error.
    #[must_use]
    pub fn storage_unavailable(bucket: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            bucket: bucket.into(),
            reason: reason.into(),
        }
    }

    /// Create a bucket creation error.
    #[must_use]
    pub fn bucket_creation_failed(bucket: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BucketCreationFailed {
            bucket: bucket.into(),
            reason: reason.into(),
        }
    }

    /// Create an upload error.
    #[must_use]
    pub fn upload_failed(
        bucket: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UploadFailed {
            bucket: bucket.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a delete error.
    #[must_use]
    pub fn delete_failed(
        bucket: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DeleteFailed {
            bucket: bucket.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = StoreError::storage_unavailable("posts", "connection refused");
        assert!(err.to_string().contains("posts"));
        assert!(err.to_string().contains("connection refused"));

        let err = StoreError::upload_failed("posts", "abc-cat.png", "access denied");
        assert!(err.to_string().contains("abc-cat.png"));
        assert!(err.to_string().contains("posts"));

        let err = StoreError::delete_failed("posts", "abc-cat.png", "timeout");
        assert!(err.to_string().contains("delete"));
    }
}
