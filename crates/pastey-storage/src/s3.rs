//! S3-compatible storage backend (AWS S3, Minio, etc.)

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{StorageError, StorageResult};
use crate::traits::{BlobStorage, validate_key};

const DEFAULT_REGION: &str = "us-east-1";

/// S3-compatible storage
///
/// Bucket structure:
/// ```text
/// {bucket}/
///   pastes/{key}
/// ```
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    /// Create from existing AWS SDK client
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: "pastes".into(),
        }
    }

    /// Create from the ambient AWS configuration
    ///
    /// Credentials and region come from the usual `AWS_*` environment
    /// variables and profile files. With an `endpoint`, requests go to that
    /// URL using path-style addressing (Minio and other S3 clones).
    pub async fn connect(bucket: impl Into<String>, endpoint: Option<&str>) -> Self {
        let region = RegionProviderChain::default_provider().or_else(DEFAULT_REGION);
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        let mut config = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint {
            config = config.endpoint_url(endpoint).force_path_style(true);
        }

        let bucket = bucket.into();
        tracing::info!(%bucket, endpoint = endpoint.unwrap_or("aws"), "using S3 blob storage");
        Self::new(Client::from_conf(config.build()), bucket)
    }

    /// Ensure bucket exists (call on startup)
    pub async fn ensure_bucket(&self) -> StorageResult<()> {
        match self
            .client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => match self.client.head_bucket().bucket(&self.bucket).send().await {
                Ok(_) => Ok(()),
                Err(_) => Err(StorageError::Unavailable(format!(
                    "failed to create or access bucket {}: {e}",
                    self.bucket
                ))),
            },
        }
    }

    fn object_key(&self, key: &str) -> StorageResult<String> {
        validate_key(key)?;
        Ok(format!("{}/{}", self.prefix, key))
    }
}

#[async_trait]
impl BlobStorage for S3Storage {
    async fn put(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let object = self.object_key(key)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("S3 PUT failed: {e}")))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        let object = self.object_key(key)?;

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object)
            .send()
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Unavailable(format!("S3 GET failed: {e}"))
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Unavailable(format!("failed to read S3 body: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let object = self.object_key(key)?;

        // S3 delete is already idempotent
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&object)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("S3 DELETE failed: {e}")))?;

        Ok(())
    }
}

fn is_not_found<E>(err: &SdkError<E>) -> bool {
    matches!(err, SdkError::ServiceError(e) if e.raw().status().as_u16() == 404)
}
