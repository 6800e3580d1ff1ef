use std::time::Duration;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;

use super::{ObjectStore, StorageError, StoredObject};
use crate::config::S3Settings;

/// Stores uploads in an S3-compatible bucket (AWS or MinIO).
#[derive(Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: String,
}

impl S3Store {
    /// Constructs a client for MinIO (local) or AWS (production) with static credentials.
    pub async fn connect(settings: &S3Settings) -> Self {
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "resumatch-static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&settings.endpoint)
            .load()
            .await;

        // MinIO only serves path-style addressing.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 upload failed: {e}")))?;

        info!("Uploaded s3://{}/{}", self.bucket, key);

        Ok(StoredObject {
            key: key.to_string(),
            reference: format!("{}/{}/{}", self.endpoint, self.bucket, key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("S3 delete failed: {e}")))?;
        Ok(())
    }

    async fn processing_reference(
        &self,
        object: &StoredObject,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| StorageError::Backend(format!("invalid presign TTL: {e}")))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object.key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Backend(format!("S3 presign failed: {e}")))?;

        Ok(request.uri().to_string())
    }
}
