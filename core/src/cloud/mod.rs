//! S3 upload backend
//!
//! Credentials come from the SDK default provider chain (environment or
//! IAM role), never from this crate. Every object is written with
//! server-side encryption enforced.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use aws_sdk_s3::Client as S3Client;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::error::{RelayError, Result};

pub struct CloudUploader {
    client: S3Client,
}

impl CloudUploader {
    /// Resolve region and credentials from config/environment/IAM and
    /// build the client.
    pub async fn from_config(config: &Config) -> Self {
        let region_provider =
            RegionProviderChain::first_try(config.region().map(Region::new)).or_default_provider();
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;
        Self {
            client: S3Client::new(&shared),
        }
    }

    /// Wrap an existing client (tests, custom endpoints).
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Upload a local file; the object key is the file's basename.
    ///
    /// Returns the `s3://bucket/key` URI of the written object.
    pub async fn upload_file(&self, path: &Path, bucket: &str) -> Result<String> {
        let key = object_key(path)?;

        let body = ByteStream::from_path(path)
            .await
            .map_err(|_| RelayError::FileNotFound {
                path: path.to_path_buf(),
            })?;

        self.put_request(bucket, &key, body)
            .send()
            .await
            .map_err(|e| RelayError::UploadFailed {
                key: key.clone(),
                message: e.to_string(),
            })?;

        let uri = format!("s3://{}/{}", bucket, key);
        info!(%uri, "file uploaded");
        Ok(uri)
    }

    /// Build the put request; encryption at rest is not optional.
    fn put_request(&self, bucket: &str, key: &str, body: ByteStream) -> PutObjectFluentBuilder {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .server_side_encryption(ServerSideEncryption::Aes256)
    }
}

fn object_key(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| RelayError::FileNotFound {
            path: path.to_path_buf(),
        })
}
