//! S3 storage service for gasto documents and repository files.
//!
//! Handles uploads, deletes and presigned PUT URLs. Supports both AWS S3
//! and MinIO for development.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use tracing::info;
use uuid::Uuid;

use crate::config::StorageSettings;
use crate::error::{AppError, AppResult};

/// Lifetime of presigned upload URLs.
pub const PRESIGN_EXPIRACION: Duration = Duration::from_secs(15 * 60);

/// S3 storage client wrapper.
#[derive(Clone)]
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    /// Create a new S3 storage client from configuration.
    ///
    /// No request is sent; call [`Storage::ensure_bucket_exists`] at startup.
    pub fn new(config: &StorageSettings) -> Self {
        let credentials =
            Credentials::new(&config.access_key, &config.secret_key, None, None, "gastos");

        let region = Region::new(config.region.clone());

        let mut s3_config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .force_path_style(true); // Required for MinIO

        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(s3_config_builder.build());

        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }

    /// Ensure the bucket exists, creating it if necessary.
    pub async fn ensure_bucket_exists(&self) -> AppResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!("S3 bucket '{}' exists", self.bucket);
                Ok(())
            }
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    info!("Creating S3 bucket '{}'", self.bucket);
                    self.client
                        .create_bucket()
                        .bucket(&self.bucket)
                        .send()
                        .await
                        .map_err(|e| {
                            AppError::Storage(format!("Failed to create bucket: {}", e))
                        })?;
                    info!("S3 bucket '{}' created", self.bucket);
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to access bucket '{}': {}",
                        self.bucket, service_error
                    )))
                }
            }
        }
    }

    /// Get the content type for a file based on its extension.
    pub fn content_type_for_extension(ext: &str) -> &'static str {
        match ext.to_lowercase().as_str() {
            "pdf" => "application/pdf",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }

    /// Upload an object.
    pub async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> AppResult<()> {
        let body = aws_sdk_s3::primitives::ByteStream::from(data);
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body);

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file to S3: {}", e)))?;

        Ok(())
    }

    /// Delete an object.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file from S3: {}", e)))?;

        Ok(())
    }

    /// Presigned PUT URL the client uploads to directly.
    ///
    /// Signing happens locally; nothing is sent to S3.
    pub async fn presign_put(&self, key: &str, content_type: &str) -> AppResult<String> {
        let config = PresigningConfig::expires_in(PRESIGN_EXPIRACION)
            .map_err(|e| AppError::Storage(format!("Invalid presign expiry: {}", e)))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(config)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to presign upload: {}", e)))?;

        Ok(request.uri().to_string())
    }

    /// Key for a gasto document: `gastos/{gasto_id}/{uuid}.{ext}`.
    pub fn gasto_key(gasto_id: i32, extension: &str) -> String {
        format!("gastos/{}/{}.{}", gasto_id, Uuid::new_v4(), extension)
    }

    /// Key for a repository file under a folder prefix: `{prefijo}/{uuid}.{ext}`.
    pub fn repositorio_key(prefijo: &str, extension: &str) -> String {
        format!(
            "{}/{}.{}",
            prefijo.trim_matches('/'),
            Uuid::new_v4(),
            extension
        )
    }
}
