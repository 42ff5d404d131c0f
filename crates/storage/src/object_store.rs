//! Object storage interface for satellite rasters and rendered maps.

use bytes::Bytes;
use object_store::{
    aws::AmazonS3Builder, gcp::GoogleCloudStorageBuilder, local::LocalFileSystem,
    memory::InMemory, path::Path, ObjectStore,
};
use serde::{Deserialize, Serialize};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use pm25_common::{Pm25Error, Pm25Result};

/// Where objects live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageBackend {
    /// Google Cloud Storage, authenticated with a service-account key file
    Gcs { service_account_path: PathBuf },
    /// S3-compatible; credentials come from the standard AWS environment
    S3 {
        endpoint: Option<String>,
        region: String,
        allow_http: bool,
    },
    /// A directory on the local filesystem
    Local { root: PathBuf },
    /// Process memory (tests, dry runs)
    Memory,
}

/// Configuration for object storage connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// Bucket name
    pub bucket: String,
    #[serde(flatten)]
    pub backend: StorageBackend,
}

/// Object storage client.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

fn storage_err(context: impl std::fmt::Display, e: impl std::fmt::Display) -> Pm25Error {
    Pm25Error::storage(format!("{}: {}", context, e))
}

impl ObjectStorage {
    /// Create a new object storage client from config.
    pub fn new(config: &ObjectStorageConfig) -> Pm25Result<Self> {
        let store: Arc<dyn ObjectStore> = match &config.backend {
            StorageBackend::Gcs {
                service_account_path,
            } => Arc::new(
                GoogleCloudStorageBuilder::new()
                    .with_bucket_name(&config.bucket)
                    .with_service_account_path(service_account_path.to_string_lossy())
                    .build()
                    .map_err(|e| storage_err("Failed to create GCS client", e))?,
            ),
            StorageBackend::S3 {
                endpoint,
                region,
                allow_http,
            } => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(&config.bucket)
                    .with_region(region)
                    .with_allow_http(*allow_http);
                if let Some(endpoint) = endpoint {
                    builder = builder.with_endpoint(endpoint);
                }
                Arc::new(
                    builder
                        .build()
                        .map_err(|e| storage_err("Failed to create S3 client", e))?,
                )
            }
            StorageBackend::Local { root } => {
                std::fs::create_dir_all(root)
                    .map_err(|e| storage_err(format!("Failed to create {}", root.display()), e))?;
                Arc::new(
                    LocalFileSystem::new_with_prefix(root)
                        .map_err(|e| storage_err("Failed to open local store", e))?,
                )
            }
            StorageBackend::Memory => Arc::new(InMemory::new()),
        };

        info!(bucket = %config.bucket, store = %store, "Object storage ready");
        Ok(Self::from_store(store, &config.bucket))
    }

    /// Wrap an existing store.
    pub fn from_store(store: Arc<dyn ObjectStore>, bucket: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Write bytes to a path in the bucket.
    #[instrument(skip(self, data), fields(bucket = %self.bucket, path = %path))]
    pub async fn put(&self, path: &str, data: Bytes) -> Pm25Result<()> {
        let location = Path::from(path);
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data)
            .await
            .map_err(|e| storage_err(format!("Failed to write {}", path), e))?;

        Ok(())
    }

    /// Read bytes from a path.
    #[instrument(skip(self), fields(bucket = %self.bucket, path = %path))]
    pub async fn get(&self, path: &str) -> Pm25Result<Bytes> {
        let location = Path::from(path);

        let result = self.store.get(&location).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => {
                Pm25Error::DataNotAvailable(format!("{} not found in {}", path, self.bucket))
            }
            e => storage_err(format!("Failed to read {}", path), e),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| storage_err("Failed to read bytes", e))?;

        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }

    /// Check if an object exists.
    pub async fn exists(&self, path: &str) -> Pm25Result<bool> {
        let location = Path::from(path);

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(storage_err(format!("Failed to check {}", path), e)),
        }
    }

    /// Copy an object to a local file, creating parent directories.
    #[instrument(skip(self), fields(bucket = %self.bucket, path = %path, local = %local.display()))]
    pub async fn download_to(&self, path: &str, local: &FsPath) -> Pm25Result<()> {
        let bytes = self.get(path).await?;
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(local, &bytes).await?;
        info!(size = bytes.len(), "Downloaded object");
        Ok(())
    }

    /// Upload a local file to a path in the bucket.
    #[instrument(skip(self), fields(bucket = %self.bucket, path = %path, local = %local.display()))]
    pub async fn upload_file(&self, local: &FsPath, path: &str) -> Pm25Result<()> {
        let data = tokio::fs::read(local).await?;
        self.put(path, Bytes::from(data)).await?;
        info!("Uploaded object");
        Ok(())
    }
}

/// Public HTTP URL of an object: `{base}/{bucket}/{path}`.
pub fn public_url(base: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        bucket.trim_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Path builder for consistent storage layout.
pub struct StoragePath;

impl StoragePath {
    /// Exported satellite raster at the bucket root.
    /// Format: {prefix}_{YYYYMMDD}.tif
    pub fn export_raster(prefix: &str, compact_date: &str) -> String {
        format!("{}_{}.tif", prefix, compact_date)
    }

    /// Rendered prediction map.
    pub fn output_image() -> String {
        "output/output.png".to_string()
    }
}
