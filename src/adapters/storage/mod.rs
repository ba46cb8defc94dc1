pub mod local;
pub mod s3;

pub use local::LocalStorage;
pub use s3::S3Storage;

use crate::config::{StorageKind, UploadConfig};
use crate::core::{ObjectStorage, RemoteObjectRef};
use crate::utils::error::{EtlError, Result};

/// Backend picked at startup from `upload.backend`.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    S3(S3Storage),
    Local(LocalStorage),
}

impl StorageBackend {
    pub async fn from_config(config: &UploadConfig) -> Result<Self> {
        match config.backend {
            StorageKind::S3 => {
                tracing::debug!("Using S3 storage for bucket {}", config.bucket);
                Ok(Self::S3(S3Storage::from_config(config).await))
            }
            StorageKind::Local => {
                let root = config.local_root.clone().ok_or_else(|| {
                    EtlError::config("upload.local_root is required for the local backend")
                })?;
                tracing::debug!("Using local bucket mirror under {}", root.display());
                Ok(Self::Local(LocalStorage::new(root, config.bucket.clone())))
            }
        }
    }
}

impl ObjectStorage for StorageBackend {
    fn bucket(&self) -> &str {
        match self {
            Self::S3(storage) => storage.bucket(),
            Self::Local(storage) => storage.bucket(),
        }
    }

    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<RemoteObjectRef> {
        match self {
            Self::S3(storage) => storage.put_object(key, data).await,
            Self::Local(storage) => storage.put_object(key, data).await,
        }
    }
}
