use crate::core::{ObjectStorage, RemoteObjectRef};
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};

/// Bucket mirrored onto the local filesystem as `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    bucket: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    pub fn object_path(&self, key: &str) -> PathBuf {
        Path::new(&self.root).join(&self.bucket).join(key)
    }

    fn upload_error(&self, key: &str, e: std::io::Error) -> EtlError {
        EtlError::Upload {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            message: format!("local mirror write failed under {}: {}", self.root.display(), e),
        }
    }
}

impl ObjectStorage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<RemoteObjectRef> {
        let full_path = self.object_path(key);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.upload_error(key, e))?;
        }

        tokio::fs::write(&full_path, &data)
            .await
            .map_err(|e| self.upload_error(key, e))?;

        Ok(RemoteObjectRef {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            uri: format!("file://{}", full_path.display()),
        })
    }
}
