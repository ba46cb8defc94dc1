use crate::core::ObjectStorage;
use crate::domain::model::{LocalArtifact, RemoteObjectRef};
use crate::utils::error::{EtlError, Result};

/// `<prefix>/<filename>`, or the bare filename when the prefix is empty.
pub fn object_key(prefix: &str, filename: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        filename.to_string()
    } else {
        format!("{}/{}", prefix, filename)
    }
}

pub async fn upload_artifact<S: ObjectStorage>(
    storage: &S,
    prefix: &str,
    artifact: &LocalArtifact,
) -> Result<RemoteObjectRef> {
    let data = tokio::fs::read(&artifact.path)
        .await
        .map_err(|e| EtlError::filesystem(&artifact.path, e))?;
    let key = object_key(prefix, &artifact.filename);

    tracing::debug!(
        "Uploading {} ({} bytes) to bucket {} as {}",
        artifact.path.display(),
        data.len(),
        storage.bucket(),
        key
    );

    let remote = storage.put_object(&key, data).await?;
    tracing::info!("✅ Uploaded to {}", remote.uri);
    Ok(remote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        assert_eq!(
            object_key("raw", "orders_20240101_000000.csv"),
            "raw/orders_20240101_000000.csv"
        );
        assert_eq!(object_key("/raw/", "orders.csv"), "raw/orders.csv");
        assert_eq!(object_key("landing/raw", "orders.csv"), "landing/raw/orders.csv");
        assert_eq!(object_key("", "orders.csv"), "orders.csv");
    }
}
