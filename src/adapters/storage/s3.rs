use crate::config::UploadConfig;
use crate::core::{ObjectStorage, RemoteObjectRef};
use crate::utils::error::{EtlError, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Client from the ambient AWS credential chain (env, profile, IMDS, ...).
    /// A custom endpoint switches to path-style addressing for S3-compatible stores.
    pub async fn from_config(config: &UploadConfig) -> Self {
        let shared = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);

        if let Some(region) = &config.region {
            builder = builder.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(S3Client::from_conf(builder.build()), config.bucket.clone())
    }
}

fn content_type_for(key: &str) -> &'static str {
    if key.ends_with(".csv") {
        "text/csv"
    } else {
        "application/octet-stream"
    }
}

impl ObjectStorage for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<RemoteObjectRef> {
        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type_for(key))
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|err| {
                let message = match err.code() {
                    Some(code) => format!("{}: {}", code, DisplayErrorContext(&err)),
                    None => DisplayErrorContext(&err).to_string(),
                };
                EtlError::Upload {
                    bucket: self.bucket.clone(),
                    key: key.to_string(),
                    message,
                }
            })?;

        tracing::debug!("S3 put_object ok, etag={:?}", output.e_tag());

        Ok(RemoteObjectRef {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            uri: format!("s3://{}/{}", self.bucket, key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("raw/orders_20240101_000000.csv"), "text/csv");
        assert_eq!(content_type_for("raw/blob"), "application/octet-stream");
    }
}
