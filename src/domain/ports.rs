use crate::domain::model::{LocalArtifact, OrderBatch, RemoteObjectRef};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Capability to write bytes under a key in a single bucket.
pub trait ObjectStorage: Send + Sync {
    fn bucket(&self) -> &str;

    fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<RemoteObjectRef>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    /// Full query string pairs, in request order.
    fn query_params(&self) -> Vec<(String, String)>;
    fn request_headers(&self) -> &HashMap<String, String>;
    fn request_timeout(&self) -> Option<Duration>;
    fn output_dir(&self) -> &Path;
    fn key_prefix(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn fetch(&self) -> Result<OrderBatch>;
    async fn write(&self, batch: OrderBatch) -> Result<LocalArtifact>;
    async fn upload(&self, artifact: &LocalArtifact) -> Result<RemoteObjectRef>;
}
