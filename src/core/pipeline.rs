use crate::core::{fetcher, uploader, writer};
use crate::core::{ConfigProvider, ObjectStorage, Pipeline};
use crate::domain::model::{LocalArtifact, OrderBatch, RemoteObjectRef};
use crate::utils::error::Result;
use reqwest::Client;

/// Fetch → CSV → object store, wired to one config and one storage backend.
pub struct IngestPipeline<S: ObjectStorage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: ObjectStorage, C: ConfigProvider> IngestPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::with_client(storage, config, Client::new())
    }

    pub fn with_client(storage: S, config: C, client: Client) -> Self {
        Self {
            storage,
            config,
            client,
        }
    }
}

#[async_trait::async_trait]
impl<S: ObjectStorage, C: ConfigProvider> Pipeline for IngestPipeline<S, C> {
    async fn fetch(&self) -> Result<OrderBatch> {
        fetcher::fetch_orders(&self.client, &self.config).await
    }

    async fn write(&self, batch: OrderBatch) -> Result<LocalArtifact> {
        let captured_at = writer::capture_time(chrono::Utc::now());
        writer::write_artifact(self.config.output_dir(), &batch, captured_at).await
    }

    async fn upload(&self, artifact: &LocalArtifact) -> Result<RemoteObjectRef> {
        uploader::upload_artifact(&self.storage, self.config.key_prefix(), artifact).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                objects: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_object(&self, key: &str) -> Option<Vec<u8>> {
            self.objects.lock().await.get(key).cloned()
        }
    }

    impl ObjectStorage for MockStorage {
        fn bucket(&self) -> &str {
            "test-bucket"
        }

        async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<RemoteObjectRef> {
            self.objects.lock().await.insert(key.to_string(), data);
            Ok(RemoteObjectRef {
                bucket: "test-bucket".to_string(),
                key: key.to_string(),
                uri: format!("mem://test-bucket/{}", key),
            })
        }
    }

    struct MockConfig {
        api_endpoint: String,
        output_dir: PathBuf,
        headers: HashMap<String, String>,
        timeout: Option<Duration>,
    }

    impl MockConfig {
        fn new(api_endpoint: String, output_dir: &Path) -> Self {
            Self {
                api_endpoint,
                output_dir: output_dir.to_path_buf(),
                headers: HashMap::new(),
                timeout: Some(Duration::from_secs(5)),
            }
        }

        fn with_header(mut self, name: &str, value: &str) -> Self {
            self.headers.insert(name.to_string(), value.to_string());
            self
        }

        fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn query_params(&self) -> Vec<(String, String)> {
            vec![
                ("_quantity".to_string(), "2".to_string()),
                ("order_id".to_string(), "uuid".to_string()),
            ]
        }

        fn request_headers(&self) -> &HashMap<String, String> {
            &self.headers
        }

        fn request_timeout(&self) -> Option<Duration> {
            self.timeout
        }

        fn output_dir(&self) -> &Path {
            &self.output_dir
        }

        fn key_prefix(&self) -> &str {
            "raw"
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_query_params() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/custom")
                .query_param("_quantity", "2")
                .query_param("order_id", "uuid");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "status": "OK",
                    "data": [{"order_id": "a1"}, {"order_id": "a2"}]
                }));
        });

        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig::new(server.url("/custom"), temp_dir.path());
        let pipeline = IngestPipeline::new(MockStorage::new(), config);

        let batch = pipeline.fetch().await.unwrap();

        api_mock.assert();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records()[1].order_id(), Some("a2"));
    }

    #[tokio::test]
    async fn test_fetch_sends_configured_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/custom")
                .header("X-Api-Key", "secret")
                .header("Accept", "application/json");
            then.status(200).json_body(serde_json::json!({"data": [{"order_id": "a1"}]}));
        });

        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig::new(server.url("/custom"), temp_dir.path())
            .with_header("X-Api-Key", "secret")
            .with_header("Accept", "application/json");
        let pipeline = IngestPipeline::new(MockStorage::new(), config);

        let batch = pipeline.fetch().await.unwrap();

        api_mock.assert();
        assert_eq!(batch.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_slow_response_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/custom");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(serde_json::json!({"data": []}));
        });

        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig::new(server.url("/custom"), temp_dir.path())
            .with_timeout(Duration::from_millis(200));
        let pipeline = IngestPipeline::new(MockStorage::new(), config);

        match pipeline.fetch().await {
            Err(EtlError::Network(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_invalid_header_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig::new("http://127.0.0.1:9/custom".to_string(), temp_dir.path())
            .with_header("bad header", "x");
        let pipeline = IngestPipeline::new(MockStorage::new(), config);

        let err = pipeline.fetch().await.unwrap_err();

        assert!(matches!(err, EtlError::ConfigError { .. }), "got {err:?}");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/custom");
            then.status(503).body("maintenance");
        });

        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig::new(server.url("/custom"), temp_dir.path());
        let pipeline = IngestPipeline::new(MockStorage::new(), config);

        let err = pipeline.fetch().await.unwrap_err();

        api_mock.assert();
        match err {
            EtlError::HttpStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_json_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/custom");
            then.status(200).body("{\"data\": [");
        });

        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig::new(server.url("/custom"), temp_dir.path());
        let pipeline = IngestPipeline::new(MockStorage::new(), config);

        assert!(matches!(
            pipeline.fetch().await,
            Err(EtlError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_endpoint_is_network_error() {
        let temp_dir = TempDir::new().unwrap();
        // Port 9 (discard) on loopback is not expected to accept HTTP.
        let config = MockConfig::new("http://127.0.0.1:9/custom".to_string(), temp_dir.path());
        let pipeline = IngestPipeline::new(MockStorage::new(), config);

        assert!(matches!(
            pipeline.fetch().await,
            Err(EtlError::Network(_))
        ));
    }

    #[tokio::test]
    async fn test_write_then_upload_uses_prefixed_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = MockStorage::new();
        let config = MockConfig::new("http://unused".to_string(), temp_dir.path());
        let pipeline = IngestPipeline::new(storage.clone(), config);

        let batch = crate::core::fetcher::parse_envelope(
            r#"{"data":[{"order_id":"a1","customer":"Jane Doe","total":"19.99","created_at":"2024-01-01"}]}"#,
        )
        .unwrap();

        let artifact = pipeline.write(batch).await.unwrap();
        assert!(artifact.path.starts_with(temp_dir.path()));

        let remote = pipeline.upload(&artifact).await.unwrap();
        assert_eq!(remote.key, format!("raw/{}", artifact.filename));

        let uploaded = storage.get_object(&remote.key).await.unwrap();
        assert_eq!(uploaded, std::fs::read(&artifact.path).unwrap());
    }

    #[tokio::test]
    async fn test_upload_missing_local_file_is_filesystem_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig::new("http://unused".to_string(), temp_dir.path());
        let pipeline = IngestPipeline::new(MockStorage::new(), config);

        let artifact = LocalArtifact {
            path: temp_dir.path().join("orders_20240101_000000.csv"),
            filename: "orders_20240101_000000.csv".to_string(),
            rows: 0,
        };

        assert!(matches!(
            pipeline.upload(&artifact).await,
            Err(EtlError::Filesystem { .. })
        ));
    }
}
