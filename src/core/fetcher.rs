use crate::core::ConfigProvider;
use crate::domain::model::{OrderBatch, OrderRecord};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

/// Longest slice of an error body kept in `HttpStatus`.
const MAX_ERROR_BODY: usize = 512;

/// Response envelope. Only `data` matters; the rest is logged when present.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    total: Option<Value>,
    #[serde(default)]
    data: Option<Vec<OrderRecord>>,
}

/// Single GET against the configured endpoint. Any non-2xx status fails the run.
pub async fn fetch_orders<C: ConfigProvider>(client: &Client, config: &C) -> Result<OrderBatch> {
    let params = config.query_params();
    tracing::debug!(
        "Making API request to: {} with {} query parameters",
        config.api_endpoint(),
        params.len()
    );

    let mut request = client.get(config.api_endpoint()).query(&params);
    for (key, value) in config.request_headers() {
        request = request.header(key, value);
    }
    if let Some(timeout) = config.request_timeout() {
        request = request.timeout(timeout);
    }

    let response = request.send().await?;
    let status = response.status();
    tracing::debug!("API response status: {}", status);

    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Could not read error response body: {}", e);
                String::new()
            }
        };
        return Err(EtlError::HttpStatus {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        });
    }

    let body = response.text().await?;
    parse_envelope(&body)
}

/// Decode the API body. A missing or null `data` field yields an empty batch.
pub fn parse_envelope(body: &str) -> Result<OrderBatch> {
    let envelope: Envelope = serde_json::from_str(body)?;

    if envelope.status.is_some() || envelope.code.is_some() || envelope.total.is_some() {
        tracing::debug!(
            "API envelope: status={:?}, code={:?}, total={:?}",
            envelope.status,
            envelope.code,
            envelope.total
        );
    }

    match envelope.data {
        Some(records) => Ok(OrderBatch::new(records)),
        None => {
            tracing::warn!("API response has no `data` field, continuing with an empty batch");
            Ok(OrderBatch::default())
        }
    }
}
