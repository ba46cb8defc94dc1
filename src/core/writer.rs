use crate::domain::model::{LocalArtifact, OrderBatch};
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::path::Path;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Capture timestamps are UTC so a daylight-saving fall-back cannot repeat a filename.
pub fn capture_time(now: DateTime<Utc>) -> NaiveDateTime {
    now.naive_utc()
}

/// `orders_<YYYYMMDD_HHMMSS>.csv`
pub fn artifact_filename(captured_at: NaiveDateTime) -> String {
    format!("orders_{}.csv", captured_at.format(TIMESTAMP_FORMAT))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Serialize a batch as CSV. An empty batch encodes to zero bytes, without a header.
pub fn encode_csv(batch: &OrderBatch) -> Result<Vec<u8>> {
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    let columns = batch.columns();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;

    for record in batch.records() {
        writer.write_record(columns.iter().map(|column| cell_text(record.get(column))))?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::Csv(csv::Error::from(e.into_error())))
}

/// Write the batch under `dir`, creating the directory if needed.
/// A file with the same name is overwritten.
pub async fn write_artifact(
    dir: &Path,
    batch: &OrderBatch,
    captured_at: NaiveDateTime,
) -> Result<LocalArtifact> {
    let filename = artifact_filename(captured_at);
    let path = dir.join(&filename);

    let bytes = encode_csv(batch)?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| EtlError::filesystem(dir, e))?;
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| EtlError::filesystem(&path, e))?;

    tracing::debug!(
        "Wrote {} rows ({} bytes) to {}",
        batch.len(),
        bytes.len(),
        path.display()
    );

    Ok(LocalArtifact {
        path,
        filename,
        rows: batch.len(),
    })
}
