use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;

/// One synthetic order as returned by the API.
///
/// Fields keep the order the API sent them in; the reference shape is
/// `order_id`, `customer`, `total`, `created_at`, but nothing here enforces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRecord {
    fields: Map<String, Value>,
}

impl OrderRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn order_id(&self) -> Option<&str> {
        self.get("order_id").and_then(Value::as_str)
    }

    pub fn customer(&self) -> Option<&str> {
        self.get("customer").and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for OrderRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// All records fetched in one run, in API order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBatch {
    records: Vec<OrderRecord>,
}

impl OrderBatch {
    pub fn new(records: Vec<OrderRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    /// Column names in first-seen order across the batch.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for name in record.field_names() {
                if !columns.iter().any(|c| c == name) {
                    columns.push(name.to_string());
                }
            }
        }
        columns
    }
}

impl From<Vec<OrderRecord>> for OrderBatch {
    fn from(records: Vec<OrderRecord>) -> Self {
        Self::new(records)
    }
}

/// CSV file written to local storage before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArtifact {
    pub path: PathBuf,
    pub filename: String,
    pub rows: usize,
}

/// Where an artifact ended up in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteObjectRef {
    pub bucket: String,
    pub key: String,
    pub uri: String,
}

impl fmt::Display for RemoteObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub records: usize,
    pub artifact: LocalArtifact,
    pub remote: RemoteObjectRef,
}
