pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::storage::{LocalStorage, S3Storage, StorageBackend};
pub use config::IngestConfig;
pub use crate::core::{etl::IngestEngine, etl::RunState, pipeline::IngestPipeline};
pub use domain::model::{LocalArtifact, OrderBatch, OrderRecord, RemoteObjectRef, RunReport};
pub use utils::error::{EtlError, Result};
