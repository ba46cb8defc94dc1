pub mod etl;
pub mod fetcher;
pub mod pipeline;
pub mod uploader;
pub mod writer;

pub use crate::domain::model::{LocalArtifact, OrderBatch, OrderRecord, RemoteObjectRef, RunReport};
pub use crate::domain::ports::{ConfigProvider, ObjectStorage, Pipeline};
pub use crate::utils::error::Result;
