use crate::config::{IngestConfig, StorageKind};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// Every flag is optional; a bare invocation runs the job with built-in defaults.
#[derive(Debug, Clone, Parser)]
#[command(name = "retail-ingestor")]
#[command(about = "Fetch synthetic orders, write them to CSV and upload to object storage")]
pub struct CliArgs {
    /// TOML file layered over the built-in defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub api_url: Option<String>,

    #[arg(long)]
    pub bucket: Option<String>,

    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub backend: Option<StorageKind>,

    /// Bucket mirror directory for the local backend
    #[arg(long)]
    pub local_root: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliArgs {
    /// Defaults, then the config file if given, then flags.
    pub fn load_config(&self) -> Result<IngestConfig> {
        let mut config = match &self.config {
            Some(path) => IngestConfig::from_file(path)?,
            None => IngestConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut IngestConfig) {
        if let Some(url) = &self.api_url {
            config.source.endpoint = url.clone();
        }
        if let Some(bucket) = &self.bucket {
            config.upload.bucket = bucket.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.local_dir = dir.clone();
        }
        if let Some(backend) = self.backend {
            config.upload.backend = backend;
        }
        if let Some(root) = &self.local_root {
            config.upload.local_root = Some(root.clone());
        }
    }
}
