#[cfg(feature = "cli")]
pub mod cli;

use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://fakerapi.it/api/v1/custom";
pub const DEFAULT_QUANTITY: u32 = 100;
pub const DEFAULT_LOCAL_DIR: &str = "./data/raw/";
pub const DEFAULT_BUCKET: &str = "retail-data-pipeline";
pub const DEFAULT_KEY_PREFIX: &str = "raw";

/// Run configuration, built once at startup and handed to every component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub quantity: u32,
    pub timeout_seconds: Option<u64>,
    pub headers: HashMap<String, String>,
    pub fields: Vec<FieldSpec>,
}

/// One `<name>=<generator>` query pair asking the API for a synthetic column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub generator: String,
}

impl FieldSpec {
    pub fn new(name: &str, generator: &str) -> Self {
        Self {
            name: name.to_string(),
            generator: generator.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub local_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum StorageKind {
    #[default]
    S3,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub backend: StorageKind,
    pub bucket: String,
    pub prefix: String,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub local_root: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_URL.to_string(),
            quantity: DEFAULT_QUANTITY,
            timeout_seconds: None,
            headers: HashMap::new(),
            fields: vec![
                FieldSpec::new("order_id", "uuid"),
                FieldSpec::new("customer", "name"),
                FieldSpec::new("total", "price"),
                FieldSpec::new("created_at", "date"),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from(DEFAULT_LOCAL_DIR),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::S3,
            bucket: DEFAULT_BUCKET.to_string(),
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            region: None,
            endpoint_url: None,
            local_root: None,
        }
    }
}

impl IngestConfig {
    /// Load a TOML file; sections and keys it omits keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EtlError::config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        toml::from_str(&processed)
            .map_err(|e| EtlError::config(format!("TOML parsing error: {}", e)))
    }
}

/// Replace `${VAR}` with the environment value; unknown variables stay as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| EtlError::config(format!("Invalid substitution pattern: {}", e)))?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

impl Validate for IngestConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_range("source.quantity", self.source.quantity, 1, 1000)?;
        validation::validate_unique_names(
            "source.fields",
            self.source.fields.iter().map(|f| f.name.as_str()),
        )?;
        for field in &self.source.fields {
            validation::validate_non_empty_string("source.fields.generator", &field.generator)?;
        }

        validation::validate_path(
            "output.local_dir",
            &self.output.local_dir.to_string_lossy(),
        )?;

        validation::validate_bucket_name("upload.bucket", &self.upload.bucket)?;
        if let Some(endpoint) = &self.upload.endpoint_url {
            validation::validate_url("upload.endpoint_url", endpoint)?;
        }
        if let Some(region) = &self.upload.region {
            validation::validate_non_empty_string("upload.region", region)?;
        }
        if self.upload.backend == StorageKind::Local {
            match &self.upload.local_root {
                Some(root) => {
                    validation::validate_path("upload.local_root", &root.to_string_lossy())?
                }
                None => {
                    return Err(EtlError::InvalidConfigValueError {
                        field: "upload.local_root".to_string(),
                        value: String::new(),
                        reason: "Required when upload.backend = \"local\"".to_string(),
                    })
                }
            }
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

impl ConfigProvider for IngestConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn query_params(&self) -> Vec<(String, String)> {
        std::iter::once(("_quantity".to_string(), self.source.quantity.to_string()))
            .chain(
                self.source
                    .fields
                    .iter()
                    .map(|f| (f.name.clone(), f.generator.clone())),
            )
            .collect()
    }

    fn request_headers(&self) -> &HashMap<String, String> {
        &self.source.headers
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn output_dir(&self) -> &Path {
        &self.output.local_dir
    }

    fn key_prefix(&self) -> &str {
        &self.upload.prefix
    }
}
