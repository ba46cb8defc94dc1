use std::path::PathBuf;
use thiserror::Error;

/// Stage of a run an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Config,
    Fetch,
    Write,
    Upload,
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("API responded with HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload to {bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl EtlError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn stage(&self) -> ErrorStage {
        match self {
            Self::Network(_) | Self::HttpStatus { .. } | Self::Decode(_) => ErrorStage::Fetch,
            Self::Csv(_) | Self::Filesystem { .. } => ErrorStage::Write,
            Self::Upload { .. } => ErrorStage::Upload,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => ErrorStage::Config,
        }
    }

    /// Process exit status for a run that ended with this error.
    pub fn exit_code(&self) -> u8 {
        match self.stage() {
            ErrorStage::Config => 2,
            ErrorStage::Fetch => 3,
            ErrorStage::Write => 4,
            ErrorStage::Upload => 5,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Network(_) => "Check network connectivity and that the API endpoint is reachable",
            Self::HttpStatus { status, .. } if *status >= 500 => {
                "The API is failing server-side; rerun the job later"
            }
            Self::HttpStatus { .. } => "Check the endpoint URL and query parameters",
            Self::Decode(_) => "The API returned an unexpected body; verify the endpoint serves a JSON `data` array",
            Self::Csv(_) => "Inspect the offending records for values that cannot be encoded",
            Self::Filesystem { .. } => "Check permissions and free space for the local output directory",
            Self::Upload { .. } => "Check bucket name, ambient credentials and network access to the object store",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
        }
    }
}

impl From<reqwest::Error> for EtlError {
    /// A request that could not be built (bad header name/value, bad URL) is a
    /// configuration problem, not a fetch failure.
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::config(format!("Invalid HTTP request: {err}"))
        } else {
            Self::Network(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
