use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read run configuration '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse run configuration")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid run configuration: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}
