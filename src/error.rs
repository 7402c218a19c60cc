use std::path::PathBuf;

use thiserror::Error;

/// Error code printed when a meet file has no version marker at all.
pub const CODE_MISSING_VERSION: u32 = 1000;
/// Error code printed when a meet file carries an unsupported version.
pub const CODE_UNSUPPORTED_VERSION: u32 = 1001;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("[{CODE_MISSING_VERSION}] file {} has no version marker and is not supported", path.display())]
    MissingVersion { path: PathBuf },

    #[error("[{CODE_UNSUPPORTED_VERSION}] version {version} of file {} is not supported", path.display())]
    UnsupportedVersion { path: PathBuf, version: String },

    #[error("file {} has no data sheet", path.display())]
    MissingSheet { path: PathBuf },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Stable numeric code for fatal format-incompatibility errors.
    ///
    /// Field positions in a hierarchical meet file are version-locked, so an
    /// unsupported or missing version marker terminates the whole run.
    pub fn fatal_code(&self) -> Option<u32> {
        match self {
            PipelineError::MissingVersion { .. } => Some(CODE_MISSING_VERSION),
            PipelineError::UnsupportedVersion { .. } => Some(CODE_UNSUPPORTED_VERSION),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
