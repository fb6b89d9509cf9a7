use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    /// Extension is not one of the supported source formats
    UnsupportedFormat(String),
    /// The parser rejected the byte content
    MalformedSource(String),
    /// Decoded JSON top-level value is neither a list nor an object
    UnsupportedJsonShape(String),
    ValidationError(String),
    ConfigError(String),
    ExportError(String),
    IoError(String),
    Internal(String),
}

impl AppError {
    /// Stable tag used when errors cross the HTTP boundary
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::UnsupportedFormat(_) => "unsupported_format",
            AppError::MalformedSource(_) => "malformed_source",
            AppError::UnsupportedJsonShape(_) => "unsupported_json_shape",
            AppError::ValidationError(_) => "validation_error",
            AppError::ConfigError(_) => "config_error",
            AppError::ExportError(_) => "export_error",
            AppError::IoError(_) => "io_error",
            AppError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::UnsupportedFormat(ext) => write!(f, "Unsupported file format: {}", ext),
            AppError::MalformedSource(msg) => write!(f, "Malformed source: {}", msg),
            AppError::UnsupportedJsonShape(msg) => {
                write!(f, "Unsupported JSON structure: {}", msg)
            }
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::ExportError(msg) => write!(f, "Export error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
