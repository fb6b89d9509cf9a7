use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::{AppError, Result};

/// Lower-cased text after the last `.` of a file name.
/// A name without a dot yields the whole name, lower-cased.
pub fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Formats an upload can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Xlsx,
    Json,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" => Ok(SourceFormat::Xlsx),
            "json" => Ok(SourceFormat::Json),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_file_name(file_name: &str) -> Result<Self> {
        Self::from_extension(&extension_of(file_name))
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "csv"),
            SourceFormat::Xlsx => write!(f, "xlsx"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}

/// Formats a table can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }

    /// Original name with its final extension swapped for this format's
    pub fn output_file_name(&self, original: &str) -> String {
        match original.rfind('.') {
            Some(idx) => format!("{}.{}", &original[..idx], self.extension()),
            None => format!("{}.{}", original, self.extension()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "CSV"),
            ExportFormat::Excel => write!(f, "Excel"),
            ExportFormat::Json => write!(f, "JSON"),
        }
    }
}
