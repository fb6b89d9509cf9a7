// ============================================================
// CONVERSION TYPES
// ============================================================
// Values flowing through one upload's ingest -> transform -> export cycle

use serde::{Deserialize, Serialize};

use super::formats::ExportFormat;
use super::table::{ColumnType, Table, Value};

/// One uploaded file
#[derive(Debug, Clone)]
pub struct UploadDescriptor {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadDescriptor {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Cleaning operations chosen for one file. All independent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformFlags {
    pub remove_duplicates: bool,
    pub fill_missing: bool,
    /// Columns to keep, in order. `None` keeps every column.
    pub retain_columns: Option<Vec<String>>,
    pub show_chart: bool,
}

/// Everything the caller chose for one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    #[serde(flatten)]
    pub flags: TransformFlags,
    /// No export is produced when unset
    pub export_format: Option<ExportFormat>,
}

/// Non-fatal notice that ingestion corrected a format assumption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngestAdvisory {
    /// Content had data after the first JSON value and was read as one
    /// JSON object per line
    LineDelimitedFallback,
}

impl IngestAdvisory {
    pub fn message(&self) -> &'static str {
        match self {
            IngestAdvisory::LineDelimitedFallback => {
                "JSON file has trailing data. Read it as newline-delimited JSON instead."
            }
        }
    }
}

/// Result of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub table: Table,
    pub advisories: Vec<IngestAdvisory>,
}

impl IngestedTable {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            advisories: Vec::new(),
        }
    }

    pub fn with_advisory(mut self, advisory: IngestAdvisory) -> Self {
        self.advisories.push(advisory);
        self
    }
}

/// What the transform pipeline changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformReport {
    pub duplicates_removed: usize,
    pub cells_filled: usize,
    /// Retained-column names that did not exist in the table
    pub unknown_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub column: String,
    pub values: Vec<Option<f64>>,
}

/// Numeric columns exposed for plotting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub row_count: usize,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub dtype: ColumnType,
}

/// Head of a table, row-major, for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePreview {
    pub columns: Vec<ColumnSummary>,
    pub rows: Vec<Vec<Value>>,
    pub total_rows: usize,
}

impl TablePreview {
    pub fn from_table(table: &Table, rows: usize) -> Self {
        let head = table.head(rows);
        Self {
            columns: table
                .columns()
                .iter()
                .map(|c| ColumnSummary {
                    name: c.name.clone(),
                    dtype: c.dtype,
                })
                .collect(),
            rows: head
                .rows()
                .map(|row| row.into_iter().cloned().collect())
                .collect(),
            total_rows: table.row_count(),
        }
    }
}

/// Serialized output of one file
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Per-file outcome of a batch
#[derive(Debug, Clone)]
pub enum FileReport {
    Converted {
        file_name: String,
        advisories: Vec<IngestAdvisory>,
        /// Head of the table as ingested
        ingested_preview: TablePreview,
        /// Head after the selected transforms
        preview: TablePreview,
        transform: TransformReport,
        chart: Option<ChartData>,
        export: Option<ExportArtifact>,
    },
    Failed {
        file_name: String,
        kind: &'static str,
        message: String,
    },
}

impl FileReport {
    pub fn file_name(&self) -> &str {
        match self {
            FileReport::Converted { file_name, .. } => file_name,
            FileReport::Failed { file_name, .. } => file_name,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileReport::Failed { .. })
    }
}
