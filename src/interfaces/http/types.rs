use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::conversion::{
    ChartData, ExportArtifact, FileOptions, FileReport, IngestAdvisory, TablePreview,
    TransformReport,
};
use crate::domain::error::AppError;

#[derive(Debug, Deserialize, Validate)]
pub struct ConvertRequest {
    #[validate(length(min = 1, message = "at least one file is required"), nested)]
    pub files: Vec<UploadRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, message = "file_name must not be empty"))]
    pub file_name: String,
    pub content_base64: String,
    #[serde(default)]
    pub options: FileOptions,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub batch_id: String,
    pub results: Vec<FileResult>,
}

#[derive(Debug, Serialize)]
pub struct AdvisoryDto {
    #[serde(flatten)]
    pub advisory: IngestAdvisory,
    pub message: &'static str,
}

impl From<IngestAdvisory> for AdvisoryDto {
    fn from(advisory: IngestAdvisory) -> Self {
        let message = advisory.message();
        Self { advisory, message }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportDto {
    pub file_name: String,
    pub mime: &'static str,
    pub content_base64: String,
}

impl From<ExportArtifact> for ExportDto {
    fn from(artifact: ExportArtifact) -> Self {
        Self {
            file_name: artifact.file_name,
            mime: artifact.mime,
            content_base64: STANDARD.encode(&artifact.bytes),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileResult {
    Converted {
        file_name: String,
        advisories: Vec<AdvisoryDto>,
        ingested_preview: TablePreview,
        preview: TablePreview,
        transform: TransformReport,
        chart: Option<ChartData>,
        export: Option<ExportDto>,
    },
    Failed {
        file_name: String,
        kind: &'static str,
        message: String,
    },
}

impl FileResult {
    pub fn failed(file_name: &str, err: &AppError) -> Self {
        FileResult::Failed {
            file_name: file_name.to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<FileReport> for FileResult {
    fn from(report: FileReport) -> Self {
        match report {
            FileReport::Converted {
                file_name,
                advisories,
                ingested_preview,
                preview,
                transform,
                chart,
                export,
            } => FileResult::Converted {
                file_name,
                advisories: advisories.into_iter().map(AdvisoryDto::from).collect(),
                ingested_preview,
                preview,
                transform,
                chart,
                export: export.map(ExportDto::from),
            },
            FileReport::Failed {
                file_name,
                kind,
                message,
            } => FileResult::Failed {
                file_name,
                kind,
                message,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub kind: &'static str,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
