pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

mod app;

pub use app::run;
pub use application::{BatchConverter, BatchResult, Exporter, IngestionResolver, TransformPipeline};
pub use domain::conversion::{
    ExportArtifact, FileOptions, FileReport, IngestAdvisory, IngestedTable, TransformFlags,
    UploadDescriptor,
};
pub use domain::error::{AppError, Result};
pub use domain::formats::{ExportFormat, SourceFormat};
pub use domain::table::{Column, ColumnType, Table, Value};
pub use infrastructure::config::ConverterConfig;
