pub mod use_cases;

pub use use_cases::batch_converter::{BatchConverter, BatchResult};
pub use use_cases::exporter::Exporter;
pub use use_cases::ingestion_resolver::IngestionResolver;
pub use use_cases::transform_pipeline::TransformPipeline;
