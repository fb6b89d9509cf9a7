pub mod batch_converter;
pub mod exporter;
pub mod ingestion_resolver;
pub mod transform_pipeline;
