// ============================================================
// BATCH CONVERTER USE CASE
// ============================================================
// Run every upload through ingest -> transform -> (chart) -> export.
// Uploads are independent; a failure is reported for that file only.

use std::collections::HashMap;

use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use super::exporter::Exporter;
use super::ingestion_resolver::IngestionResolver;
use super::transform_pipeline::TransformPipeline;
use crate::domain::conversion::{FileOptions, FileReport, TablePreview, UploadDescriptor};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::ConverterConfig;

/// Reports for one batch, in upload order
#[derive(Debug)]
pub struct BatchResult {
    pub batch_id: Uuid,
    pub reports: Vec<FileReport>,
}

pub struct BatchConverter {
    resolver: IngestionResolver,
    pipeline: TransformPipeline,
    exporter: Exporter,
    preview_rows: usize,
}

impl BatchConverter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            resolver: IngestionResolver::new(config.ingest.clone()),
            pipeline: TransformPipeline::new(config.chart.clone()),
            exporter: Exporter::new(config.export.clone()),
            preview_rows: config.preview.rows,
        }
    }

    /// Options are looked up by file name; files without an entry get the
    /// default options (no transforms, no export)
    pub fn convert(
        &self,
        uploads: &[UploadDescriptor],
        options: &HashMap<String, FileOptions>,
    ) -> BatchResult {
        let batch_id = Uuid::new_v4();
        let span = info_span!("convert_batch", batch_id = %batch_id, files = uploads.len());
        let _guard = span.enter();

        let default_options = FileOptions::default();
        let reports: Vec<FileReport> = uploads
            .iter()
            .map(|upload| {
                let file_options = options.get(&upload.file_name).unwrap_or(&default_options);
                self.convert_one(upload, file_options)
            })
            .collect();

        let failed = reports.iter().filter(|r| r.is_failed()).count();
        info!(
            converted = reports.len() - failed,
            failed = failed,
            "Batch finished"
        );

        BatchResult { batch_id, reports }
    }

    pub fn convert_one(&self, upload: &UploadDescriptor, options: &FileOptions) -> FileReport {
        match self.run(upload, options) {
            Ok(report) => report,
            Err(err) => {
                match &err {
                    AppError::UnsupportedFormat(_) => {
                        warn!(file_name = %upload.file_name, error = %err, "Skipping upload")
                    }
                    _ => error!(file_name = %upload.file_name, error = %err, "Upload failed"),
                }
                FileReport::Failed {
                    file_name: upload.file_name.clone(),
                    kind: err.kind(),
                    message: err.to_string(),
                }
            }
        }
    }

    fn run(&self, upload: &UploadDescriptor, options: &FileOptions) -> Result<FileReport> {
        let ingested = self.resolver.parse(&upload.file_name, &upload.content)?;
        let mut table = ingested.table;
        let ingested_preview = TablePreview::from_table(&table, self.preview_rows);

        let transform = self.pipeline.apply(&mut table, &options.flags);

        let chart = if options.flags.show_chart {
            self.pipeline.chart_data(&table)
        } else {
            None
        };

        let export = match options.export_format {
            Some(format) => Some(self.exporter.export(&table, &upload.file_name, format)?),
            None => None,
        };

        Ok(FileReport::Converted {
            file_name: upload.file_name.clone(),
            advisories: ingested.advisories,
            ingested_preview,
            preview: TablePreview::from_table(&table, self.preview_rows),
            transform,
            chart,
            export,
        })
    }
}

impl Default for BatchConverter {
    fn default() -> Self {
        Self::new(&ConverterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversion::{IngestAdvisory, TransformFlags};
    use crate::domain::formats::ExportFormat;
    use crate::domain::table::Value;

    fn uploads() -> Vec<UploadDescriptor> {
        vec![
            UploadDescriptor::new("notes.txt", "just text"),
            UploadDescriptor::new("sales.csv", "item,qty\npen,1\npen,1\nink,\n"),
            UploadDescriptor::new("events.json", "{\"id\": 1}\n{\"id\": 2}\n"),
            UploadDescriptor::new("bad.json", "42"),
        ]
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let result = BatchConverter::default().convert(&uploads(), &HashMap::new());
        assert_eq!(result.reports.len(), 4);

        let names: Vec<&str> = result.reports.iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["notes.txt", "sales.csv", "events.json", "bad.json"]);

        match &result.reports[0] {
            FileReport::Failed { kind, message, .. } => {
                assert_eq!(*kind, "unsupported_format");
                assert!(message.contains("txt"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!result.reports[1].is_failed());
        assert!(!result.reports[2].is_failed());
        match &result.reports[3] {
            FileReport::Failed { kind, .. } => assert_eq!(*kind, "unsupported_json_shape"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_options_are_per_file() {
        let mut options = HashMap::new();
        options.insert(
            "sales.csv".to_string(),
            FileOptions {
                flags: TransformFlags {
                    remove_duplicates: true,
                    fill_missing: true,
                    show_chart: true,
                    ..TransformFlags::default()
                },
                export_format: Some(ExportFormat::Json),
            },
        );

        let result = BatchConverter::default().convert(&uploads(), &options);

        match &result.reports[1] {
            FileReport::Converted {
                transform,
                chart,
                export,
                ingested_preview,
                preview,
                ..
            } => {
                assert_eq!(transform.duplicates_removed, 1);
                assert_eq!(transform.cells_filled, 1);
                assert_eq!(ingested_preview.total_rows, 3);
                assert_eq!(ingested_preview.rows[2][1], Value::Null);
                assert_eq!(preview.total_rows, 2);
                assert_eq!(preview.rows[1][1], Value::Int(1));
                assert_eq!(chart.as_ref().map(|c| c.series.len()), Some(1));
                let export = export.as_ref().unwrap();
                assert_eq!(export.file_name, "sales.json");
                assert_eq!(
                    String::from_utf8(export.bytes.clone()).unwrap(),
                    r#"[{"item":"pen","qty":1},{"item":"ink","qty":1}]"#
                );
            }
            other => panic!("expected conversion, got {:?}", other),
        }

        match &result.reports[2] {
            FileReport::Converted {
                advisories,
                export,
                chart,
                ..
            } => {
                assert_eq!(advisories, &vec![IngestAdvisory::LineDelimitedFallback]);
                assert!(export.is_none());
                assert!(chart.is_none());
            }
            other => panic!("expected conversion, got {:?}", other),
        }
    }

    #[test]
    fn test_preview_is_limited_by_config() {
        let mut config = ConverterConfig::default();
        config.preview.rows = 1;
        let converter = BatchConverter::new(&config);

        let report = converter.convert_one(
            &UploadDescriptor::new("n.csv", "n\n1\n2\n3\n"),
            &FileOptions::default(),
        );
        match report {
            FileReport::Converted { preview, .. } => {
                assert_eq!(preview.rows.len(), 1);
                assert_eq!(preview.total_rows, 3);
            }
            other => panic!("expected conversion, got {:?}", other),
        }
    }
}
