// ============================================================
// INGESTION RESOLVER USE CASE
// ============================================================
// Pick a parser from the file extension and turn upload bytes into a Table

use std::time::Instant;

use tracing::{debug, info};

use crate::domain::conversion::IngestedTable;
use crate::domain::error::Result;
use crate::domain::formats::SourceFormat;
use crate::infrastructure::config::IngestSettings;
use crate::infrastructure::csv::CsvParser;
use crate::infrastructure::excel::XlsxReader;
use crate::infrastructure::json::{JsonResolver, JsonTableBuilder};

pub struct IngestionResolver {
    settings: IngestSettings,
}

impl IngestionResolver {
    pub fn new(settings: IngestSettings) -> Self {
        Self { settings }
    }

    pub fn default_config() -> Self {
        Self::new(IngestSettings::default())
    }

    /// Parse one upload. An unknown extension fails before any parsing.
    pub fn parse(&self, file_name: &str, bytes: &[u8]) -> Result<IngestedTable> {
        let start = Instant::now();
        let format = SourceFormat::from_file_name(file_name)?;
        debug!(file_name = %file_name, format = %format, bytes = bytes.len(), "Parsing upload");

        let ingested = match format {
            SourceFormat::Csv => {
                let parser = CsvParser::new().with_inference(self.settings.type_inference());
                IngestedTable::new(parser.parse_bytes(bytes)?)
            }
            SourceFormat::Xlsx => {
                let reader = XlsxReader::new(self.settings.type_inference());
                IngestedTable::new(reader.parse_bytes(bytes)?)
            }
            SourceFormat::Json => {
                let builder = JsonTableBuilder::new(
                    self.settings.type_inference(),
                    self.settings.json_normalize_depth,
                );
                JsonResolver::new(builder).resolve(bytes)?
            }
        };

        info!(
            file_name = %file_name,
            format = %format,
            rows = ingested.table.row_count(),
            columns = ingested.table.column_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Parsed upload"
        );

        Ok(ingested)
    }
}

impl Default for IngestionResolver {
    fn default() -> Self {
        Self::default_config()
    }
}
