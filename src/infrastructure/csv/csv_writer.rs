// ============================================================
// CSV WRITER
// ============================================================
// Serialize a Table as comma-delimited text with a header row

use csv::{Terminator, WriterBuilder};

use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;

pub struct CsvWriter {
    delimiter: u8,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header row first, no row-index column. Missing cells are empty fields.
    pub fn write(&self, table: &Table) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(table.column_names())
            .map_err(|e| AppError::ExportError(format!("Failed to write CSV header: {}", e)))?;

        for (index, row) in table.rows().enumerate() {
            writer
                .write_record(row.iter().map(|value| value.to_text()))
                .map_err(|e| {
                    AppError::ExportError(format!("Failed to write CSV row {}: {}", index + 1, e))
                })?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::ExportError(format!("Failed to flush CSV output: {}", e)))
    }
}
