use tracing::info;

use crate::domain::conversion::ExportArtifact;
use crate::domain::error::Result;
use crate::domain::formats::ExportFormat;
use crate::domain::table::Table;
use crate::infrastructure::config::ExportSettings;
use crate::infrastructure::csv::CsvWriter;
use crate::infrastructure::excel::XlsxWriter;
use crate::infrastructure::json::JsonWriter;

/// Serializes a table into the chosen target format
pub struct Exporter {
    settings: ExportSettings,
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    pub fn export(
        &self,
        table: &Table,
        original_name: &str,
        format: ExportFormat,
    ) -> Result<ExportArtifact> {
        let bytes = match format {
            ExportFormat::Csv => CsvWriter::new().write(table)?,
            ExportFormat::Excel => XlsxWriter::new(self.settings.sheet_name.as_str()).write(table)?,
            ExportFormat::Json => JsonWriter::new().write(table)?,
        };

        let artifact = ExportArtifact {
            file_name: format.output_file_name(original_name),
            mime: format.mime(),
            bytes,
        };

        info!(
            file_name = %artifact.file_name,
            format = %format,
            bytes = artifact.bytes.len(),
            "File converted"
        );

        Ok(artifact)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::ingestion_resolver::IngestionResolver;

    const PEOPLE_CSV: &str = "name,age\nAda,36\nAlan,41\n";

    fn people() -> Table {
        IngestionResolver::default()
            .parse("people.csv", PEOPLE_CSV.as_bytes())
            .unwrap()
            .table
    }

    #[test]
    fn test_csv_export() {
        let artifact = Exporter::default()
            .export(&people(), "people.csv", ExportFormat::Csv)
            .unwrap();
        assert_eq!(artifact.file_name, "people.csv");
        assert_eq!(artifact.mime, "text/csv");
        assert_eq!(String::from_utf8(artifact.bytes).unwrap(), PEOPLE_CSV);
    }

    #[test]
    fn test_json_export() {
        let artifact = Exporter::default()
            .export(&people(), "people.csv", ExportFormat::Json)
            .unwrap();
        assert_eq!(artifact.file_name, "people.json");
        assert_eq!(artifact.mime, "application/json");
        assert_eq!(
            String::from_utf8(artifact.bytes).unwrap(),
            r#"[{"name":"Ada","age":36},{"name":"Alan","age":41}]"#
        );
    }

    #[test]
    fn test_excel_export_reads_back() {
        let table = people();
        let artifact = Exporter::default()
            .export(&table, "people.csv", ExportFormat::Excel)
            .unwrap();
        assert_eq!(artifact.file_name, "people.xlsx");
        assert_eq!(
            artifact.mime,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );

        let reparsed = IngestionResolver::default()
            .parse(&artifact.file_name, &artifact.bytes)
            .unwrap()
            .table;
        assert_eq!(reparsed, table);
    }

    #[test]
    fn test_excel_export_accepts_oversized_cells() {
        let content = format!("note\n{}\n", "x".repeat(40_000));
        let table = IngestionResolver::default()
            .parse("notes.csv", content.as_bytes())
            .unwrap()
            .table;
        let artifact = Exporter::default()
            .export(&table, "notes.csv", ExportFormat::Excel)
            .unwrap();
        assert_eq!(artifact.file_name, "notes.xlsx");
    }
}
