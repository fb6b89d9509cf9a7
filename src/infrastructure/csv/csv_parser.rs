// ============================================================
// CSV PARSER
// ============================================================
// Parse comma-delimited bytes with a header row into a Table

use std::borrow::Cow;

use csv::ReaderBuilder;
use encoding_rs::{Encoding, UTF_8};

use crate::domain::error::{AppError, Result};
use crate::domain::table::{normalize_headers, Column, Table, TypeInference};

/// Comma-delimited, untrimmed fields; BOM-aware decoding and explicit
/// type inference
#[derive(Default)]
pub struct CsvParser {
    inference: TypeInference,
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inference(mut self, inference: TypeInference) -> Self {
        self.inference = inference;
        self
    }

    /// Decode and parse raw upload bytes
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let content = decode(bytes)?;
        self.parse_content(&content)
    }

    /// Parse CSV content from string
    pub fn parse_content(&self, content: &str) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .flexible(true) // short rows are padded below, long rows rejected
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::MalformedSource(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        if headers.is_empty() {
            return Err(AppError::MalformedSource(
                "No columns to parse from file".to_string(),
            ));
        }

        let width = headers.len();
        let mut tokens: Vec<Vec<String>> = vec![Vec::new(); width];

        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::MalformedSource(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            if record.len() > width {
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(index as u64 + 2);
                return Err(AppError::MalformedSource(format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                )));
            }

            for (idx, column) in tokens.iter_mut().enumerate() {
                column.push(record.get(idx).unwrap_or("").to_string());
            }
        }

        let columns = normalize_headers(headers.iter())
            .into_iter()
            .zip(tokens)
            .map(|(name, raw)| {
                let (dtype, values) = self.inference.infer_tokens(raw);
                Column::new(name, dtype, values)
            })
            .collect();

        Table::new(columns)
    }
}

/// Decode as UTF-8, or as the encoding named by a byte-order mark.
/// Malformed sequences are an error rather than being replaced.
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    let (encoding, body): (&'static Encoding, &[u8]) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (UTF_8, bytes),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            AppError::MalformedSource(format!(
                "'{}' codec can't decode the file content",
                encoding.name().to_lowercase()
            ))
        })
}
