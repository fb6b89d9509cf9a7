// ============================================================
// JSON RESOLVER
// ============================================================
// Ordered parsing strategies for irregular JSON uploads. Each strategy
// reports a tagged outcome; the resolver stops at the first success.

use serde_json::{Deserializer, Value as JsonValue};
use tracing::{debug, warn};

use super::JsonTableBuilder;
use crate::domain::conversion::{IngestAdvisory, IngestedTable};
use crate::domain::error::{AppError, Result};

/// Outcome of one strategy
pub enum Attempt {
    Parsed(IngestedTable),
    /// Let the next applicable strategy try
    Declined(Decline),
    /// Stop the chain with this error
    Fatal(AppError),
}

pub enum Decline {
    /// A complete JSON value was followed by more content
    TrailingData,
    Rejected(String),
}

/// What earlier strategies reported
#[derive(Debug, Default)]
pub struct AttemptLog {
    pub trailing_data: bool,
    pub failures: Vec<String>,
}

pub trait JsonStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this strategy should run given what happened so far
    fn applies(&self, log: &AttemptLog) -> bool;

    fn attempt(&self, bytes: &[u8], builder: &JsonTableBuilder) -> Attempt;
}

/// Whole content as a table document: an array of row objects, a
/// column-oriented object, or a single record
pub struct RecordsStrategy;

impl JsonStrategy for RecordsStrategy {
    fn name(&self) -> &'static str {
        "records"
    }

    fn applies(&self, _log: &AttemptLog) -> bool {
        true
    }

    fn attempt(&self, bytes: &[u8], builder: &JsonTableBuilder) -> Attempt {
        let mut stream = Deserializer::from_slice(bytes).into_iter::<JsonValue>();

        let value = match stream.next() {
            Some(Ok(value)) => value,
            Some(Err(e)) => return Attempt::Declined(Decline::Rejected(e.to_string())),
            None => {
                return Attempt::Declined(Decline::Rejected(
                    "Expected a JSON value, found end of input".to_string(),
                ))
            }
        };

        // trailing data wins over the shape of the first value
        let rest = &bytes[stream.byte_offset()..];
        if !rest.iter().all(u8::is_ascii_whitespace) {
            return Attempt::Declined(Decline::TrailingData);
        }

        let table = match value {
            JsonValue::Array(items) if items.iter().all(JsonValue::is_object) => {
                builder.from_records(items)
            }
            JsonValue::Object(object) if JsonTableBuilder::is_column_oriented(&object) => {
                builder.from_columns(object)
            }
            JsonValue::Object(object) => builder.from_object(object),
            other => {
                return Attempt::Declined(Decline::Rejected(format!(
                    "top-level {} is not a table document",
                    json_type_name(&other)
                )))
            }
        };

        match table {
            Ok(table) => Attempt::Parsed(IngestedTable::new(table)),
            Err(e) => Attempt::Fatal(e),
        }
    }
}

/// One JSON value per non-blank line, each line a row
pub struct LineDelimitedStrategy;

impl JsonStrategy for LineDelimitedStrategy {
    fn name(&self) -> &'static str {
        "line_delimited"
    }

    fn applies(&self, log: &AttemptLog) -> bool {
        log.trailing_data
    }

    fn attempt(&self, bytes: &[u8], builder: &JsonTableBuilder) -> Attempt {
        let content = match std::str::from_utf8(bytes) {
            Ok(content) => content,
            Err(e) => {
                return Attempt::Fatal(AppError::MalformedSource(format!(
                    "Error reading JSON lines: {}",
                    e
                )))
            }
        };

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<JsonValue>(line) {
                Ok(value) => records.push(value),
                Err(e) => {
                    return Attempt::Fatal(AppError::MalformedSource(format!(
                        "Error reading JSON lines: line {}: {}",
                        idx + 1,
                        e
                    )))
                }
            }
        }

        warn!(
            rows = records.len(),
            "JSON file has trailing data, read as newline-delimited JSON"
        );

        match builder.from_records(records) {
            Ok(table) => Attempt::Parsed(
                IngestedTable::new(table).with_advisory(IngestAdvisory::LineDelimitedFallback),
            ),
            Err(e) => Attempt::Fatal(e),
        }
    }
}

/// Generic decode, then branch on the top-level shape
pub struct GenericValueStrategy;

impl JsonStrategy for GenericValueStrategy {
    fn name(&self) -> &'static str {
        "generic_value"
    }

    fn applies(&self, log: &AttemptLog) -> bool {
        !log.trailing_data
    }

    fn attempt(&self, bytes: &[u8], builder: &JsonTableBuilder) -> Attempt {
        let value: JsonValue = match serde_json::from_slice(bytes) {
            Ok(value) => value,
            Err(e) => return Attempt::Declined(Decline::Rejected(e.to_string())),
        };

        let table = match value {
            JsonValue::Array(items) => builder.from_records(items),
            JsonValue::Object(object) => builder.from_object(object),
            other => {
                return Attempt::Fatal(AppError::UnsupportedJsonShape(format!(
                    "top-level {} (expected a list or an object)",
                    json_type_name(&other)
                )))
            }
        };

        match table {
            Ok(table) => Attempt::Parsed(IngestedTable::new(table)),
            Err(e) => Attempt::Fatal(e),
        }
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

pub struct JsonResolver {
    builder: JsonTableBuilder,
    strategies: Vec<Box<dyn JsonStrategy>>,
}

impl Default for JsonResolver {
    fn default() -> Self {
        Self::new(JsonTableBuilder::default())
    }
}

impl JsonResolver {
    pub fn new(builder: JsonTableBuilder) -> Self {
        Self {
            builder,
            strategies: vec![
                Box::new(RecordsStrategy),
                Box::new(LineDelimitedStrategy),
                Box::new(GenericValueStrategy),
            ],
        }
    }

    pub fn resolve(&self, bytes: &[u8]) -> Result<IngestedTable> {
        let mut log = AttemptLog::default();

        for strategy in &self.strategies {
            if !strategy.applies(&log) {
                continue;
            }

            debug!(strategy = strategy.name(), "Trying JSON strategy");
            match strategy.attempt(bytes, &self.builder) {
                Attempt::Parsed(ingested) => return Ok(ingested),
                Attempt::Fatal(err) => return Err(err),
                Attempt::Declined(Decline::TrailingData) => {
                    debug!(strategy = strategy.name(), "Trailing data after first JSON value");
                    log.trailing_data = true;
                }
                Attempt::Declined(Decline::Rejected(reason)) => {
                    debug!(strategy = strategy.name(), reason = %reason, "JSON strategy declined");
                    log.failures.push(reason);
                }
            }
        }

        Err(AppError::MalformedSource(combined_message(&log.failures)))
    }
}

fn combined_message(failures: &[String]) -> String {
    let mut parts = failures.iter();
    let mut message = match parts.next() {
        Some(first) => format!("Failed to parse JSON: {}", first),
        None => "Failed to parse JSON".to_string(),
    };
    for additional in parts {
        message.push_str(&format!("\nAdditional error: {}", additional));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Value;

    fn resolve(content: &str) -> Result<IngestedTable> {
        JsonResolver::default().resolve(content.as_bytes())
    }

    #[test]
    fn test_array_of_objects() {
        let ingested = resolve(r#"[{"a": 1, "b": "x"}, {"a": 2}]"#).unwrap();
        assert!(ingested.advisories.is_empty());
        assert_eq!(ingested.table.row_count(), 2);
        assert_eq!(ingested.table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_single_flat_object_is_one_row() {
        let ingested = resolve(r#"{"id": 1, "name": "solo"}"#).unwrap();
        assert_eq!(ingested.table.row_count(), 1);
    }

    #[test]
    fn test_column_oriented_object_is_multi_row() {
        let ingested = resolve(r#"{"a": [1, 2], "b": [3, 4]}"#).unwrap();
        assert!(ingested.advisories.is_empty());
        assert_eq!(ingested.table.row_count(), 2);
        assert_eq!(
            ingested.table.column("b").unwrap().values,
            vec![Value::Int(3), Value::Int(4)]
        );
    }

    #[test]
    fn test_index_keyed_object_is_multi_row() {
        let ingested =
            resolve(r#"{"a": {"0": 1, "1": 2}, "b": {"0": "x", "1": "y"}}"#).unwrap();
        assert_eq!(ingested.table.column_names(), vec!["a", "b"]);
        assert_eq!(ingested.table.row_count(), 2);
        assert_eq!(
            ingested.table.column("a").unwrap().values,
            vec![Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn test_empty_object_has_no_rows() {
        let ingested = resolve("{}").unwrap();
        assert_eq!(ingested.table.row_count(), 0);
        assert_eq!(ingested.table.column_count(), 0);
    }

    #[test]
    fn test_newline_delimited_arrays_use_positions() {
        let ingested = resolve("[1, 2]\n[3, 4]\n").unwrap();
        assert_eq!(
            ingested.advisories,
            vec![IngestAdvisory::LineDelimitedFallback]
        );
        assert_eq!(ingested.table.column_names(), vec!["0", "1"]);
        assert_eq!(
            ingested.table.column("1").unwrap().values,
            vec![Value::Int(2), Value::Int(4)]
        );
    }

    #[test]
    fn test_newline_delimited_fallback_emits_advisory() {
        let ingested = resolve("{\"a\": 1}\n{\"a\": 2}\n\n{\"a\": 3, \"b\": true}\n").unwrap();
        assert_eq!(
            ingested.advisories,
            vec![IngestAdvisory::LineDelimitedFallback]
        );
        assert_eq!(ingested.table.row_count(), 3);
        assert_eq!(
            ingested.table.column("a").unwrap().values,
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn test_broken_line_after_trailing_data_is_malformed() {
        let err = resolve("{\"a\": 1}\n{\"a\": \n").unwrap_err();
        assert_eq!(err.kind(), "malformed_source");
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_scalar_list_goes_through_generic_decode() {
        let ingested = resolve("[1, 2, 3]").unwrap();
        assert_eq!(ingested.table.column_names(), vec!["0"]);
        assert_eq!(ingested.table.row_count(), 3);
    }

    #[test]
    fn test_bare_scalar_is_unsupported_shape() {
        let err = resolve("42").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedJsonShape(_)));
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn test_syntax_error_reports_both_attempts() {
        let err = resolve("{\"a\": ").unwrap_err();
        assert_eq!(err.kind(), "malformed_source");
        let message = err.to_string();
        assert!(message.contains("Failed to parse JSON"));
        assert!(message.contains("Additional error"));
    }

    #[test]
    fn test_empty_content_is_malformed() {
        let err = resolve("   ").unwrap_err();
        assert!(matches!(err, AppError::MalformedSource(_)));
    }
}
