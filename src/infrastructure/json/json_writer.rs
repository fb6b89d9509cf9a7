use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::domain::error::{AppError, Result};
use crate::domain::table::{Table, Value};

/// Writes a Table as an array of row objects keyed by column name
#[derive(Default)]
pub struct JsonWriter;

impl JsonWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write(&self, table: &Table) -> Result<Vec<u8>> {
        serde_json::to_vec(&Records(table))
            .map_err(|e| AppError::ExportError(format!("Failed to write JSON: {}", e)))
    }
}

struct Records<'a>(&'a Table);

struct Row<'a> {
    table: &'a Table,
    index: usize,
}

struct Cell<'a>(&'a Value);

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let table = self.0;
        let mut seq = serializer.serialize_seq(Some(table.row_count()))?;
        for index in 0..table.row_count() {
            seq.serialize_element(&Row { table, index })?;
        }
        seq.end()
    }
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let columns = self.table.columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for column in columns {
            map.serialize_entry(&column.name, &Cell(&column.values[self.index]))?;
        }
        map.end()
    }
}

impl Serialize for Cell<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::{Column, ColumnType};
    use crate::infrastructure::json::JsonResolver;

    #[test]
    fn test_records_orientation() {
        let table = Table::new(vec![
            Column::new("id", ColumnType::Integer, vec![Value::Int(1), Value::Int(2)]),
            Column::new(
                "score",
                ColumnType::Float,
                vec![Value::Float(2.0), Value::Float(f64::INFINITY)],
            ),
            Column::new(
                "name",
                ColumnType::String,
                vec![Value::Text("a".into()), Value::Null],
            ),
        ])
        .unwrap();

        let bytes = JsonWriter::new().write(&table).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"[{"id":1,"score":2.0,"name":"a"},{"id":2,"score":null,"name":null}]"#
        );
    }

    #[test]
    fn test_empty_table_is_empty_array() {
        let bytes = JsonWriter::new().write(&Table::empty()).unwrap();
        assert_eq!(bytes, b"[]");
    }

    #[test]
    fn test_round_trip_through_resolver() {
        let source = r#"[{"k":"x","n":1.5,"b":true},{"k":"y","n":null,"b":false}]"#;
        let table = JsonResolver::default()
            .resolve(source.as_bytes())
            .unwrap()
            .table;
        let bytes = JsonWriter::new().write(&table).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), source);
    }
}
