use std::io::Cursor;

use calamine::{Data, DataType, Reader, Xlsx};
use chrono::NaiveDateTime;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{normalize_headers, Column, Table, TypeInference, Value};

/// Reads the first worksheet of an xlsx workbook, first row as header
#[derive(Default)]
pub struct XlsxReader {
    inference: TypeInference,
}

impl XlsxReader {
    pub fn new(inference: TypeInference) -> Self {
        Self { inference }
    }

    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| AppError::MalformedSource(format!("Failed to open Excel file: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::MalformedSource("No worksheet found".to_string()))?
            .map_err(|e| {
                AppError::MalformedSource(format!("Failed to read Excel range: {}", e))
            })?;

        let mut rows = range.rows();
        let header = match rows.next() {
            Some(header) => header,
            None => return Ok(Table::empty()),
        };

        let names = normalize_headers(header.iter().map(header_text));
        let mut cells: Vec<Vec<Value>> = vec![Vec::new(); names.len()];

        for row in rows {
            for (idx, column) in cells.iter_mut().enumerate() {
                let value = row
                    .get(idx)
                    .map(|cell| self.cell_value(cell))
                    .unwrap_or(Value::Null);
                column.push(value);
            }
        }

        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, values)| {
                let (dtype, values) = self.inference.unify_values(values, true);
                Column::new(name, dtype, values)
            })
            .collect();

        Table::new(columns)
    }

    fn cell_value(&self, cell: &Data) -> Value {
        match cell {
            Data::Empty => Value::Null,
            Data::Int(i) => Value::Int(*i),
            Data::Float(f) => Value::Float(*f),
            Data::Bool(b) => Value::Bool(*b),
            Data::String(s) if self.inference.is_na(s) => Value::Null,
            Data::String(s) => Value::Text(s.clone()),
            Data::Error(_) => Value::Null,
            other => match other.as_datetime() {
                Some(dt) => Value::Text(datetime_text(&dt)),
                None => Value::Text(other.to_string()),
            },
        }
    }
}

fn datetime_text(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{}", *f as i64),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
