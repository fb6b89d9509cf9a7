// ============================================================
// JSON TABLE BUILDER
// ============================================================
// Turn decoded JSON shapes (record lists, column objects, single objects)
// into a Table

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::domain::error::{AppError, Result};
use crate::domain::table::{normalize_headers, Column, Table, TypeInference, Value};

pub struct JsonTableBuilder {
    inference: TypeInference,
    /// Levels of nested objects flattened into dotted names
    normalize_depth: usize,
}

impl Default for JsonTableBuilder {
    fn default() -> Self {
        Self::new(TypeInference::default(), 1)
    }
}

impl JsonTableBuilder {
    pub fn new(inference: TypeInference, normalize_depth: usize) -> Self {
        Self {
            inference,
            normalize_depth,
        }
    }

    /// One row per element. Objects contribute their keys, arrays their
    /// positions (`0`, `1`, ...), scalars a single column `0`.
    /// Columns are the union of keys in first-seen order.
    pub fn from_records(&self, records: Vec<JsonValue>) -> Result<Table> {
        let rows: Vec<Vec<(String, JsonValue)>> = records.into_iter().map(row_entries).collect();
        self.build(rows)
    }

    /// True for `{}`, for objects whose values are all arrays of one length
    /// (`{"a": [1, 2]}`), and for objects whose values are all objects keyed
    /// by row index (`{"a": {"0": 1, "1": 2}}`)
    pub fn is_column_oriented(object: &Map<String, JsonValue>) -> bool {
        column_layout(object).is_some()
    }

    /// One column per key; rows come from the array positions or the
    /// row-index keys (first-seen order, gaps are missing)
    pub fn from_columns(&self, object: Map<String, JsonValue>) -> Result<Table> {
        let layout = column_layout(&object).ok_or_else(|| {
            AppError::UnsupportedJsonShape("object is not column-oriented".to_string())
        })?;

        match layout {
            ColumnLayout::Arrays(row_count) => {
                let (keys, cells): (Vec<String>, Vec<Vec<Value>>) = object
                    .into_iter()
                    .map(|(key, value)| {
                        let values: Vec<Value> = match value {
                            JsonValue::Array(items) => items.into_iter().map(cell_value).collect(),
                            _ => Vec::new(),
                        };
                        (key, values)
                    })
                    .unzip();
                self.finish(keys, cells, row_count)
            }
            ColumnLayout::Indexed => {
                let mut index: HashMap<String, usize> = HashMap::new();
                for value in object.values() {
                    if let JsonValue::Object(inner) = value {
                        for label in inner.keys() {
                            let next = index.len();
                            index.entry(label.clone()).or_insert(next);
                        }
                    }
                }

                let row_count = index.len();
                let (keys, cells): (Vec<String>, Vec<Vec<Value>>) = object
                    .into_iter()
                    .map(|(key, value)| {
                        let mut values = vec![Value::Null; row_count];
                        if let JsonValue::Object(inner) = value {
                            for (label, cell) in inner {
                                if let Some(row) = index.get(&label) {
                                    values[*row] = cell_value(cell);
                                }
                            }
                        }
                        (key, values)
                    })
                    .unzip();
                self.finish(keys, cells, row_count)
            }
        }
    }

    /// Objects holding nested objects or arrays are flattened into one row;
    /// a flat object is a single row as-is.
    pub fn from_object(&self, object: Map<String, JsonValue>) -> Result<Table> {
        let nested = object
            .values()
            .any(|v| v.is_object() || v.is_array());

        let row = if nested {
            let mut flat = Vec::with_capacity(object.len());
            flatten_into(&mut flat, None, object, self.normalize_depth);
            flat
        } else {
            object.into_iter().collect()
        };

        self.build(vec![row])
    }

    fn build(&self, rows: Vec<Vec<(String, JsonValue)>>) -> Result<Table> {
        let row_count = rows.len();
        let mut keys: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut cells: Vec<Vec<Value>> = Vec::new();

        for (row_idx, row) in rows.into_iter().enumerate() {
            for (key, json) in row {
                let col = match positions.get(&key) {
                    Some(col) => *col,
                    None => {
                        positions.insert(key.clone(), keys.len());
                        keys.push(key);
                        cells.push(vec![Value::Null; row_idx]);
                        keys.len() - 1
                    }
                };
                let column = &mut cells[col];
                // a repeated key within one row keeps the last value
                if column.len() > row_idx {
                    column[row_idx] = cell_value(json);
                } else {
                    column.push(cell_value(json));
                }
            }
            for column in cells.iter_mut() {
                if column.len() <= row_idx {
                    column.push(Value::Null);
                }
            }
        }

        self.finish(keys, cells, row_count)
    }

    fn finish(
        &self,
        keys: Vec<String>,
        cells: Vec<Vec<Value>>,
        row_count: usize,
    ) -> Result<Table> {
        let columns = normalize_headers(&keys)
            .into_iter()
            .zip(cells)
            .map(|(name, values)| {
                let (dtype, values) = self.inference.unify_values(values, false);
                Column::new(name, dtype, values)
            })
            .collect();

        Table::with_row_count(columns, row_count)
    }
}

enum ColumnLayout {
    /// Every value is an array of this length
    Arrays(usize),
    /// Every value is an object keyed by row index
    Indexed,
}

fn column_layout(object: &Map<String, JsonValue>) -> Option<ColumnLayout> {
    match object.values().next() {
        None => Some(ColumnLayout::Arrays(0)),
        Some(JsonValue::Array(first)) => {
            let len = first.len();
            object
                .values()
                .all(|v| matches!(v, JsonValue::Array(items) if items.len() == len))
                .then_some(ColumnLayout::Arrays(len))
        }
        Some(JsonValue::Object(_)) => object
            .values()
            .all(|v| match v {
                JsonValue::Object(inner) => inner.keys().all(|k| is_index_label(k)),
                _ => false,
            })
            .then_some(ColumnLayout::Indexed),
        Some(_) => None,
    }
}

fn is_index_label(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

fn row_entries(record: JsonValue) -> Vec<(String, JsonValue)> {
    match record {
        JsonValue::Object(map) => map.into_iter().collect(),
        JsonValue::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, v)| (idx.to_string(), v))
            .collect(),
        scalar => vec![("0".to_string(), scalar)],
    }
}

fn flatten_into(
    out: &mut Vec<(String, JsonValue)>,
    prefix: Option<&str>,
    object: Map<String, JsonValue>,
    depth: usize,
) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key,
        };
        match value {
            JsonValue::Object(inner) if depth > 0 => {
                flatten_into(out, Some(&name), inner, depth - 1);
            }
            other => out.push((name, other)),
        }
    }
}

/// Scalars map directly; nested arrays and objects are kept as compact JSON text
fn cell_value(json: JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        JsonValue::String(s) => Value::Text(s),
        nested => Value::Text(nested.to_string()),
    }
}
