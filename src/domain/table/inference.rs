// ============================================================
// COLUMN TYPE INFERENCE
// ============================================================
// Deterministic pass over raw tokens (text sources) or already typed
// cells (spreadsheet / JSON sources) that settles one type per column

use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::{ColumnType, Value};

/// Spellings treated as a missing cell in text sources
pub const DEFAULT_NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

static DEFAULT_NA_SET: Lazy<HashSet<String>> =
    Lazy::new(|| DEFAULT_NA_TOKENS.iter().map(|s| s.to_string()).collect());

#[derive(Debug, Clone)]
pub struct TypeInference {
    na_tokens: HashSet<String>,
}

impl Default for TypeInference {
    fn default() -> Self {
        Self {
            na_tokens: DEFAULT_NA_SET.clone(),
        }
    }
}

impl TypeInference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the missing-value token set. The empty string is always missing.
    pub fn with_na_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_tokens = tokens.into_iter().map(Into::into).collect();
        self.na_tokens.insert(String::new());
        self
    }

    pub fn is_na(&self, token: &str) -> bool {
        self.na_tokens.contains(token)
    }

    /// Infer a column from raw text tokens.
    ///
    /// Integer wins if every present token parses as `i64`, then Float, then
    /// Boolean; anything else keeps the raw tokens as String.
    pub fn infer_tokens(&self, tokens: Vec<String>) -> (ColumnType, Vec<Value>) {
        let present: Vec<Option<String>> = tokens
            .into_iter()
            .map(|t| if self.is_na(&t) { None } else { Some(t) })
            .collect();

        let non_missing = || present.iter().flatten().map(|t| t.trim());

        if non_missing().next().is_none() {
            return (ColumnType::Null, vec![Value::Null; present.len()]);
        }

        if non_missing().all(|t| t.parse::<i64>().is_ok()) {
            let values = present
                .into_iter()
                .map(|t| match t.and_then(|t| t.trim().parse::<i64>().ok()) {
                    Some(i) => Value::Int(i),
                    None => Value::Null,
                })
                .collect();
            return (ColumnType::Integer, values);
        }

        if non_missing().all(|t| t.parse::<f64>().is_ok()) {
            let values = present
                .into_iter()
                .map(|t| match t.and_then(|t| t.trim().parse::<f64>().ok()) {
                    Some(f) => Value::Float(f),
                    None => Value::Null,
                })
                .collect();
            return (ColumnType::Float, values);
        }

        if non_missing().all(|t| parse_bool(t).is_some()) {
            let values = present
                .into_iter()
                .map(|t| match t.and_then(|t| parse_bool(t.trim())) {
                    Some(b) => Value::Bool(b),
                    None => Value::Null,
                })
                .collect();
            return (ColumnType::Boolean, values);
        }

        let values = present
            .into_iter()
            .map(|t| t.map(Value::Text).unwrap_or(Value::Null))
            .collect();
        (ColumnType::String, values)
    }

    /// Settle a single type over cells that already carry one.
    ///
    /// Integer and Float mix to Float. When `collapse_whole_floats` is set a
    /// Float column holding only whole numbers becomes Integer (spreadsheets
    /// store every number as a float). Any other mix becomes String.
    pub fn unify_values(
        &self,
        values: Vec<Value>,
        collapse_whole_floats: bool,
    ) -> (ColumnType, Vec<Value>) {
        let kinds: HashSet<ColumnType> = values.iter().filter_map(kind_of).collect();

        let dtype = match kinds.len() {
            0 => ColumnType::Null,
            1 => *kinds.iter().next().unwrap_or(&ColumnType::String),
            2 if kinds.contains(&ColumnType::Integer) && kinds.contains(&ColumnType::Float) => {
                ColumnType::Float
            }
            _ => ColumnType::String,
        };

        match dtype {
            ColumnType::Float => {
                let floats: Vec<Value> = values
                    .into_iter()
                    .map(|v| match v {
                        Value::Int(i) => Value::Float(i as f64),
                        other => other,
                    })
                    .collect();
                if collapse_whole_floats && floats.iter().all(is_whole_or_null) {
                    let ints = floats
                        .into_iter()
                        .map(|v| match v {
                            Value::Float(f) => Value::Int(f as i64),
                            other => other,
                        })
                        .collect();
                    (ColumnType::Integer, ints)
                } else {
                    (ColumnType::Float, floats)
                }
            }
            ColumnType::String => {
                let texts = values
                    .into_iter()
                    .map(|v| match v {
                        Value::Null => Value::Null,
                        Value::Text(s) => Value::Text(s),
                        other => Value::Text(other.to_text()),
                    })
                    .collect();
                (ColumnType::String, texts)
            }
            other => (other, values),
        }
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn kind_of(value: &Value) -> Option<ColumnType> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(ColumnType::Boolean),
        Value::Int(_) => Some(ColumnType::Integer),
        Value::Float(_) => Some(ColumnType::Float),
        Value::Text(_) => Some(ColumnType::String),
    }
}

fn is_whole_or_null(value: &Value) -> bool {
    match value {
        Value::Float(f) => f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15,
        _ => true,
    }
}
