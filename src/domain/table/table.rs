// ============================================================
// TABLE
// ============================================================
// Ordered named columns sharing one row count

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{ColumnType, Value, ValueKey};
use crate::domain::error::{AppError, Result};

/// A named column of one inferred type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Replace each missing cell with the nearest preceding present cell.
    /// A leading run of missing cells stays missing. Returns cells filled.
    pub fn forward_fill(&mut self) -> usize {
        let mut last: Option<Value> = None;
        let mut filled = 0;

        for value in self.values.iter_mut() {
            if value.is_null() {
                if let Some(prev) = &last {
                    *value = prev.clone();
                    filled += 1;
                }
            } else {
                last = Some(value.clone());
            }
        }

        filled
    }
}

/// In-memory tabular structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Build a table, checking that names are unique and lengths agree
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        Self::with_row_count(columns, row_count)
    }

    /// Build a table whose row count is known up front, which matters when
    /// there are rows but no columns (e.g. a JSON list of empty objects)
    pub fn with_row_count(columns: Vec<Column>, row_count: usize) -> Result<Self> {
        let mut names = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !names.insert(column.name.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Duplicate column name: {}",
                    column.name
                )));
            }
            if column.len() != row_count {
                return Err(AppError::ValidationError(format!(
                    "Column {} has {} rows, expected {}",
                    column.name,
                    column.len(),
                    row_count
                )));
            }
        }

        Ok(Self { columns, row_count })
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            row_count: 0,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count).map(move |idx| self.columns.iter().map(|c| &c.values[idx]).collect())
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Table {
        let take = n.min(self.row_count);
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.dtype, c.values[..take].to_vec()))
            .collect();
        Table {
            columns,
            row_count: take,
        }
    }

    /// Remove rows equal (across all columns) to an earlier row, keeping the
    /// first occurrence in order. Returns the number of rows removed.
    pub fn drop_duplicate_rows(&mut self) -> usize {
        let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(self.row_count);
        let keep: Vec<bool> = (0..self.row_count)
            .map(|idx| {
                let key: Vec<ValueKey> = self.columns.iter().map(|c| c.values[idx].key()).collect();
                seen.insert(key)
            })
            .collect();

        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return 0;
        }

        for column in self.columns.iter_mut() {
            let mut flags = keep.iter();
            column.values.retain(|_| *flags.next().unwrap_or(&true));
        }
        self.row_count -= removed;
        removed
    }

    /// Forward-fill every column. Returns the total number of cells filled.
    pub fn forward_fill(&mut self) -> usize {
        self.columns.iter_mut().map(Column::forward_fill).sum()
    }

    /// Keep only the named columns, in the order given. Names that are not
    /// present are skipped and returned; a repeated name is kept once.
    pub fn select_columns(&mut self, names: &[String]) -> Vec<String> {
        let mut remaining: Vec<Option<Column>> = self.columns.drain(..).map(Some).collect();
        let mut selected = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();

        for name in names {
            let slot = remaining
                .iter_mut()
                .find(|slot| slot.as_ref().map(|c| &c.name == name).unwrap_or(false));
            match slot.and_then(Option::take) {
                Some(column) => selected.push(column),
                None => {
                    if !selected.iter().any(|c: &Column| &c.name == name) {
                        unknown.push(name.clone());
                    }
                }
            }
        }

        self.columns = selected;
        unknown
    }
}
