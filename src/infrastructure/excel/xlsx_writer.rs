use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::warn;

use crate::domain::error::{AppError, Result};
use crate::domain::table::{format_float, Table, Value};

/// Excel caps a cell at 32,767 characters
const MAX_CELL_CHARS: usize = 32_767;
/// Rows per worksheet below the header row
const MAX_DATA_ROWS: usize = 1_048_575;
const MAX_COLUMNS: usize = 16_384;
const MAX_SHEET_NAME_CHARS: usize = 31;

/// Writes a Table to an xlsx workbook. Tables larger than one worksheet
/// continue on `<sheet>_2`, `<sheet>_3`, ... with the header repeated.
pub struct XlsxWriter {
    sheet_name: String,
    max_rows: usize,
    max_columns: usize,
}

impl XlsxWriter {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            max_rows: MAX_DATA_ROWS,
            max_columns: MAX_COLUMNS,
        }
    }

    #[cfg(test)]
    fn with_limits(mut self, max_rows: usize, max_columns: usize) -> Self {
        self.max_rows = max_rows;
        self.max_columns = max_columns;
        self
    }

    /// Header in row 0, no row-index column, missing cells left blank
    pub fn write(&self, table: &Table) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let names = table.column_names();
        let rows: Vec<Vec<&Value>> = table.rows().collect();

        let column_chunks = chunk_bounds(names.len(), self.max_columns);
        let row_chunks = chunk_bounds(rows.len(), self.max_rows);
        if column_chunks.len() * row_chunks.len() > 1 {
            warn!(
                rows = rows.len(),
                columns = names.len(),
                sheets = column_chunks.len() * row_chunks.len(),
                "Table exceeds one worksheet, continuing on extra sheets"
            );
        }

        let mut sheet_no = 0;
        for (col_start, col_end) in &column_chunks {
            for (row_start, row_end) in &row_chunks {
                sheet_no += 1;
                let worksheet = workbook.add_worksheet();
                worksheet
                    .set_name(sheet_title(&self.sheet_name, sheet_no))
                    .map_err(export_error)?;

                for (col, name) in names[*col_start..*col_end].iter().enumerate() {
                    write_text(worksheet, 0, col_index(col)?, name)?;
                }

                for (offset, row) in rows[*row_start..*row_end].iter().enumerate() {
                    let row_num = row_index(offset + 1)?;
                    for (col, value) in row[*col_start..*col_end].iter().enumerate() {
                        write_cell(worksheet, row_num, col_index(col)?, value)?;
                    }
                }
            }
        }

        workbook.save_to_buffer().map_err(export_error)
    }
}

/// `[start, end)` ranges covering `len` items; always at least one range
fn chunk_bounds(len: usize, size: usize) -> Vec<(usize, usize)> {
    if len == 0 {
        return vec![(0, 0)];
    }
    let size = size.max(1);
    (0..len)
        .step_by(size)
        .map(|start| (start, (start + size).min(len)))
        .collect()
}

fn sheet_title(base: &str, sheet_no: usize) -> String {
    if sheet_no == 1 {
        return base.to_string();
    }
    let suffix = format!("_{}", sheet_no);
    let keep = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
    let mut title: String = base.chars().take(keep).collect();
    title.push_str(&suffix);
    title
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<()> {
    match value {
        Value::Null => return Ok(()),
        Value::Bool(b) => worksheet.write_boolean(row, col, *b),
        Value::Int(i) => worksheet.write_number(row, col, *i as f64),
        Value::Float(f) if f.is_nan() => return Ok(()),
        Value::Float(f) if f.is_finite() => worksheet.write_number(row, col, *f),
        // Excel has no infinity; keep it readable as text
        Value::Float(f) => worksheet.write_string(row, col, format_float(*f)),
        Value::Text(s) => return write_text(worksheet, row, col, s),
    }
    .map_err(export_error)?;
    Ok(())
}

fn write_text(worksheet: &mut Worksheet, row: u32, col: u16, text: &str) -> Result<()> {
    if text.chars().count() > MAX_CELL_CHARS {
        warn!(
            row,
            col,
            chars = text.chars().count(),
            "Cell text truncated to the Excel limit"
        );
        let cut: String = text.chars().take(MAX_CELL_CHARS).collect();
        worksheet.write_string(row, col, cut).map_err(export_error)?;
    } else {
        worksheet.write_string(row, col, text).map_err(export_error)?;
    }
    Ok(())
}

fn row_index(idx: usize) -> Result<u32> {
    u32::try_from(idx)
        .map_err(|_| AppError::ExportError(format!("Row {} exceeds the worksheet limit", idx)))
}

fn col_index(idx: usize) -> Result<u16> {
    u16::try_from(idx)
        .map_err(|_| AppError::ExportError(format!("Column {} exceeds the worksheet limit", idx)))
}

fn export_error(err: XlsxError) -> AppError {
    AppError::ExportError(format!("Failed to write Excel workbook: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::{Column, ColumnType};
    use crate::infrastructure::excel::XlsxReader;
    use calamine::{Reader, Xlsx};
    use std::io::Cursor;

    fn int_column(name: &str, values: &[i64]) -> Column {
        Column::new(
            name,
            ColumnType::Integer,
            values.iter().map(|v| Value::Int(*v)).collect(),
        )
    }

    #[test]
    fn test_writes_zip_container() {
        let table = Table::new(vec![int_column("a", &[1])]).unwrap();
        let bytes = XlsxWriter::new("Sheet1").write(&table).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_round_trip_keeps_names_and_cells() {
        let table = Table::new(vec![
            Column::new(
                "city",
                ColumnType::String,
                vec![Value::Text("Oslo".into()), Value::Null],
            ),
            Column::new(
                "temp",
                ColumnType::Float,
                vec![Value::Float(-3.5), Value::Float(12.25)],
            ),
        ])
        .unwrap();

        let bytes = XlsxWriter::new("Data").write(&table).unwrap();
        let reparsed = XlsxReader::default().parse_bytes(&bytes).unwrap();
        assert_eq!(reparsed, table);
    }

    #[test]
    fn test_long_text_is_truncated_not_rejected() {
        let long = "x".repeat(40_000);
        let table = Table::new(vec![Column::new(
            "note",
            ColumnType::String,
            vec![Value::Text(long)],
        )])
        .unwrap();

        let bytes = XlsxWriter::new("Sheet1").write(&table).unwrap();
        let reparsed = XlsxReader::default().parse_bytes(&bytes).unwrap();
        assert_eq!(
            reparsed.column("note").unwrap().values,
            vec![Value::Text("x".repeat(MAX_CELL_CHARS))]
        );
    }

    #[test]
    fn test_oversized_table_spills_onto_extra_sheets() {
        let table = Table::new(vec![
            int_column("a", &[1, 2, 3]),
            int_column("b", &[4, 5, 6]),
        ])
        .unwrap();

        let bytes = XlsxWriter::new("Data")
            .with_limits(2, 1)
            .write(&table)
            .unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec!["Data", "Data_2", "Data_3", "Data_4"]
        );

        // columns split first, then rows: Data_2 holds the last row of `a`
        let range = workbook.worksheet_range_at(1).unwrap().unwrap();
        assert_eq!(range.get_size(), (2, 1));
        let cells: Vec<String> = range.rows().map(|r| r[0].to_string()).collect();
        assert_eq!(cells, vec!["a", "3"]);
    }

    #[test]
    fn test_sheet_titles_stay_within_limit() {
        let base = "A".repeat(31);
        let title = sheet_title(&base, 12);
        assert_eq!(title.chars().count(), 31);
        assert!(title.ends_with("_12"));
        assert_eq!(sheet_title("Data", 1), "Data");
    }

    #[test]
    fn test_rejects_invalid_sheet_name() {
        let table = Table::empty();
        let err = XlsxWriter::new("bad/name").write(&table).unwrap_err();
        assert_eq!(err.kind(), "export_error");
    }
}
