// ============================================================
// TRANSFORM PIPELINE USE CASE
// ============================================================
// Apply the chosen cleaning operations in a fixed order:
// duplicates -> forward fill -> column projection. Charting only reads.

use tracing::{info, warn};

use crate::domain::conversion::{ChartData, ChartSeries, TransformFlags, TransformReport};
use crate::domain::table::Table;
use crate::infrastructure::config::ChartSettings;

pub struct TransformPipeline {
    chart: ChartSettings,
}

impl TransformPipeline {
    pub fn new(chart: ChartSettings) -> Self {
        Self { chart }
    }

    pub fn default_config() -> Self {
        Self::new(ChartSettings::default())
    }

    /// Mutates the table in place and reports what changed
    pub fn apply(&self, table: &mut Table, flags: &TransformFlags) -> TransformReport {
        let mut report = TransformReport::default();

        if flags.remove_duplicates {
            report.duplicates_removed = table.drop_duplicate_rows();
            info!(removed = report.duplicates_removed, "Duplicates removed");
        }

        if flags.fill_missing {
            report.cells_filled = table.forward_fill();
            info!(filled = report.cells_filled, "Missing values filled");
        }

        if let Some(retain) = &flags.retain_columns {
            report.unknown_columns = table.select_columns(retain);
            if !report.unknown_columns.is_empty() {
                warn!(
                    unknown = ?report.unknown_columns,
                    "Ignoring retained columns that do not exist"
                );
            }
        }

        report
    }

    /// Up to `max_columns` numeric columns for plotting; `None` when the
    /// table has no numeric column
    pub fn chart_data(&self, table: &Table) -> Option<ChartData> {
        let series: Vec<ChartSeries> = table
            .columns()
            .iter()
            .filter(|c| c.dtype.is_numeric())
            .take(self.chart.max_columns)
            .map(|c| ChartSeries {
                column: c.name.clone(),
                values: c.values.iter().map(|v| v.as_f64()).collect(),
            })
            .collect();

        if series.is_empty() {
            return None;
        }

        Some(ChartData {
            row_count: table.row_count(),
            series,
        })
    }
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Value;
    use crate::infrastructure::csv::CsvParser;

    fn table(content: &str) -> Table {
        CsvParser::new().parse_content(content).unwrap()
    }

    #[test]
    fn test_no_flags_is_identity() {
        let mut t = table("a,b\n1,x\n1,x\n,y");
        let before = t.clone();
        let report = TransformPipeline::default().apply(&mut t, &TransformFlags::default());
        assert_eq!(t, before);
        assert_eq!(report, TransformReport::default());
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let flags = TransformFlags {
            remove_duplicates: true,
            ..TransformFlags::default()
        };
        let pipeline = TransformPipeline::default();

        let mut once = table("a,b\n1,x\n2,y\n1,x\n2,y\n3,z");
        let report = pipeline.apply(&mut once, &flags);
        assert_eq!(report.duplicates_removed, 2);

        let mut twice = once.clone();
        let report = pipeline.apply(&mut twice, &flags);
        assert_eq!(report.duplicates_removed, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fill_missing_forward_fills() {
        let mut t = table("a,b\n1,\n,\n,2\n4,");
        let flags = TransformFlags {
            fill_missing: true,
            ..TransformFlags::default()
        };
        let report = TransformPipeline::default().apply(&mut t, &flags);

        assert_eq!(
            t.column("a").unwrap().values,
            vec![Value::Int(1), Value::Int(1), Value::Int(1), Value::Int(4)]
        );
        assert_eq!(
            t.column("b").unwrap().values,
            vec![Value::Null, Value::Null, Value::Int(2), Value::Int(2)]
        );
        assert_eq!(report.cells_filled, 3);
    }

    #[test]
    fn test_projection_runs_without_fill() {
        let mut t = table("a,b,c\n1,,3");
        let flags = TransformFlags {
            retain_columns: Some(vec!["c".to_string(), "b".to_string()]),
            ..TransformFlags::default()
        };
        TransformPipeline::default().apply(&mut t, &flags);
        assert_eq!(t.column_names(), vec!["c", "b"]);
        assert_eq!(t.column("b").unwrap().values, vec![Value::Null]);
    }

    #[test]
    fn test_duplicates_checked_before_fill() {
        // row 2 only matches row 1 after filling
        let mut t = table("a,b\n1,x\n1,\n1,x");
        let flags = TransformFlags {
            remove_duplicates: true,
            fill_missing: true,
            ..TransformFlags::default()
        };
        let report = TransformPipeline::default().apply(&mut t, &flags);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(t.row_count(), 2);
    }

    #[test]
    fn test_chart_takes_first_two_numeric_columns() {
        let t = table("name,x,flag,y,z\nA,1,True,2.5,3\nB,2,False,,4");
        let chart = TransformPipeline::default().chart_data(&t).unwrap();
        let names: Vec<&str> = chart.series.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(chart.series[1].values, vec![Some(2.5), None]);
    }

    #[test]
    fn test_chart_without_numeric_columns_is_none() {
        let t = table("name\nA\nB");
        assert!(TransformPipeline::default().chart_data(&t).is_none());
    }
}
