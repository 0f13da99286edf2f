use crate::error::Result;
use crate::types::{ColumnKind, ColumnQuality, QualityReport};
use crate::utils::{distinct_row_count, has_surrounding_whitespace, series_kind};
use polars::prelude::*;
use tracing::debug;

pub struct QualityAnalyzer;

impl QualityAnalyzer {
    /// Build a [`QualityReport`] for `df`.
    ///
    /// Pure and deterministic: the same table always yields the same report.
    pub fn analyze(df: &DataFrame) -> Result<QualityReport> {
        let mut columns = Vec::with_capacity(df.width());

        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let kind = series_kind(series);
            let whitespace = match kind {
                ColumnKind::Text => Some(Self::count_whitespace(series)?),
                _ => None,
            };

            columns.push(ColumnQuality {
                name: col.name().to_string(),
                kind,
                missing: series.null_count(),
                whitespace,
            });
        }

        let duplicate_rows = Self::count_duplicates(df)?;
        let total_missing = columns.iter().map(|c| c.missing).sum();
        let whitespace_issues = columns.iter().filter_map(|c| c.whitespace).sum();

        debug!(
            "Quality report: {} missing, {} duplicate rows, {} whitespace issues",
            total_missing, duplicate_rows, whitespace_issues
        );

        Ok(QualityReport {
            row_count: df.height(),
            column_count: df.width(),
            columns,
            total_missing,
            duplicate_rows,
            whitespace_issues,
        })
    }

    /// Rows that repeat an earlier row: `rows - distinct rows`.
    pub fn count_duplicates(df: &DataFrame) -> Result<usize> {
        if df.height() == 0 {
            return Ok(0);
        }
        Ok(df.height() - distinct_row_count(df)?)
    }

    /// Non-missing cells whose trimmed form differs from the original.
    fn count_whitespace(series: &Series) -> Result<usize> {
        // Text columns that Polars could not type at all (every cell missing)
        // come through as the Null dtype.
        if series.dtype() != &DataType::String {
            return Ok(0);
        }

        Ok(series
            .str()?
            .into_iter()
            .flatten()
            .filter(|v| has_surrounding_whitespace(v))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df![
            "id" => [Some(1i64), Some(2), Some(1), None, Some(4)],
            "name" => [Some(" Ann"), Some("Bob"), Some(" Ann"), Some("Cy "), None],
            "score" => [Some(1.5), None, Some(1.5), Some(2.0), None],
        ]
        .unwrap()
    }

    #[test]
    fn test_analyze_counts_missing_per_column() {
        let report = QualityAnalyzer::analyze(&sample_df()).unwrap();

        assert_eq!(report.missing_in("id"), Some(1));
        assert_eq!(report.missing_in("name"), Some(1));
        assert_eq!(report.missing_in("score"), Some(2));
        assert_eq!(report.total_missing, 4);
        assert_eq!(report.row_count, 5);
        assert_eq!(report.column_count, 3);
    }

    #[test]
    fn test_analyze_counts_duplicates() {
        let report = QualityAnalyzer::analyze(&sample_df()).unwrap();
        // row 2 repeats row 0
        assert_eq!(report.duplicate_rows, 1);
    }

    #[test]
    fn test_duplicates_equal_rows_minus_distinct() {
        let df = df!["v" => ["A", "B", "A", "C", "B", "A"]].unwrap();
        let report = QualityAnalyzer::analyze(&df).unwrap();
        assert_eq!(report.duplicate_rows, 6 - 3);
    }

    #[test]
    fn test_missing_cells_match_for_duplicates() {
        let df = df![
            "a" => [None, None, Some(1i64)],
            "b" => [Some("x"), Some("x"), Some("x")],
        ]
        .unwrap();
        let report = QualityAnalyzer::analyze(&df).unwrap();
        assert_eq!(report.duplicate_rows, 1);
    }

    #[test]
    fn test_analyze_counts_whitespace_only_in_text_columns() {
        let report = QualityAnalyzer::analyze(&sample_df()).unwrap();

        assert_eq!(report.whitespace_in("name"), Some(3));
        assert_eq!(report.whitespace_in("id"), None);
        assert_eq!(report.whitespace_issues, 3);
        assert_eq!(report.column("name").unwrap().kind, ColumnKind::Text);
        assert_eq!(report.column("score").unwrap().kind, ColumnKind::Numeric);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let df = sample_df();
        let first = QualityAnalyzer::analyze(&df).unwrap();
        let second = QualityAnalyzer::analyze(&df).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_analyze_empty_table() {
        let df = df!["a" => Vec::<i64>::new()].unwrap();
        let report = QualityAnalyzer::analyze(&df).unwrap();

        assert_eq!(report.row_count, 0);
        assert_eq!(report.duplicate_rows, 0);
        assert!(!report.has_issues());
    }
}
