//! Statistical imputation methods.
//!
//! Each method reads the input table and returns a new one together with the
//! log line describing what happened. The input is never modified.

use crate::error::{CleaningError, Result};
use crate::types::{ColumnKind, MissingStrategy};
use crate::utils::{
    fill_nulls_with, fill_numeric_nulls, first_mode, is_integer_dtype, parse_boolean_string,
    parse_numeric_string, series_kind,
};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

/// Datetime layouts accepted for custom fill values, tried in order.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Resolve missing values in `column` with `strategy`.
    ///
    /// `missing_tokens` are the values the loader reads as missing; a custom
    /// fill value may not be one of them.
    pub fn resolve(
        df: &DataFrame,
        column: &str,
        strategy: &MissingStrategy,
        missing_tokens: &[String],
    ) -> Result<(DataFrame, String)> {
        match strategy {
            MissingStrategy::DeleteRows => Self::delete_rows(df, column),
            MissingStrategy::FillMean => Self::fill_mean(df, column),
            MissingStrategy::FillMedian => Self::fill_median(df, column),
            MissingStrategy::FillMode => Self::fill_mode(df, column),
            MissingStrategy::FillCustom(value) => {
                Self::fill_custom(df, column, value, missing_tokens)
            }
        }
    }

    /// Drop every row where `column` is missing, keeping row order.
    pub fn delete_rows(df: &DataFrame, column: &str) -> Result<(DataFrame, String)> {
        let series = target_series(df, column)?;
        let mask = series.is_not_null();

        let before = df.height();
        let out = df.filter(&mask)?;
        let removed = before - out.height();

        Ok((
            out,
            format!("Deleted {removed} rows due to missing values in '{column}'."),
        ))
    }

    /// Fill missing cells with the mean of the column. Numeric columns only.
    pub fn fill_mean(df: &DataFrame, column: &str) -> Result<(DataFrame, String)> {
        let series = checked_series(df, column, &MissingStrategy::FillMean)?;
        let mean = series
            .mean()
            .ok_or_else(|| CleaningError::NoValidValues(column.to_string()))?;

        let out = replace_column(df, column, fill_numeric_nulls(series, mean)?)?;
        debug!("Filled '{}' with mean {}", column, mean);

        Ok((
            out,
            format!("Filled missing values in '{column}' with mean ({mean:.2})."),
        ))
    }

    /// Fill missing cells with the median of the column. Numeric columns only.
    pub fn fill_median(df: &DataFrame, column: &str) -> Result<(DataFrame, String)> {
        let series = checked_series(df, column, &MissingStrategy::FillMedian)?;
        let median = series
            .median()
            .ok_or_else(|| CleaningError::NoValidValues(column.to_string()))?;

        let out = replace_column(df, column, fill_numeric_nulls(series, median)?)?;
        debug!("Filled '{}' with median {}", column, median);

        Ok((
            out,
            format!("Filled missing values in '{column}' with median ({median})."),
        ))
    }

    /// Fill missing cells with the most frequent value.
    ///
    /// Ties go to the value seen first in row order. The fill is taken from
    /// the column itself, so its dtype is kept whatever it is.
    pub fn fill_mode(df: &DataFrame, column: &str) -> Result<(DataFrame, String)> {
        let series = checked_series(df, column, &MissingStrategy::FillMode)?;
        let (row, mode) = first_mode(series)?
            .ok_or_else(|| CleaningError::NoValidValues(column.to_string()))?;

        let fill = series.slice(row as i64, 1);
        let out = replace_column(df, column, fill_nulls_with(series, &fill)?)?;

        Ok((
            out,
            format!("Filled missing values in '{column}' with mode ({mode})."),
        ))
    }

    /// Fill missing cells with a caller-supplied value coerced to the column type.
    pub fn fill_custom(
        df: &DataFrame,
        column: &str,
        value: &str,
        missing_tokens: &[String],
    ) -> Result<(DataFrame, String)> {
        let series = target_series(df, column)?;
        if value.trim().is_empty() {
            return Err(CleaningError::InvalidInput(format!(
                "custom value for '{column}' must not be empty"
            )));
        }
        if missing_tokens.iter().any(|t| t == value) {
            return Err(CleaningError::InvalidInput(format!(
                "custom value '{value}' for '{column}' is itself read as missing"
            )));
        }

        let strategy = MissingStrategy::FillCustom(value.to_string());
        let filled = fill_with_literal(series, value, &strategy)?;
        let out = replace_column(df, column, filled)?;

        Ok((
            out,
            format!("Filled missing values in '{column}' with custom value: {value}."),
        ))
    }
}

fn target_series<'a>(df: &'a DataFrame, column: &str) -> Result<&'a Series> {
    df.column(column)
        .map(|c| c.as_materialized_series())
        .map_err(|_| CleaningError::ColumnNotFound(column.to_string()))
}

/// Look up `column` and make sure `strategy` can run on its kind.
fn checked_series<'a>(
    df: &'a DataFrame,
    column: &str,
    strategy: &MissingStrategy,
) -> Result<&'a Series> {
    let series = target_series(df, column)?;
    let kind = series_kind(series);
    if strategy.requires_numeric() && kind != ColumnKind::Numeric {
        return Err(CleaningError::type_mismatch(
            column,
            strategy.describe(),
            format!("column is {kind}, not numeric"),
        ));
    }
    Ok(series)
}

fn replace_column(df: &DataFrame, column: &str, series: Series) -> Result<DataFrame> {
    let mut out = df.clone();
    out.replace(column, series)?;
    Ok(out)
}

/// Coerce `value` to the type of `series` and fill its nulls with it.
///
/// Integer columns stay integer when the value is integral and widen to
/// Float64 otherwise.
fn fill_with_literal(series: &Series, value: &str, strategy: &MissingStrategy) -> Result<Series> {
    let name = series.name().clone();
    let mismatch = |reason: String| {
        CleaningError::type_mismatch(name.as_str(), strategy.describe(), reason)
    };

    let (column, literal) = match series_kind(series) {
        ColumnKind::Numeric => {
            let number = parse_numeric_string(value)
                .ok_or_else(|| mismatch(format!("'{value}' is not a number")))?;
            if !number.is_finite() {
                return Err(mismatch(format!("'{value}' is not a finite number")));
            }

            if is_integer_dtype(series.dtype())
                && number.fract() == 0.0
                && number.abs() < i64::MAX as f64
            {
                let literal = Series::new(name.clone(), [number as i64]).cast(series.dtype())?;
                if literal.null_count() > 0 {
                    return Err(mismatch(format!(
                        "{value} is out of range for {}",
                        series.dtype()
                    )));
                }
                (series.clone(), literal)
            } else {
                let column = series.cast(&DataType::Float64)?;
                (column, Series::new(name.clone(), [number]))
            }
        }
        ColumnKind::Boolean => {
            let flag = parse_boolean_string(value)
                .ok_or_else(|| mismatch(format!("'{value}' is not true or false")))?;
            (series.clone(), Series::new(name.clone(), [flag]))
        }
        ColumnKind::Temporal => {
            let literal = temporal_literal(name.clone(), value.trim(), series.dtype())?
                .ok_or_else(|| {
                    mismatch(format!("'{value}' is not a valid {}", series.dtype()))
                })?;
            (series.clone(), literal)
        }
        ColumnKind::Text => {
            let column = series.cast(&DataType::String)?;
            (column, Series::new(name.clone(), [value]))
        }
    };

    Ok(fill_nulls_with(&column, &literal)?)
}

/// One-element Series of `dtype` holding `value`, or `None` if it does not parse.
///
/// Dates and datetimes are parsed with chrono and built from their epoch
/// offset; other temporal types go through a Polars string cast.
fn temporal_literal(name: PlSmallStr, value: &str, dtype: &DataType) -> Result<Option<Series>> {
    // NaiveDateTime defaults to the Unix epoch
    let epoch = NaiveDateTime::default();

    let literal = match dtype {
        DataType::Date => {
            let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") else {
                return Ok(None);
            };
            let days = (date - epoch.date()).num_days() as i32;
            Series::new(name, [days]).cast(dtype)?
        }
        DataType::Datetime(unit, _) => {
            let parsed = DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                });
            let Some(parsed) = parsed else {
                return Ok(None);
            };

            let delta = parsed - epoch;
            let ticks = match unit {
                TimeUnit::Nanoseconds => delta.num_nanoseconds(),
                TimeUnit::Microseconds => delta.num_microseconds(),
                TimeUnit::Milliseconds => Some(delta.num_milliseconds()),
            };
            let Some(ticks) = ticks else {
                return Ok(None);
            };
            Series::new(name, [ticks]).cast(dtype)?
        }
        _ => match Series::new(name, [value]).cast(dtype) {
            Ok(s) => s,
            Err(_) => return Ok(None),
        },
    };

    Ok((literal.null_count() == 0).then_some(literal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::loader::DatasetLoader;

    fn load(csv: &str) -> DataFrame {
        let config = SessionConfig::default();
        DatasetLoader::new(&config)
            .load_bytes(csv.as_bytes(), "t.csv")
            .unwrap()
            .df
    }

    fn default_tokens() -> Vec<String> {
        SessionConfig::default().missing_tokens
    }

    fn rendered(df: &DataFrame, column: &str) -> Vec<Option<String>> {
        df.column(column)
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::String)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    fn floats(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
        df.column(column)
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::Float64)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn strings(df: &DataFrame, column: &str) -> Vec<Option<String>> {
        df.column(column)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    // ========================================================================
    // delete_rows() tests
    // ========================================================================

    #[test]
    fn test_delete_rows_keeps_order() {
        let df = df![
            "id" => [1i64, 2, 3, 4, 5],
            "score" => [Some(10.0), None, Some(30.0), None, Some(50.0)],
        ]
        .unwrap();

        let (out, message) = StatisticalImputer::delete_rows(&df, "score").unwrap();

        assert_eq!(out.height(), 3);
        assert_eq!(floats(&out, "id"), vec![Some(1.0), Some(3.0), Some(5.0)]);
        assert_eq!(message, "Deleted 2 rows due to missing values in 'score'.");
        assert_eq!(df.height(), 5);
    }

    // ========================================================================
    // fill_mean() / fill_median() tests
    // ========================================================================

    #[test]
    fn test_fill_mean_basic() {
        let df = df!["v" => [Some(1i64), None, Some(3)]].unwrap();

        let (out, message) = StatisticalImputer::fill_mean(&df, "v").unwrap();

        assert_eq!(floats(&out, "v"), vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(message, "Filled missing values in 'v' with mean (2.00).");
        assert_eq!(df.column("v").unwrap().null_count(), 1);
    }

    #[test]
    fn test_fill_median_basic() {
        let df = df!["v" => [Some(1i64), None, Some(2), Some(100)]].unwrap();

        let (out, message) = StatisticalImputer::fill_median(&df, "v").unwrap();

        assert_eq!(
            floats(&out, "v"),
            vec![Some(1.0), Some(2.0), Some(2.0), Some(100.0)]
        );
        assert_eq!(message, "Filled missing values in 'v' with median (2).");
    }

    #[test]
    fn test_fill_mean_rejects_text_column() {
        let df = df!["city" => [Some("Oslo"), None]].unwrap();

        let err = StatisticalImputer::fill_mean(&df, "city").unwrap_err();

        assert_eq!(err.error_code(), "TYPE_MISMATCH");
        assert!(err.to_string().contains("city"));
    }

    #[test]
    fn test_text_column_rejects_only_numeric_strategies() {
        let df = df!["city" => [Some("Oslo"), None]].unwrap();
        for strategy in [
            MissingStrategy::DeleteRows,
            MissingStrategy::FillMean,
            MissingStrategy::FillMedian,
            MissingStrategy::FillMode,
            MissingStrategy::FillCustom("Bergen".to_string()),
        ] {
            let result = StatisticalImputer::resolve(&df, "city", &strategy, &[]);
            assert_eq!(result.is_err(), strategy.requires_numeric(), "{}", strategy.describe());
        }
    }

    #[test]
    fn test_fill_median_all_missing_has_no_value() {
        let df = df!["v" => [Option::<f64>::None, None]].unwrap();
        let err = StatisticalImputer::fill_median(&df, "v").unwrap_err();
        assert_eq!(err.error_code(), "NO_VALID_VALUES");
    }

    // ========================================================================
    // fill_mode() tests
    // ========================================================================

    #[test]
    fn test_fill_mode_text() {
        let df = df!["c" => [Some("A"), Some("B"), Some("A"), None, Some("A")]].unwrap();

        let (out, message) = StatisticalImputer::fill_mode(&df, "c").unwrap();

        assert_eq!(strings(&out, "c")[3], Some("A".to_string()));
        assert_eq!(message, "Filled missing values in 'c' with mode (A).");
    }

    #[test]
    fn test_fill_mode_tie_uses_first_value() {
        let df = df!["c" => [Some("B"), Some("A"), None, Some("A"), Some("B")]].unwrap();

        let (out, _) = StatisticalImputer::fill_mode(&df, "c").unwrap();

        assert_eq!(strings(&out, "c")[2], Some("B".to_string()));
    }

    #[test]
    fn test_fill_mode_keeps_integer_dtype() {
        let df = df!["n" => [Some(3i64), Some(3), None, Some(7)]].unwrap();

        let (out, _) = StatisticalImputer::fill_mode(&df, "n").unwrap();

        let col = out.column("n").unwrap();
        assert_eq!(col.dtype(), &DataType::Int64);
        assert_eq!(col.null_count(), 0);
        assert_eq!(floats(&out, "n")[2], Some(3.0));
    }

    #[test]
    fn test_fill_mode_boolean() {
        let df = df!["b" => [Some(true), None, Some(true), Some(false)]].unwrap();

        let (out, _) = StatisticalImputer::fill_mode(&df, "b").unwrap();

        let values: Vec<Option<bool>> = out
            .column("b")
            .unwrap()
            .as_materialized_series()
            .bool()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(true), Some(true), Some(true), Some(false)]);
    }

    // ========================================================================
    // fill_custom() tests
    // ========================================================================

    #[test]
    fn test_fill_custom_text() {
        let df = df!["city" => [Some("Oslo"), None]].unwrap();

        let (out, message) =
            StatisticalImputer::fill_custom(&df, "city", "Unknown", &default_tokens()).unwrap();

        assert_eq!(
            strings(&out, "city"),
            vec![Some("Oslo".to_string()), Some("Unknown".to_string())]
        );
        assert_eq!(
            message,
            "Filled missing values in 'city' with custom value: Unknown."
        );
    }

    #[test]
    fn test_fill_custom_coerces_to_numeric() {
        let df = df!["n" => [Some(1i64), None]].unwrap();

        let (out, _) = StatisticalImputer::fill_custom(&df, "n", "42", &[]).unwrap();
        assert_eq!(out.column("n").unwrap().dtype(), &DataType::Int64);
        assert_eq!(floats(&out, "n"), vec![Some(1.0), Some(42.0)]);

        let (out, _) = StatisticalImputer::fill_custom(&df, "n", "2.5", &[]).unwrap();
        assert_eq!(out.column("n").unwrap().dtype(), &DataType::Float64);
        assert_eq!(floats(&out, "n"), vec![Some(1.0), Some(2.5)]);
    }

    #[test]
    fn test_fill_custom_rejects_uncoercible_value() {
        let df = df!["n" => [Some(1i64), None]].unwrap();
        let err = StatisticalImputer::fill_custom(&df, "n", "lots", &[]).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_MISMATCH");

        let df = df!["b" => [Some(true), None]].unwrap();
        let err = StatisticalImputer::fill_custom(&df, "b", "perhaps", &[]).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_fill_custom_rejects_empty_value() {
        let df = df!["city" => [Some("Oslo"), None]].unwrap();
        let err = StatisticalImputer::fill_custom(&df, "city", "  ", &[]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_unknown_column_is_not_found() {
        let df = df!["a" => [Some(1i64), None]].unwrap();
        for strategy in [
            MissingStrategy::DeleteRows,
            MissingStrategy::FillMean,
            MissingStrategy::FillMode,
            MissingStrategy::FillCustom(String::new()),
        ] {
            let err = StatisticalImputer::resolve(&df, "b", &strategy, &[]).unwrap_err();
            assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        }
    }

    #[test]
    fn test_fill_mode_date_column() {
        let df = load("id,d\n1,2024-01-05\n2,\n3,2024-01-05\n4,2024-02-01\n");
        assert_eq!(df.column("d").unwrap().dtype(), &DataType::Date);

        let (out, message) = StatisticalImputer::fill_mode(&df, "d").unwrap();

        assert_eq!(out.column("d").unwrap().dtype(), &DataType::Date);
        assert_eq!(rendered(&out, "d")[1], Some("2024-01-05".to_string()));
        assert_eq!(message, "Filled missing values in 'd' with mode (2024-01-05).");
    }

    #[test]
    fn test_fill_mode_datetime_column() {
        let df = load(
            "id,t\n1,2024-01-01 10:00:00\n2,\n3,2024-01-01 10:00:00\n4,2024-02-01 09:00:00\n",
        );
        let dtype = df.column("t").unwrap().dtype().clone();
        assert!(matches!(dtype, DataType::Datetime(_, _)));

        let (out, _) = StatisticalImputer::fill_mode(&df, "t").unwrap();

        let col = out.column("t").unwrap();
        assert_eq!(col.dtype(), &dtype);
        assert_eq!(col.null_count(), 0);
        let values = rendered(&out, "t");
        assert_eq!(values[1], values[0]);
    }

    #[test]
    fn test_fill_custom_date_column() {
        let df = load("id,d\n1,2024-01-05\n2,\n");

        let (out, _) = StatisticalImputer::fill_custom(&df, "d", "2024-03-01", &[]).unwrap();

        assert_eq!(out.column("d").unwrap().dtype(), &DataType::Date);
        assert_eq!(rendered(&out, "d")[1], Some("2024-03-01".to_string()));
    }

    #[test]
    fn test_fill_custom_datetime_column() {
        let df = load("id,t\n1,2024-01-01 10:00:00\n2,\n");

        let (out, _) =
            StatisticalImputer::fill_custom(&df, "t", "2024-03-01 08:30:00", &[]).unwrap();

        assert_eq!(out.column("t").unwrap().null_count(), 0);
        let filled = rendered(&out, "t")[1].clone().unwrap();
        assert!(filled.starts_with("2024-03-01 08:30:00"), "got {filled}");
    }

    #[test]
    fn test_fill_custom_rejects_invalid_date() {
        let df = load("id,d\n1,2024-01-05\n2,\n");
        let err = StatisticalImputer::fill_custom(&df, "d", "yesterday", &[]).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_fill_custom_rejects_missing_token() {
        let df = df!["c" => [Some("a"), None]].unwrap();

        let err = StatisticalImputer::fill_custom(&df, "c", "NA", &default_tokens()).unwrap_err();

        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_fill_custom_rejects_non_finite_number() {
        let df = df!["v" => [Some(1.0), None]].unwrap();

        for value in ["inf", "-inf", "NaN"] {
            let err = StatisticalImputer::fill_custom(&df, "v", value, &[]).unwrap_err();
            assert_eq!(err.error_code(), "TYPE_MISMATCH", "value {value}");
        }
    }
}
