//! Shared utilities for cleaning sessions.
//!
//! This module contains common helper functions used across the analyzer,
//! the cleaner and the imputers so every component agrees on what a column's
//! type is, what a row looks like and how a value is parsed.

use crate::types::ColumnKind;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    is_numeric_dtype(dtype) && !matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time | DataType::Duration(_)
    )
}

/// Semantic kind of a Polars dtype.
///
/// Anything that is not a number, a boolean or a point in time is text.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if is_datetime_dtype(dtype) {
        ColumnKind::Temporal
    } else if matches!(dtype, DataType::Boolean) {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    }
}

/// Semantic kind of a Series.
pub fn series_kind(series: &Series) -> ColumnKind {
    column_kind(series.dtype())
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Clean a string for numeric parsing by removing formatting characters.
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Try to parse a string as a numeric value (f64).
///
/// Handles common formatting like currency symbols, percentages, and thousands separators.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Common boolean true representations.
pub const BOOLEAN_TRUE_VALUES: [&str; 6] = ["true", "yes", "1", "t", "y", "on"];

/// Common boolean false representations.
pub const BOOLEAN_FALSE_VALUES: [&str; 6] = ["false", "no", "0", "f", "n", "off"];

/// Parse a string as a boolean, accepting the usual spellings.
pub fn parse_boolean_string(s: &str) -> Option<bool> {
    let lower = s.trim().to_ascii_lowercase();
    if BOOLEAN_TRUE_VALUES.contains(&lower.as_str()) {
        Some(true)
    } else if BOOLEAN_FALSE_VALUES.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Whether a string has leading or trailing whitespace.
#[inline]
pub fn has_surrounding_whitespace(s: &str) -> bool {
    s.len() != s.trim().len()
}

// =============================================================================
// Row Utilities
// =============================================================================

/// Row identity used for duplicate detection.
///
/// Each cell is rendered to its string form; missing cells become `None`, so
/// two missing cells in the same column position compare equal. This avoids
/// any dependence on floating point NaN comparison rules.
pub type RowKey = Vec<Option<String>>;

/// Build the [`RowKey`] of every row, in row order.
pub fn row_keys(df: &DataFrame) -> PolarsResult<Vec<RowKey>> {
    let mut keys: Vec<RowKey> = vec![Vec::with_capacity(df.width()); df.height()];

    for col in df.get_columns() {
        let as_text = col.as_materialized_series().cast(&DataType::String)?;
        for (row, value) in as_text.str()?.into_iter().enumerate() {
            keys[row].push(value.map(str::to_string));
        }
    }

    Ok(keys)
}

/// Mask that is `true` for the first occurrence of every distinct row.
pub fn first_occurrence_mask(df: &DataFrame) -> PolarsResult<Vec<bool>> {
    let mut seen: HashSet<RowKey> = HashSet::with_capacity(df.height());
    Ok(row_keys(df)?
        .into_iter()
        .map(|key| seen.insert(key))
        .collect())
}

/// Number of distinct rows in a DataFrame.
pub fn distinct_row_count(df: &DataFrame) -> PolarsResult<usize> {
    Ok(row_keys(df)?.into_iter().collect::<HashSet<_>>().len())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent non-null value of a Series.
///
/// Returns the row index of its first occurrence together with its string
/// form. Ties go to the value that appears first in row order, so the result
/// does not depend on hash iteration order.
pub fn first_mode(series: &Series) -> PolarsResult<Option<(usize, String)>> {
    let as_text = series.cast(&DataType::String)?;
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (idx, value) in as_text.str()?.into_iter().enumerate() {
        if let Some(value) = value {
            counts.entry(value).or_insert((0, idx)).0 += 1;
        }
    }

    Ok(counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, (_, first))| (first, value.to_string())))
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let filled: Float64Chunked = floats
        .f64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();

    Ok(filled.with_name(series.name().clone()).into_series())
}

/// Fill null values of `series` with the single value held by `fill`.
///
/// `fill` must already have the dtype of `series`.
pub fn fill_nulls_with(series: &Series, fill: &Series) -> PolarsResult<Series> {
    let fill = fill.new_from_index(0, series.len());
    let mask = series.is_not_null();
    let filled = series.zip_with(&mask, &fill)?;
    Ok(filled.with_name(series.name().clone()))
}

/// Trim every non-null value of a string Series.
///
/// A value that trims down to nothing, or to one of `missing_tokens`, becomes
/// a missing cell, since that is how it would read back from an export.
/// Returns the trimmed Series and how many cells actually changed.
pub fn trim_string_series(
    series: &Series,
    missing_tokens: &[String],
) -> PolarsResult<(Series, usize)> {
    let mut changed = 0;
    let trimmed: StringChunked = series
        .str()?
        .into_iter()
        .map(|v| {
            v.and_then(|s| {
                if !has_surrounding_whitespace(s) {
                    return Some(s);
                }
                changed += 1;
                let t = s.trim();
                let is_missing = t.is_empty() || missing_tokens.iter().any(|m| m == t);
                (!is_missing).then_some(t)
            })
        })
        .collect();

    Ok((trimmed.with_name(series.name().clone()).into_series(), changed))
}

// =============================================================================
// Tests
// =============================================================================
