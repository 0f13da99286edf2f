//! Cleaning operations on a single table.
//!
//! [`CleaningEngine::apply`] is a pure function: it reads the current table
//! and returns a new one plus a log message, or an error. The caller decides
//! whether to commit the new table, so a failed operation never leaves a
//! half-applied result behind.

mod sanitizers;

use crate::config::SessionConfig;
use crate::error::{CleaningError, Result};
use crate::imputers::StatisticalImputer;
use crate::types::CleaningOperation;
use crate::utils::first_occurrence_mask;
use polars::prelude::*;
use tracing::{debug, info};

/// Applies [`CleaningOperation`]s to DataFrames.
pub struct CleaningEngine;

impl CleaningEngine {
    /// Apply one operation to `df`, returning the new table and its log line.
    ///
    /// Preconditions are checked before any work: the table must have rows
    /// and a targeted column must exist. `config` supplies the missing tokens,
    /// which no cell produced here may equal.
    pub fn apply(
        df: &DataFrame,
        operation: &CleaningOperation,
        config: &SessionConfig,
    ) -> Result<(DataFrame, String)> {
        if df.height() == 0 {
            return Err(CleaningError::EmptyTable(operation.describe().to_string()));
        }
        if let Some(column) = operation.column()
            && df.column(column).is_err()
        {
            return Err(CleaningError::ColumnNotFound(column.to_string()));
        }

        debug!("Applying '{}' to {} rows", operation, df.height());

        let (out, message) = match operation {
            CleaningOperation::RemoveDuplicates => Self::remove_duplicates(df)?,
            CleaningOperation::TrimWhitespace => Self::trim_whitespace(df, config)?,
            CleaningOperation::ResolveMissing { column, strategy } => {
                StatisticalImputer::resolve(df, column, strategy, &config.missing_tokens)?
            }
        };

        info!("{}", message);
        Ok((out, message))
    }

    /// Keep the first occurrence of every distinct row, preserving order.
    pub fn remove_duplicates(df: &DataFrame) -> Result<(DataFrame, String)> {
        let mask = first_occurrence_mask(df)?;
        let mask = BooleanChunked::from_slice(PlSmallStr::from_static("keep"), &mask);

        let out = df.filter(&mask)?;
        let removed = df.height() - out.height();

        Ok((out, format!("Removed {removed} duplicate rows.")))
    }

    /// Trim surrounding whitespace in every text cell.
    ///
    /// Cells that end up blank or equal to a missing token become missing.
    pub fn trim_whitespace(df: &DataFrame, config: &SessionConfig) -> Result<(DataFrame, String)> {
        let (out, changed) = sanitizers::trim_all_string_columns(df, &config.missing_tokens)?;
        Ok((out, format!("Trimmed whitespace in {changed} cells.")))
    }
}
