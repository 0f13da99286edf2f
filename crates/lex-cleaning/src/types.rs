use crate::error::CleaningError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// Column Types
// ============================================================================

/// Semantic type of a column, derived from its Polars dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    Temporal,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Text => "text",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Temporal => "temporal",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Quality Report
// ============================================================================

/// Per-column slice of a [`QualityReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnQuality {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
    /// Cells with leading/trailing whitespace. Only set for text columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitespace: Option<usize>,
}

/// Read-only snapshot of the data quality of one table.
///
/// Produced by [`crate::quality::QualityAnalyzer::analyze`] and never
/// updated in place: every table change gets a fresh report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub row_count: usize,
    pub column_count: usize,
    /// One entry per column, in table order.
    pub columns: Vec<ColumnQuality>,
    pub total_missing: usize,
    /// Rows identical to an earlier row (`rows - distinct rows`).
    pub duplicate_rows: usize,
    pub whitespace_issues: usize,
}

impl QualityReport {
    /// Missing count for `column`, or `None` if the column is unknown.
    pub fn missing_in(&self, column: &str) -> Option<usize> {
        self.column(column).map(|c| c.missing)
    }

    /// Whitespace anomaly count for a text column.
    pub fn whitespace_in(&self, column: &str) -> Option<usize> {
        self.column(column).and_then(|c| c.whitespace)
    }

    pub fn column(&self, column: &str) -> Option<&ColumnQuality> {
        self.columns.iter().find(|c| c.name == column)
    }

    /// Columns with at least one missing cell, in table order.
    pub fn columns_with_missing(&self) -> impl Iterator<Item = &ColumnQuality> {
        self.columns.iter().filter(|c| c.missing > 0)
    }

    /// Missing counts keyed by column name, in table order.
    pub fn missing_by_column(&self) -> Vec<(&str, usize)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.missing))
            .collect()
    }

    /// Whitespace anomaly counts keyed by text column name, in table order.
    pub fn whitespace_by_column(&self) -> Vec<(&str, usize)> {
        self.columns
            .iter()
            .filter_map(|c| c.whitespace.map(|w| (c.name.as_str(), w)))
            .collect()
    }

    pub fn has_issues(&self) -> bool {
        self.total_missing > 0 || self.duplicate_rows > 0 || self.whitespace_issues > 0
    }

    /// Operations worth offering for this report.
    ///
    /// Duplicate removal and trimming are only offered when they would change
    /// something. For every column with missing values the row deletion
    /// strategy comes first, then mean and median for numeric columns or mode
    /// for the rest. A custom fill is always possible and needs a value from
    /// the user, so it is not listed.
    pub fn suggested_operations(&self) -> Vec<CleaningOperation> {
        let mut ops = Vec::new();

        if self.duplicate_rows > 0 {
            ops.push(CleaningOperation::RemoveDuplicates);
        }
        if self.whitespace_issues > 0 {
            ops.push(CleaningOperation::TrimWhitespace);
        }

        for col in self.columns_with_missing() {
            let strategies: &[MissingStrategy] = if col.kind == ColumnKind::Numeric {
                &[
                    MissingStrategy::DeleteRows,
                    MissingStrategy::FillMean,
                    MissingStrategy::FillMedian,
                ]
            } else {
                &[MissingStrategy::DeleteRows, MissingStrategy::FillMode]
            };
            ops.extend(strategies.iter().map(|s| CleaningOperation::ResolveMissing {
                column: col.name.clone(),
                strategy: s.clone(),
            }));
        }

        ops
    }
}

// ============================================================================
// Cleaning Operations
// ============================================================================

/// How to resolve missing values in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "value", rename_all = "snake_case")]
pub enum MissingStrategy {
    DeleteRows,
    FillMean,
    FillMedian,
    FillMode,
    /// Fill with a caller-supplied value, coerced to the column type.
    FillCustom(String),
}

impl MissingStrategy {
    /// Short human label used in log and error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            MissingStrategy::DeleteRows => "delete rows with missing values",
            MissingStrategy::FillMean => "fill with mean",
            MissingStrategy::FillMedian => "fill with median",
            MissingStrategy::FillMode => "fill with mode",
            MissingStrategy::FillCustom(_) => "fill with custom value",
        }
    }

    /// Whether the strategy only makes sense for numeric columns.
    pub fn requires_numeric(&self) -> bool {
        matches!(self, MissingStrategy::FillMean | MissingStrategy::FillMedian)
    }
}

/// A single cleaning step a user can apply to the current table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CleaningOperation {
    RemoveDuplicates,
    TrimWhitespace,
    ResolveMissing {
        column: String,
        strategy: MissingStrategy,
    },
}

impl CleaningOperation {
    /// Target column, if the operation has one.
    pub fn column(&self) -> Option<&str> {
        match self {
            CleaningOperation::ResolveMissing { column, .. } => Some(column),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            CleaningOperation::RemoveDuplicates => "remove duplicates",
            CleaningOperation::TrimWhitespace => "trim whitespace",
            CleaningOperation::ResolveMissing { strategy, .. } => strategy.describe(),
        }
    }
}

/// Text form used on the command line, e.g. `fill-custom:city=Unknown`.
impl fmt::Display for CleaningOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleaningOperation::RemoveDuplicates => f.write_str("remove-duplicates"),
            CleaningOperation::TrimWhitespace => f.write_str("trim-whitespace"),
            CleaningOperation::ResolveMissing { column, strategy } => match strategy {
                MissingStrategy::DeleteRows => write!(f, "drop-missing:{column}"),
                MissingStrategy::FillMean => write!(f, "fill-mean:{column}"),
                MissingStrategy::FillMedian => write!(f, "fill-median:{column}"),
                MissingStrategy::FillMode => write!(f, "fill-mode:{column}"),
                MissingStrategy::FillCustom(value) => write!(f, "fill-custom:{column}={value}"),
            },
        }
    }
}

impl FromStr for CleaningOperation {
    type Err = CleaningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "remove-duplicates" => return Ok(CleaningOperation::RemoveDuplicates),
            "trim-whitespace" => return Ok(CleaningOperation::TrimWhitespace),
            _ => {}
        }

        let (action, target) = s.split_once(':').ok_or_else(|| {
            CleaningError::InvalidInput(format!("unknown operation '{s}'"))
        })?;
        if target.is_empty() {
            return Err(CleaningError::InvalidInput(format!(
                "operation '{action}' needs a column name"
            )));
        }

        let (column, strategy) = match action {
            "drop-missing" => (target, MissingStrategy::DeleteRows),
            "fill-mean" => (target, MissingStrategy::FillMean),
            "fill-median" => (target, MissingStrategy::FillMedian),
            "fill-mode" => (target, MissingStrategy::FillMode),
            "fill-custom" => {
                let (column, value) = target.split_once('=').ok_or_else(|| {
                    CleaningError::InvalidInput(format!(
                        "fill-custom expects COLUMN=VALUE, got '{target}'"
                    ))
                })?;
                (column, MissingStrategy::FillCustom(value.to_string()))
            }
            other => {
                return Err(CleaningError::InvalidInput(format!(
                    "unknown operation '{other}'"
                )));
            }
        };

        Ok(CleaningOperation::ResolveMissing {
            column: column.to_string(),
            strategy,
        })
    }
}

// ============================================================================
// Session Log & Naming
// ============================================================================

/// One applied operation in a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 1-based position in the log.
    pub sequence: usize,
    pub operation: CleaningOperation,
    /// Human-readable outcome, e.g. "Removed 2 duplicate rows."
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub rows_before: usize,
    pub rows_after: usize,
}

/// Base name and extension of an uploaded file.
///
/// Split the way `os.path.splitext` does: the extension keeps its leading
/// dot, and a leading dot alone (`.csv`) is part of the base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceName {
    pub base_name: String,
    pub extension: String,
}

impl SourceName {
    pub fn from_filename(filename: &str) -> Self {
        let file_name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename);

        match file_name.rfind('.') {
            Some(idx) if !file_name[..idx].trim_start_matches('.').is_empty() => Self {
                base_name: file_name[..idx].to_string(),
                extension: file_name[idx..].to_string(),
            },
            _ => Self {
                base_name: file_name.to_string(),
                extension: String::new(),
            },
        }
    }

    /// `{base}_cleaned{ext}`
    pub fn cleaned_file_name(&self) -> String {
        format!("{}_cleaned{}", self.base_name, self.extension)
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self.base_name, self.extension)
    }
}
