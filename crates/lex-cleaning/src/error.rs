//! Custom error types for cleaning sessions.
//!
//! Every failure a session can hit falls into one of four user-facing kinds
//! (parse, not found, type mismatch, invalid input) plus an internal bucket
//! for I/O and Polars failures. Errors are serializable so a frontend can
//! show them next to the operation that produced them.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Coarse classification of a [`CleaningError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The upload could not be read as CSV.
    Parse,
    /// A referenced column does not exist.
    NotFound,
    /// A numeric operation on a non-numeric column, or an uncoercible value.
    TypeMismatch,
    /// Empty custom value, empty table, or an operation that cannot run.
    InvalidInput,
    /// I/O or dataframe engine failure.
    Internal,
}

/// The main error type for cleaning sessions.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Upload could not be decoded or parsed as delimited text.
    #[error("Failed to parse '{source_name}': {reason}")]
    Parse { source_name: String, reason: String },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Operation requires a column type the target column does not have.
    #[error("Cannot {operation} on column '{column}': {reason}")]
    TypeMismatch {
        column: String,
        operation: String,
        reason: String,
    },

    /// Caller-supplied input is unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The table has no rows to operate on.
    #[error("Cannot {0}: the dataset has no rows")]
    EmptyTable(String),

    /// No non-missing values available to compute a fill value.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Invalid session configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No session exists for the given id.
    #[error("No session with id {0}")]
    SessionNotFound(u64),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Build a parse error for the named upload.
    pub fn parse(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a type mismatch error.
    pub fn type_mismatch(
        column: impl Into<String>,
        operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Classify the error into one of the user-facing kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::Parse,
            Self::ColumnNotFound(_) | Self::SessionNotFound(_) => ErrorKind::NotFound,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::InvalidInput(_)
            | Self::EmptyTable(_)
            | Self::NoValidValues(_)
            | Self::InvalidConfig(_) => ErrorKind::InvalidInput,
            Self::Io(_) | Self::Polars(_) => ErrorKind::Internal,
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "PARSE_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::EmptyTable(_) => "EMPTY_TABLE",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the session can carry on after this error.
    ///
    /// Everything a user can fix by choosing different parameters is
    /// recoverable; engine and I/O failures are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }
}

/// Errors are serialized as `{ code, kind, message }` for the frontend.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
