//! Dataset loading.
//!
//! Turns an uploaded byte stream into a Polars `DataFrame`. Column types are
//! inferred by Polars over the whole file (unless the config limits it), so a
//! column only becomes numeric when every non-missing cell is a number.

use crate::config::SessionConfig;
use crate::error::{CleaningError, Result};
use crate::types::SourceName;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A freshly parsed upload together with the name it arrived under.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub df: DataFrame,
    pub source: SourceName,
}

/// Reads CSV uploads according to a [`SessionConfig`].
pub struct DatasetLoader<'a> {
    config: &'a SessionConfig,
    schema_overwrite: Option<SchemaRef>,
}

impl<'a> DatasetLoader<'a> {
    pub fn new(config: &'a SessionConfig) -> Self {
        Self {
            config,
            schema_overwrite: None,
        }
    }

    /// Read columns with the dtypes they have in `df` instead of inferring them.
    ///
    /// Without this, a re-uploaded export is typed from its text alone, so a
    /// text column whose values all look like numbers comes back numeric.
    /// Columns `df` holds as all-null keep inference.
    pub fn with_schema_of(mut self, df: &DataFrame) -> Self {
        let schema: Schema = df
            .get_columns()
            .iter()
            .filter(|c| c.dtype() != &DataType::Null)
            .map(|c| Field::new(c.name().clone(), c.dtype().clone()))
            .collect();
        self.schema_overwrite = Some(Arc::new(schema));
        self
    }

    /// Parse `bytes` as UTF-8 CSV with a header row.
    ///
    /// Fails with a parse error when the bytes are not UTF-8, contain no
    /// header, or have rows that cannot be reconciled with the header.
    pub fn load_bytes(&self, bytes: &[u8], filename: &str) -> Result<LoadedTable> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            CleaningError::parse(filename, format!("not valid UTF-8 ({e})"))
        })?;

        if text.trim().is_empty() {
            return Err(CleaningError::parse(filename, "file is empty"));
        }

        debug!("Parsing {} bytes from '{}'", bytes.len(), filename);

        let df = self
            .read_options()
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| CleaningError::parse(filename, e))?;

        if df.width() == 0 {
            return Err(CleaningError::parse(filename, "no columns found in header"));
        }

        info!(
            "Loaded '{}': {} rows x {} columns",
            filename,
            df.height(),
            df.width()
        );

        Ok(LoadedTable {
            df,
            source: SourceName::from_filename(filename),
        })
    }

    /// Read a CSV file from disk.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedTable> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        self.load_bytes(&bytes, &filename)
    }

    fn read_options(&self) -> CsvReadOptions {
        let null_values = NullValues::AllColumns(
            self.config
                .missing_tokens
                .iter()
                .map(|t| PlSmallStr::from(t.as_str()))
                .collect(),
        );

        let parse_options = CsvParseOptions::default()
            .with_separator(self.config.delimiter)
            .with_quote_char(Some(b'"'))
            .with_missing_is_null(true)
            .with_null_values(Some(null_values))
            .with_try_parse_dates(self.config.parse_dates);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.config.infer_schema_rows)
            .with_schema_overwrite(self.schema_overwrite.clone())
            .with_parse_options(parse_options)
    }
}
