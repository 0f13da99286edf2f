//! CSV export of the current table.

use crate::error::Result;
use crate::types::SourceName;
use polars::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_MIME_TYPE: &str = "text/csv";

/// A downloadable file produced from a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Serialize `df` as the cleaned counterpart of `source`.
    pub fn from_table(df: &DataFrame, source: &SourceName) -> Result<Self> {
        Ok(Self {
            file_name: source.cleaned_file_name(),
            mime_type: CSV_MIME_TYPE.to_string(),
            bytes: to_export_bytes(df)?,
        })
    }

    /// Write the file into `dir` under its own name and return the full path.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;

        info!("Exported {} bytes to {}", self.bytes.len(), path.display());
        Ok(path)
    }
}

/// Comma-separated UTF-8 with a header row. Fields are quoted only when they
/// need it and missing cells are written as empty fields.
pub fn to_export_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut df = df.clone();

    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .with_quote_style(QuoteStyle::Necessary)
        .with_null_value(String::new())
        .finish(&mut df)?;

    Ok(buf)
}
