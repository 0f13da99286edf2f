//! Interactive Data Cleaning Library
//!
//! Load a CSV upload, inspect its data quality, apply cleaning operations one
//! at a time, and export the result. Built with Rust and Polars.
//!
//! # Overview
//!
//! - **Loading**: CSV bytes in, typed Polars `DataFrame` out, with configurable
//!   missing-value tokens
//! - **Quality Reports**: missing values per column, duplicate rows, and
//!   leading or trailing whitespace in text columns
//! - **Cleaning**: duplicate removal, whitespace trimming, and missing value
//!   resolution (delete rows, mean, median, mode, or a custom value)
//! - **Sessions**: an immutable original, a working copy, an operation log,
//!   and reset
//! - **Export**: the working copy as CSV named `{base}_cleaned{ext}`
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_cleaning::{CleaningOperation, MissingStrategy, SessionConfig, SessionState};
//!
//! let bytes = std::fs::read("customers.csv")?;
//! let mut session = SessionState::load(&bytes, "customers.csv", SessionConfig::default())?;
//!
//! let report = session.report()?;
//! println!("{} duplicate rows", report.duplicate_rows);
//!
//! session.apply(CleaningOperation::RemoveDuplicates)?;
//! session.apply(CleaningOperation::ResolveMissing {
//!     column: "age".to_string(),
//!     strategy: MissingStrategy::FillMedian,
//! })?;
//!
//! for entry in session.log() {
//!     println!("{}. {}", entry.sequence, entry.message);
//! }
//!
//! let file = session.export()?;
//! file.write_to_dir("outputs")?;
//! ```
//!
//! # Error Handling
//!
//! Every operation returns [`CleaningError`] on failure. A failed operation
//! never changes the session, so callers can report the error and carry on:
//!
//! ```rust,ignore
//! match session.apply(op) {
//!     Ok(entry) => println!("{}", entry.message),
//!     Err(e) => println!("[{}] {}", e.error_code(), e),
//! }
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod imputers;
pub mod loader;
pub mod quality;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::CleaningEngine;
pub use config::{ConfigValidationError, DEFAULT_MISSING_TOKENS, SessionConfig, SessionConfigBuilder};
pub use error::{CleaningError, ErrorKind, Result as CleaningResult, ResultExt};
pub use export::{ExportFile, to_export_bytes};
pub use imputers::StatisticalImputer;
pub use loader::{DatasetLoader, LoadedTable};
pub use quality::QualityAnalyzer;
pub use session::{SessionId, SessionRegistry, SessionState};
pub use types::{
    CleaningOperation, ColumnKind, ColumnQuality, LogEntry, MissingStrategy, QualityReport,
    SourceName,
};
pub use utils::{column_kind, parse_boolean_string, parse_numeric_string, series_kind};
