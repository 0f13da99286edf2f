//! State of a single cleaning session.

use crate::cleaner::CleaningEngine;
use crate::config::SessionConfig;
use crate::error::{CleaningError, Result};
use crate::export::ExportFile;
use crate::loader::{DatasetLoader, LoadedTable};
use crate::quality::QualityAnalyzer;
use crate::types::{CleaningOperation, LogEntry, QualityReport, SourceName};
use chrono::Utc;
use polars::prelude::*;
use tracing::{info, warn};

/// One user's dataset and the operations applied to it.
///
/// `original` never changes after load. `current` is replaced wholesale by
/// each successful operation and `log` only grows, until [`reset`] puts both
/// back to their initial state.
///
/// [`reset`]: SessionState::reset
#[derive(Debug, Clone)]
pub struct SessionState {
    config: SessionConfig,
    source: SourceName,
    original: DataFrame,
    current: DataFrame,
    log: Vec<LogEntry>,
}

impl SessionState {
    /// Parse an upload and start a session on it.
    pub fn load(bytes: &[u8], filename: &str, config: SessionConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?;

        let table = DatasetLoader::new(&config).load_bytes(bytes, filename)?;
        Ok(Self::from_table(table, config))
    }

    /// Start a session on an already parsed table.
    pub fn from_table(table: LoadedTable, config: SessionConfig) -> Self {
        info!(
            "Session started for '{}' ({} rows)",
            table.source.file_name(),
            table.df.height()
        );

        Self {
            config,
            source: table.source,
            current: table.df.clone(),
            original: table.df,
            log: Vec::new(),
        }
    }

    /// Apply one operation. On error nothing changes.
    pub fn apply(&mut self, operation: CleaningOperation) -> Result<&LogEntry> {
        let rows_before = self.current.height();

        let (next, message) = CleaningEngine::apply(&self.current, &operation, &self.config)
            .map_err(|e| {
                warn!("Rejected '{}': {}", operation, e);
                e
            })?;

        let entry = LogEntry {
            sequence: self.log.len() + 1,
            operation,
            message,
            timestamp: Utc::now(),
            rows_before,
            rows_after: next.height(),
        };

        self.current = next;
        self.log.push(entry);
        Ok(&self.log[self.log.len() - 1])
    }

    /// Discard every applied operation.
    pub fn reset(&mut self) {
        info!(
            "Resetting '{}' ({} operations discarded)",
            self.source.file_name(),
            self.log.len()
        );
        self.current = self.original.clone();
        self.log.clear();
    }

    /// Quality report of the current table, computed fresh.
    pub fn report(&self) -> Result<QualityReport> {
        QualityAnalyzer::analyze(&self.current)
    }

    /// The current table as a downloadable CSV.
    pub fn export(&self) -> Result<ExportFile> {
        ExportFile::from_table(&self.current, &self.source)
    }

    pub fn original(&self) -> &DataFrame {
        &self.original
    }

    pub fn current(&self) -> &DataFrame {
        &self.current
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn source(&self) -> &SourceName {
        &self.source
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether any operation has been applied since load or the last reset.
    pub fn is_modified(&self) -> bool {
        !self.log.is_empty()
    }
}
