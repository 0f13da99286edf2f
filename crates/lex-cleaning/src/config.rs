//! Configuration types for cleaning sessions.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic session setup.

use serde::{Deserialize, Serialize};

/// Tokens treated as missing when reading a CSV upload.
///
/// Mirrors the default `na_values` of pandas' `read_csv`, so files cleaned
/// here report the same missing counts users see in a notebook.
pub const DEFAULT_MISSING_TOKENS: [&str; 17] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "<NA>", "N/A", "NA",
    "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Configuration for a cleaning session.
///
/// Use [`SessionConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaning::config::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .missing_tokens(["", "?"])
///     .parse_dates(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Field values read as missing cells.
    /// Default: [`DEFAULT_MISSING_TOKENS`]
    pub missing_tokens: Vec<String>,

    /// Whether to detect date and datetime columns while loading.
    /// Default: true
    pub parse_dates: bool,

    /// Field delimiter used when loading. Exports are always comma-separated.
    /// Default: b','
    pub delimiter: u8,

    /// Number of rows scanned for type inference; `None` scans the whole file
    /// so a column is numeric only if every non-missing cell is a number.
    /// Default: None
    pub infer_schema_rows: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            missing_tokens: DEFAULT_MISSING_TOKENS.iter().map(|t| t.to_string()).collect(),
            parse_dates: true,
            delimiter: b',',
            infer_schema_rows: None,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if matches!(self.delimiter, b'"' | b'\n' | b'\r') {
            return Err(ConfigValidationError::InvalidDelimiter(self.delimiter as char));
        }

        if self.infer_schema_rows == Some(0) {
            return Err(ConfigValidationError::InvalidInferSchemaRows);
        }

        if let Some(token) = self
            .missing_tokens
            .iter()
            .find(|t| t.contains(self.delimiter as char))
        {
            return Err(ConfigValidationError::TokenContainsDelimiter(token.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid delimiter {0:?} (quotes and line breaks are reserved)")]
    InvalidDelimiter(char),

    #[error("infer_schema_rows must be at least 1 (use None to scan the whole file)")]
    InvalidInferSchemaRows,

    #[error("Missing token {0:?} contains the field delimiter")]
    TokenContainsDelimiter(String),
}

/// Builder for [`SessionConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    missing_tokens: Option<Vec<String>>,
    parse_dates: Option<bool>,
    delimiter: Option<u8>,
    infer_schema_rows: Option<Option<usize>>,
}

impl SessionConfigBuilder {
    /// Replace the set of tokens read as missing cells.
    pub fn missing_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_tokens = Some(tokens.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable date detection while loading.
    pub fn parse_dates(mut self, parse: bool) -> Self {
        self.parse_dates = Some(parse);
        self
    }

    /// Set the field delimiter.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Limit type inference to the first `rows` rows.
    pub fn infer_schema_rows(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_rows = Some(rows);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `SessionConfig` or an error if validation fails.
    pub fn build(self) -> Result<SessionConfig, ConfigValidationError> {
        let defaults = SessionConfig::default();
        let config = SessionConfig {
            missing_tokens: self.missing_tokens.unwrap_or(defaults.missing_tokens),
            parse_dates: self.parse_dates.unwrap_or(defaults.parse_dates),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            infer_schema_rows: self.infer_schema_rows.unwrap_or(defaults.infer_schema_rows),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert!(config.missing_tokens.iter().any(|t| t == "NA"));
        assert!(config.missing_tokens.iter().any(|t| t.is_empty()));
        assert!(config.parse_dates);
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.infer_schema_rows, None);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = SessionConfig::builder().build().unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = SessionConfig::builder()
            .missing_tokens(["", "?"])
            .parse_dates(false)
            .delimiter(b';')
            .infer_schema_rows(Some(500))
            .build()
            .unwrap();

        assert_eq!(config.missing_tokens, vec!["".to_string(), "?".to_string()]);
        assert!(!config.parse_dates);
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.infer_schema_rows, Some(500));
    }

    #[test]
    fn test_validation_rejects_quote_delimiter() {
        let result = SessionConfig::builder().delimiter(b'"').build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidDelimiter('"')
        ));
    }

    #[test]
    fn test_validation_rejects_zero_infer_rows() {
        let result = SessionConfig::builder().infer_schema_rows(Some(0)).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidInferSchemaRows
        ));
    }

    #[test]
    fn test_validation_rejects_token_with_delimiter() {
        let result = SessionConfig::builder().missing_tokens(["n,a"]).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::TokenContainsDelimiter(_)
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "missing_tokens": ["", "-"],
            "parse_dates": false,
            "delimiter": 59,
            "infer_schema_rows": 100
        }"#;

        let config: SessionConfig = serde_json::from_str(json).expect("frontend JSON");
        assert_eq!(config.missing_tokens.len(), 2);
        assert!(!config.parse_dates);
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.infer_schema_rows, Some(100));
    }
}
