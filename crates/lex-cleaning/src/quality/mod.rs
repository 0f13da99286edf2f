//! Data quality analysis module.
//!
//! This module computes the quality report shown to the user after every
//! change: missing values, duplicate rows and whitespace anomalies.

mod analyzer;

pub use analyzer::QualityAnalyzer;
