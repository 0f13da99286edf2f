//! Imputation module for handling missing values.
//!
//! Every strategy of [`crate::types::MissingStrategy`] lives here: row
//! deletion and mean, median, mode or custom value fills.

mod statistical;

pub use statistical::StatisticalImputer;
