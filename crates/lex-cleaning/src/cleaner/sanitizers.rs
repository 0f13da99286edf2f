//! Whitespace sanitization for text columns.

use crate::error::Result;
use crate::utils::trim_string_series;
use polars::prelude::*;
use tracing::debug;

/// Strip leading and trailing whitespace from every string column.
///
/// Non-string columns are left untouched. Cells left blank, or equal to one
/// of `missing_tokens`, become missing. Returns the new table and the number
/// of cells whose value changed.
pub(crate) fn trim_all_string_columns(
    df: &DataFrame,
    missing_tokens: &[String],
) -> Result<(DataFrame, usize)> {
    let mut out = df.clone();
    let mut total = 0;

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        if series.dtype() != &DataType::String {
            continue;
        }

        let (trimmed, changed) = trim_string_series(series, missing_tokens)?;
        if changed > 0 {
            debug!("Trimmed {} cells in '{}'", changed, series.name());
            out.replace(series.name().as_str(), trimmed)?;
            total += changed;
        }
    }

    Ok((out, total))
}
