//! Binding a data row to the header's variable names.

use super::{Binding, Row};
use crate::error::{BatchError, Result};

/// Pairs each header name with the cell at the same position.
///
/// A row whose width differs from the header is rejected with
/// [`BatchError::RowShape`]; cells are never padded or dropped.
pub fn bind_row(headers: &[String], row: Row) -> Result<Binding> {
    if row.cells.len() != headers.len() {
        return Err(BatchError::RowShape {
            row: row.number(),
            expected: headers.len(),
            actual: row.cells.len(),
        });
    }

    Ok(headers.iter().cloned().zip(row.cells).collect())
}
