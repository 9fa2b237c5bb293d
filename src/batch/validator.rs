//! Pre-flight check that the header covers every template variable.

use crate::error::{BatchError, Result};

/// Verifies that every required variable has a column in `headers`.
///
/// Missing names are reported in template order.
pub fn ensure_all_variables_set(required: &[String], headers: &[String]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !headers.contains(name))
        .cloned()
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(BatchError::BindingCoverage {
        missing,
        required: required.to_vec(),
        supplied: headers.to_vec(),
    })
}
