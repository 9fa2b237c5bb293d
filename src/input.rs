//! Loading the query template and the tabular input.
//!
//! The first CSV record names the variables; every following record is one
//! row to execute. Cells and header names are trimmed and always kept as
//! strings. Rows of the wrong width are read as-is and rejected later, per
//! row, when they are bound.

use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::batch::Row;
use crate::error::{BatchError, Result};
use crate::template::Template;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: char = ',';

/// Header and data rows read from a CSV source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

/// Reads a query template from a file.
pub fn load_template(path: &Path) -> Result<Template> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| BatchError::load(format!("Failed to read {}: {}", path.display(), e)))?;

    let template = Template::new(text);
    debug!(
        "Template {} declares {:?}",
        path.display(),
        template.required_variables()
    );
    Ok(template)
}

/// Reads a CSV file into a [`Table`].
pub fn load_table(path: &Path, delimiter: char) -> Result<Table> {
    let file = std::fs::File::open(path)
        .map_err(|e| BatchError::load(format!("Failed to read {}: {}", path.display(), e)))?;

    let table = parse_table(file, delimiter)
        .map_err(|e| match e {
            BatchError::Load(msg) => BatchError::load(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

    debug!(
        "Loaded {} row(s) with columns {:?} from {}",
        table.rows.len(),
        table.headers,
        path.display()
    );
    Ok(table)
}

/// Parses CSV data into a [`Table`].
pub fn parse_table<R: Read>(reader: R, delimiter: char) -> Result<Table> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            BatchError::config(format!(
                "Delimiter must be a single ASCII character, got {:?}",
                delimiter
            ))
        })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| BatchError::load(format!("Failed to read CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    validate_headers(&headers)?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| BatchError::load(format!("Failed to read CSV row {}: {}", index + 1, e)))?;
        let row = Row::new(index, record.iter().map(str::to_string).collect());
        rows.push(match record.position() {
            Some(position) => row.at_line(position.line()),
            None => row,
        });
    }

    Ok(Table { headers, rows })
}

/// Rejects headers that cannot name variables unambiguously.
fn validate_headers(headers: &[String]) -> Result<()> {
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(BatchError::input("CSV input has no header row"));
    }

    if let Some(position) = headers.iter().position(String::is_empty) {
        return Err(BatchError::input(format!(
            "CSV header column {} is empty",
            position + 1
        )));
    }

    for (i, name) in headers.iter().enumerate() {
        if headers[..i].contains(name) {
            return Err(BatchError::input(format!(
                "CSV header names '{}' more than once",
                name
            )));
        }
    }

    Ok(())
}
