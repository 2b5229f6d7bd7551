use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::info;

use crate::error::{ListwashError, Result};

/// A CSV file read into memory with standardized headers.
///
/// Headers are trimmed and lower-cased. Cells keep their raw text: a cell is
/// `None` when the source field was absent or zero-length, so downstream
/// stages can tell a missing value from a whitespace-only one.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Position of a standardized column name, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Names from `required` that have no matching standardized header.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .copied()
            .filter(|&name| self.column(name).is_none())
            .map(str::to_string)
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Reads a CSV file into a `RawTable`.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let table = parse_table(file)?;
    info!("Read {} rows from {}", table.row_count(), path.display());
    Ok(table)
}

/// Parses CSV content into a `RawTable`.
///
/// Records may be shorter or longer than the header row; short records are
/// padded with absent cells so every row aligns with the headers. No
/// trimming happens here: whitespace semantics belong to the normalizer.
pub fn parse_table(reader: impl Read) -> Result<RawTable> {
    let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let row = (0..headers.len())
            .map(|idx| match record.get(idx) {
                Some(cell) if !cell.is_empty() => Some(cell.to_string()),
                _ => None,
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Reads the category lookup table and checks its required columns.
pub fn read_lookup(path: &Path) -> Result<RawTable> {
    let table = read_table(path)?;
    let missing = table.missing_columns(&["category", "segment"]);
    if !missing.is_empty() {
        return Err(ListwashError::MissingColumns(missing));
    }
    Ok(table)
}
