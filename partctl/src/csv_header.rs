//! Reads the header record of a CSV file.

use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse header record: {0}")]
    Parse(#[from] csv::Error),

    #[error("file has no records")]
    Empty,
}

/// Parse only the first record of the file at `path` and return its fields.
///
/// Uses standard comma-delimited CSV with double-quote quoting. Later rows are never read, so
/// their field counts are not checked. Blocking: call from a blocking context.
pub fn read_header(path: &Path) -> Result<Vec<String>, HeaderError> {
    let file = File::open(path).map_err(|source| HeaderError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new().has_headers(false).flexible(true).from_reader(file);

    match reader.records().next() {
        Some(record) => Ok(record?.iter().map(str::to_string).collect()),
        None => Err(HeaderError::Empty),
    }
}
