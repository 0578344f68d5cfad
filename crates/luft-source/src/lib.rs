//! Row sources: CSV and JSON bodies to raw rows
//!
//! Both formats normalize to the same `RawRow` shape before reaching the
//! ingestion core. Only container-level problems (unreadable file, broken
//! CSV framing, invalid JSON) error out here; row-level noise is the
//! core's drop policy to handle.

pub mod csv;
pub mod json;

pub use crate::csv::parse_csv;
pub use crate::json::parse_json;

use std::path::Path;

use luft_core::RawRow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON array of row objects")]
    NotAnArray,

    #[error("Unsupported source format: {0:?}")]
    UnsupportedFormat(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// A parsed row set: the column order of the source plus the rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Read a row file from disk, dispatching on its extension.
pub fn load_rows(path: impl AsRef<Path>) -> SourceResult<RowSet> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => parse_csv(&text),
        Some("json") => parse_json(&text),
        other => Err(SourceError::UnsupportedFormat(
            other.unwrap_or_default().to_string(),
        )),
    }
}
