//! CSV text body -> raw rows

use luft_core::{FieldValue, RawRow};

use crate::{RowSet, SourceResult};

/// Parse a CSV text body. The header row defines column order; every
/// cell arrives as text and stays text, since numeric interpretation
/// happens at the core's field resolvers. Short records pad with empty
/// cells so each row carries the full column set.
pub fn parse_csv(text: &str) -> SourceResult<RowSet> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row = RawRow::new();
        for (idx, header) in headers.iter().enumerate() {
            let cell = record.get(idx).unwrap_or("");
            row.insert(header.clone(), FieldValue::Text(cell.to_string()));
        }
        rows.push(row);
    }

    Ok(RowSet { headers, rows })
}
