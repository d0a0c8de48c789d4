//! CSV decoding implementation.

use std::path::Path;

use crate::error::{ImportError, ImportResult};
use crate::types::{RawCell, RawTable};

/// Decode a CSV file into a [`RawTable`].
///
/// Rules:
///
/// - The first record is the header row; a file with no records at all is a decode error.
/// - Every cell decodes to [`RawCell::Text`]; empty cells become [`RawCell::Null`].
/// - No schema is consulted here — header interpretation is the matcher's job.
pub fn decode_csv_from_path(path: impl AsRef<Path>) -> ImportResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    decode_csv_from_reader(&mut rdr)
}

/// Decode CSV data from an existing CSV reader.
pub fn decode_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> ImportResult<RawTable> {
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportError::Decode {
            message: "csv input has no header row".to_string(),
        });
    }

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|raw| {
                if raw.is_empty() {
                    RawCell::Null
                } else {
                    RawCell::Text(raw.to_owned())
                }
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable::new(headers, rows))
}
