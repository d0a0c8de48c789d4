#![cfg(feature = "excel")]

//! Excel/workbook decoding implementation.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use crate::error::{ImportError, ImportResult};
use crate::types::{RawCell, RawTable};

use super::NamedTable;

/// Decode sheets from a workbook (`.xlsx`, `.xls`, `.ods`, etc.) into raw tables.
///
/// - If `sheet_names` is `None`, decodes the first sheet only.
/// - If `sheet_names` is `Some(&[...])`, decodes those sheets in the given order.
///
/// Each sheet yields its own [`NamedTable`]; sheets are logical tables and are never
/// concatenated here.
pub fn decode_excel_from_path(
    path: impl AsRef<Path>,
    sheet_names: Option<&[&str]>,
) -> ImportResult<Vec<NamedTable>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheets: Vec<String> = match sheet_names {
        Some(names) => names.iter().map(|s| s.to_string()).collect(),
        None => workbook.sheet_names().first().cloned().into_iter().collect(),
    };
    if sheets.is_empty() {
        return Err(ImportError::Decode {
            message: "workbook has no sheets".to_string(),
        });
    }

    let mut out = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let range = workbook.worksheet_range(&sheet)?;
        let table = decode_sheet_range(&range).map_err(|e| wrap_with_sheet(&sheet, e))?;
        out.push(NamedTable { name: sheet, table });
    }
    Ok(out)
}

/// Decode every sheet of a workbook, in workbook order.
pub fn decode_excel_workbook_from_path(path: impl AsRef<Path>) -> ImportResult<Vec<NamedTable>> {
    let mut workbook = open_workbook_auto(&path)?;
    let sheets = workbook.sheet_names().to_vec();
    drop(workbook);
    let refs: Vec<&str> = sheets.iter().map(|s| s.as_str()).collect();
    decode_excel_from_path(path, Some(refs.as_slice()))
}

fn wrap_with_sheet(sheet: &str, err: ImportError) -> ImportError {
    match err {
        ImportError::Decode { message } => ImportError::Decode {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

/// Decode one sheet range: the first non-empty row is the header row, everything below it
/// is data. Columns whose header cell is blank are dropped.
pub(crate) fn decode_sheet_range(range: &calamine::Range<Data>) -> ImportResult<RawTable> {
    let mut header_row_idx: Option<usize> = None;
    let mut headers: Vec<(usize, String)> = Vec::new();

    for (idx0, row) in range.rows().enumerate() {
        if row.iter().any(|c| !matches!(c, Data::Empty)) {
            header_row_idx = Some(idx0);
            headers = row
                .iter()
                .enumerate()
                .filter_map(|(col, cell)| {
                    let name = cell_to_header_string(cell);
                    let name = name.trim();
                    (!name.is_empty()).then(|| (col, name.to_string()))
                })
                .collect();
            break;
        }
    }

    let header_row_idx = header_row_idx.ok_or_else(|| ImportError::Decode {
        message: "sheet has no non-empty rows (no header row found)".to_string(),
    })?;

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    for (idx0, row) in range.rows().enumerate() {
        if idx0 <= header_row_idx {
            continue;
        }
        let out_row = headers
            .iter()
            .map(|&(col, _)| convert_cell(row.get(col).unwrap_or(&Data::Empty)))
            .collect();
        rows.push(out_row);
    }

    Ok(RawTable::new(
        headers.into_iter().map(|(_, name)| name).collect(),
        rows,
    ))
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> RawCell {
    match c {
        Data::Empty => RawCell::Null,
        Data::String(s) => {
            if s.trim().is_empty() {
                RawCell::Null
            } else {
                RawCell::Text(s.clone())
            }
        }
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::Bool(b) => RawCell::Bool(*b),
        // Serial value, so a Date field can coerce it downstream.
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(_) => RawCell::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_from(cells: &[(u32, u32, Data)]) -> calamine::Range<Data> {
        let max_row = cells.iter().map(|(r, _, _)| *r).max().unwrap_or(0);
        let max_col = cells.iter().map(|(_, c, _)| *c).max().unwrap_or(0);
        let mut range = calamine::Range::new((0, 0), (max_row, max_col));
        for (r, c, v) in cells {
            range.set_value((*r, *c), v.clone());
        }
        range
    }

    #[test]
    fn first_non_empty_row_becomes_headers() {
        let range = range_from(&[
            // Row 0 entirely empty; headers start at row 1.
            (1, 0, Data::String("Name".into())),
            (1, 1, Data::String("Amount".into())),
            (2, 0, Data::String("Ada".into())),
            (2, 1, Data::Float(10.0)),
        ]);
        let table = decode_sheet_range(&range).unwrap();
        assert_eq!(table.headers, vec!["Name", "Amount"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0][1], RawCell::Number(10.0));
    }

    #[test]
    fn blank_header_columns_are_dropped() {
        let range = range_from(&[
            (0, 0, Data::String("Name".into())),
            (0, 2, Data::String("Amount".into())),
            (1, 0, Data::String("Ada".into())),
            (1, 1, Data::String("stray".into())),
            (1, 2, Data::Float(10.0)),
        ]);
        let table = decode_sheet_range(&range).unwrap();
        assert_eq!(table.headers, vec!["Name", "Amount"]);
        assert_eq!(table.rows[0], vec![
            RawCell::Text("Ada".into()),
            RawCell::Number(10.0)
        ]);
    }

    #[test]
    fn empty_sheet_is_a_decode_error() {
        let range = calamine::Range::<Data>::new((0, 0), (0, 0));
        let err = decode_sheet_range(&range).unwrap_err();
        assert!(err.to_string().contains("no header row"));
    }

    #[test]
    fn numeric_headers_are_stringified() {
        let range = range_from(&[
            (0, 0, Data::Float(2024.0)),
            (1, 0, Data::String("x".into())),
        ]);
        let table = decode_sheet_range(&range).unwrap();
        assert_eq!(table.headers, vec!["2024"]);
    }
}
