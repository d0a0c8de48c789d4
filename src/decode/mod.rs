//! File decoding: turn a CSV or Excel file into one or more [`RawTable`]s.
//!
//! Most callers should use [`decode_from_path`], which auto-detects the format from the
//! file extension (or takes an explicit override via [`DecodeOptions`]). Format-specific
//! functions live under [`csv`] and (feature `excel`) [`excel`].
//!
//! Decoding knows nothing about entity schemas; it only produces headers and untyped
//! cells for the matcher and remapper to interpret.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;

use std::path::Path;

use crate::error::{ImportError, ImportResult};
use crate::types::RawTable;

/// Supported decode formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFormat {
    /// Comma-separated values.
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl DecodeFormat {
    /// Parse a decode format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// How to choose sheet(s) when decoding an Excel workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// Decode the first sheet (default).
    #[default]
    First,
    /// Decode a single named sheet.
    Sheet(String),
    /// Decode every sheet, one table per sheet.
    AllSheets,
}

/// Options controlling decoding behavior. Use [`Default`] for common cases.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<DecodeFormat>,
    /// Excel-specific sheet selection.
    pub sheet_selection: SheetSelection,
}

/// A decoded logical table with a human-readable source name.
///
/// CSV files yield one table named after the file stem; workbooks yield one per selected
/// sheet, named after the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTable {
    /// Source name for error messages and UI display.
    pub name: String,
    /// The decoded table.
    pub table: RawTable,
}

/// Decode a file into its logical tables.
///
/// - If `options.format` is `None`, the format is inferred from the file extension; a
///   missing or unrecognized extension is a [`ImportError::Decode`] error.
/// - A CSV file always yields exactly one table.
pub fn decode_from_path(
    path: impl AsRef<Path>,
    options: &DecodeOptions,
) -> ImportResult<Vec<NamedTable>> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    match format {
        DecodeFormat::Csv => {
            let table = csv::decode_csv_from_path(path)?;
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("csv")
                .to_string();
            Ok(vec![NamedTable { name, table }])
        }
        DecodeFormat::Excel => decode_excel_dispatch(path, &options.sheet_selection),
    }
}

fn infer_format_from_path(path: &Path) -> ImportResult<DecodeFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ImportError::Decode {
            message: format!("cannot infer format: path has no extension ({})", path.display()),
        })?;

    DecodeFormat::from_extension(ext).ok_or_else(|| ImportError::Decode {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

fn decode_excel_dispatch(path: &Path, sel: &SheetSelection) -> ImportResult<Vec<NamedTable>> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, sel);

    #[cfg(feature = "excel")]
    {
        match sel {
            SheetSelection::First => excel::decode_excel_from_path(path, None),
            SheetSelection::Sheet(name) => {
                excel::decode_excel_from_path(path, Some(&[name.as_str()]))
            }
            SheetSelection::AllSheets => excel::decode_excel_workbook_from_path(path),
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(ImportError::Decode {
            message: "excel decoding not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(DecodeFormat::from_extension("CSV"), Some(DecodeFormat::Csv));
        assert_eq!(DecodeFormat::from_extension("xlsx"), Some(DecodeFormat::Excel));
        assert_eq!(DecodeFormat::from_extension("ods"), Some(DecodeFormat::Excel));
        assert_eq!(DecodeFormat::from_extension("txt"), None);
    }

    #[test]
    fn unknown_extension_is_a_decode_error() {
        let err = decode_from_path("notes.txt", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, ImportError::Decode { .. }));
    }

    #[test]
    fn missing_extension_is_a_decode_error() {
        let err = decode_from_path("headerless", &DecodeOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no extension"));
    }
}
