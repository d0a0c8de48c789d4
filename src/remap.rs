//! Row remapping: apply a finalized header→field mapping to a raw table, coercing each
//! cell to its field's declared type.
//!
//! Remap is row-independent: a cell that fails coercion becomes [`Value::Invalid`] and
//! the rest of the row (and batch) proceeds. The only up-front rejections are structural
//! caller errors — mapping collisions and fields the schema does not declare.

use chrono::NaiveDate;

use crate::error::{ImportError, ImportResult};
use crate::types::{ColumnMapping, EntitySchema, FieldType, RawCell, RawTable, RecordSet, Value};

/// Remap raw rows into normalized records under `mapping`.
///
/// Rules:
///
/// - Output has exactly one record per input row, in input order; record `i` derives only
///   from row `i`.
/// - Fields no header maps to stay [`Value::Null`]; headers absent from the mapping are
///   dropped (they are not part of the target schema, by definition).
/// - Two headers targeting one field is a caller error
///   ([`ImportError::MappingCollision`]); the last-assigned value is never silently kept.
/// - A mapped field the schema does not declare is [`ImportError::UnknownField`].
pub fn remap_rows(
    table: &RawTable,
    mapping: &ColumnMapping,
    schema: &EntitySchema,
) -> ImportResult<RecordSet> {
    if let Some((field, headers)) = mapping.collisions().into_iter().next() {
        return Err(ImportError::MappingCollision { field, headers });
    }

    // Resolve (schema field index, table column index) per mapping entry up front.
    let mut projections: Vec<(usize, Option<usize>)> = Vec::with_capacity(mapping.len());
    for entry in mapping.entries() {
        let field_idx =
            schema
                .index_of(&entry.field)
                .ok_or_else(|| ImportError::UnknownField {
                    entity: schema.entity.as_str().to_string(),
                    field: entry.field.clone(),
                })?;
        // A mapped header missing from the table just yields Null for its field.
        projections.push((field_idx, table.column_index(&entry.header)));
    }

    let width = schema.fields.len();
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(table.row_count());
    for row_idx in 0..table.row_count() {
        let mut record = vec![Value::Null; width];
        for &(field_idx, col_idx) in &projections {
            let Some(col_idx) = col_idx else { continue };
            let cell = table.cell(row_idx, col_idx);
            record[field_idx] = coerce(cell, schema.fields[field_idx].field_type);
        }
        rows.push(record);
    }

    Ok(RecordSet::new(schema.clone(), rows))
}

/// Coerce a raw cell to a field type. Failures are the [`Value::Invalid`] sentinel.
pub fn coerce(cell: &RawCell, field_type: FieldType) -> Value {
    match cell {
        RawCell::Null => Value::Null,
        RawCell::Text(s) if s.trim().is_empty() => Value::Null,
        RawCell::Text(s) => coerce_text(s.trim(), field_type),
        RawCell::Number(n) => coerce_number(*n, field_type),
        RawCell::Bool(b) => match field_type {
            FieldType::Bool => Value::Bool(*b),
            FieldType::Text => Value::Text(b.to_string()),
            _ => Value::Invalid,
        },
    }
}

fn coerce_text(s: &str, field_type: FieldType) -> Value {
    match field_type {
        FieldType::Text => Value::Text(s.to_owned()),
        FieldType::Number => s.parse::<f64>().map(Value::Number).unwrap_or(Value::Invalid),
        FieldType::Date => parse_date(s).map(Value::Date).unwrap_or(Value::Invalid),
        FieldType::Bool => parse_bool(s).map(Value::Bool).unwrap_or(Value::Invalid),
    }
}

fn coerce_number(n: f64, field_type: FieldType) -> Value {
    match field_type {
        FieldType::Number => Value::Number(n),
        FieldType::Text => {
            // Excel hands integers back as floats; render 10.0 as "10".
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Value::Text(format!("{}", n as i64))
            } else {
                Value::Text(n.to_string())
            }
        }
        FieldType::Date => excel_serial_date(n).map(Value::Date).unwrap_or(Value::Invalid),
        FieldType::Bool => {
            if n == 0.0 {
                Value::Bool(false)
            } else if n == 1.0 {
                Value::Bool(true)
            } else {
                Value::Invalid
            }
        }
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Excel serial dates count days from the 1900 epoch (serial 1 = 1900-01-01, with the
/// historical off-by-two making 1899-12-30 the day-zero anchor).
fn excel_serial_date(n: f64) -> Option<NaiveDate> {
    if n.fract() != 0.0 || !(1.0..=2_958_465.0).contains(&n) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(chrono::Days::new(n as u64))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}
