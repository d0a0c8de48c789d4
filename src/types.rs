//! Core data model types for the import pipeline.
//!
//! Decoders produce a [`RawTable`] (headers + untyped cells). The matcher relates its
//! headers to an [`EntitySchema`] from a [`SchemaRegistry`] via a [`ColumnMapping`], and
//! the remapper turns the raw rows into a typed [`RecordSet`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};

/// A semantic category of data row (e.g. `donation`, `contact`).
///
/// The closed set of entity types is defined by the [`SchemaRegistry`]; the one value that
/// always exists is the [`EntityType::unknown`] sentinel used when no schema matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    /// Create an entity type from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The sentinel returned when header matching found no candidate schema.
    pub fn unknown() -> Self {
        Self("unknown".to_string())
    }

    /// Returns `true` for the [`EntityType::unknown`] sentinel.
    pub fn is_unknown(&self) -> bool {
        self.0 == "unknown"
    }

    /// Entity name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical field type, which doubles as the value-coercion rule applied during remap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// UTF-8 text; remap trims surrounding whitespace.
    Text,
    /// 64-bit float; remap parses numeric text.
    Number,
    /// Calendar date; remap parses common date spellings and Excel serial numbers.
    Date,
    /// Boolean; remap accepts true/false/1/0/yes/no.
    Bool,
}

/// A single named field in an [`EntitySchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Canonical field name (the key in normalized records).
    pub name: String,
    /// Field type / coercion rule.
    pub field_type: FieldType,
    /// Required fields drive the match score; optional fields only break ties.
    pub required: bool,
    /// Known alternate header spellings. The field name itself always counts as an alias.
    pub aliases: Vec<String>,
}

impl FieldSpec {
    /// Create a required field with no extra aliases.
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            aliases: Vec::new(),
        }
    }

    /// Create an optional field with no extra aliases.
    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            aliases: Vec::new(),
        }
    }

    /// Add alternate header spellings.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }
}

/// One entity's schema: its type plus an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Entity type this schema describes.
    pub entity: EntityType,
    /// Ordered list of fields. Order determines column order in a [`RecordSet`].
    pub fields: Vec<FieldSpec>,
}

impl EntitySchema {
    /// Create a schema from fields.
    pub fn new(entity: EntityType, fields: Vec<FieldSpec>) -> Self {
        Self { entity, fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of required fields.
    pub fn required_count(&self) -> usize {
        self.fields.iter().filter(|f| f.required).count()
    }
}

/// Ordered, read-only collection of entity schemas.
///
/// Declaration order matters: the matcher uses it as the final tie-break, so results are
/// stable across runs. Built once at startup and shared immutably; pass a reference into
/// the matcher rather than going through global state.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<EntitySchema>,
}

impl SchemaRegistry {
    /// Build a registry, validating the schema set.
    ///
    /// Rejected configurations:
    /// - two schemas with the same entity name
    /// - a schema with zero required fields (it would match everything at score 0/0)
    /// - two fields of one schema sharing a normalized alias
    pub fn new(schemas: Vec<EntitySchema>) -> ImportResult<Self> {
        let mut seen_entities: Vec<&str> = Vec::new();
        for schema in &schemas {
            let name = schema.entity.as_str();
            if schema.entity.is_unknown() {
                return Err(ImportError::InvalidRegistry {
                    message: "'unknown' is reserved as the no-match sentinel".to_string(),
                });
            }
            if seen_entities.contains(&name) {
                return Err(ImportError::InvalidRegistry {
                    message: format!("duplicate entity '{name}'"),
                });
            }
            seen_entities.push(name);

            if schema.required_count() == 0 {
                return Err(ImportError::InvalidRegistry {
                    message: format!("entity '{name}' has no required fields"),
                });
            }

            let mut seen_aliases: Vec<String> = Vec::new();
            for field in &schema.fields {
                for alias in std::iter::once(&field.name).chain(field.aliases.iter()) {
                    let norm = normalize_header(alias);
                    if norm.is_empty() {
                        return Err(ImportError::InvalidRegistry {
                            message: format!(
                                "entity '{name}': alias '{alias}' normalizes to nothing"
                            ),
                        });
                    }
                    if seen_aliases.contains(&norm) {
                        return Err(ImportError::InvalidRegistry {
                            message: format!(
                                "entity '{name}': alias '{alias}' is claimed by two fields"
                            ),
                        });
                    }
                    seen_aliases.push(norm);
                }
            }
        }
        Ok(Self { schemas })
    }

    /// Schemas in declaration order.
    pub fn schemas(&self) -> &[EntitySchema] {
        &self.schemas
    }

    /// Look up a schema by entity type.
    pub fn get(&self, entity: &EntityType) -> Option<&EntitySchema> {
        self.schemas.iter().find(|s| &s.entity == entity)
    }
}

/// Normalize a header for alias comparison: case-fold and drop everything that is not
/// alphanumeric, so `"Donor Name"`, `"donor_name"`, and `" DONOR-NAME "` all compare equal.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// An untyped cell as produced by a decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// Empty cell.
    Null,
    /// Text cell (all CSV cells decode to this).
    Text(String),
    /// Numeric cell (Excel).
    Number(f64),
    /// Boolean cell (Excel).
    Bool(bool),
}

/// A decoded table: one header row plus row-major untyped cells.
///
/// `rows[i][j]` is the cell under `headers[j]`. Rows shorter than the header row are
/// padded with [`RawCell::Null`] on access, never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Row-major cell storage.
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Create a table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the column index of an exact header, if present.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at `(row, col)`, treating missing trailing cells as [`RawCell::Null`].
    pub fn cell(&self, row: usize, col: usize) -> &RawCell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&RawCell::Null)
    }
}

/// One entry of a [`ColumnMapping`]: an observed header assigned to a schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Observed header string, exactly as it appears in the file.
    pub header: String,
    /// Target field name in the entity schema.
    pub field: String,
}

/// A header-to-field assignment, partial or complete.
///
/// Entries keep the order headers were inserted in (input header order for auto-detected
/// mappings), which keeps downstream UI rendering deterministic. Headers absent from the
/// mapping are unmapped by definition; their columns are dropped during remap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    entries: Vec<MappingEntry>,
}

impl ColumnMapping {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from `(header, field)` pairs, preserving order.
    pub fn from_pairs<I, H, F>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (H, F)>,
        H: Into<String>,
        F: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(header, field)| MappingEntry {
                    header: header.into(),
                    field: field.into(),
                })
                .collect(),
        }
    }

    /// Append an assignment. Does not overwrite: a second entry for the same header is
    /// kept as-is and caught later by [`ColumnMapping::collisions`] if both target one field.
    pub fn insert(&mut self, header: impl Into<String>, field: impl Into<String>) {
        self.entries.push(MappingEntry {
            header: header.into(),
            field: field.into(),
        });
    }

    /// Field assigned to `header`, if any.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.header == header)
            .map(|e| e.field.as_str())
    }

    /// Whether `field` is the target of any entry.
    pub fn maps_to(&self, field: &str) -> bool {
        self.entries.iter().any(|e| e.field == field)
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no assignments.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields targeted by more than one header, with the offending headers.
    ///
    /// A finalized mapping must have none of these before remap runs; the duplicate
    /// targets are a caller error, never resolved by keeping the last value.
    pub fn collisions(&self) -> Vec<(String, Vec<String>)> {
        let mut out: Vec<(String, Vec<String>)> = Vec::new();
        for entry in &self.entries {
            match out.iter_mut().find(|(field, _)| field == &entry.field) {
                Some((_, headers)) => headers.push(entry.header.clone()),
                None => out.push((entry.field.clone(), vec![entry.header.clone()])),
            }
        }
        out.retain(|(_, headers)| headers.len() > 1);
        out
    }
}

/// A typed, normalized value in a [`RecordSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Missing/empty value, or a field no header was mapped to.
    Null,
    /// Coercion-failure sentinel: the cell had content that could not be converted to the
    /// field's type. Recorded per cell; never aborts the row or the batch.
    Invalid,
    /// Trimmed UTF-8 text.
    Text(String),
    /// 64-bit float.
    Number(f64),
    /// Calendar date.
    Date(NaiveDate),
    /// Boolean.
    Bool(bool),
}

/// Normalized output of a remap: the target schema plus rows aligned to its field order.
///
/// `rows[i][j]` is the value of `schema.fields[j]` for input row `i`. Row order and count
/// always mirror the raw input (rows are never merged, split, or dropped).
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    /// Schema describing record shape.
    pub schema: EntitySchema,
    /// Row-major value storage, one record per input row.
    pub rows: Vec<Vec<Value>>,
}

impl RecordSet {
    /// Create a record set from schema and rows.
    pub fn new(schema: EntitySchema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of records.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Value of `field` in record `row`, if the schema declares the field.
    pub fn value(&self, row: usize, field: &str) -> Option<&Value> {
        let idx = self.schema.index_of(field)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_header_folds_case_and_punctuation() {
        assert_eq!(normalize_header("Donor Name"), "donorname");
        assert_eq!(normalize_header("donor_name"), "donorname");
        assert_eq!(normalize_header("  DONOR-NAME  "), "donorname");
        assert_eq!(normalize_header("E-mail Address"), "emailaddress");
        assert_eq!(normalize_header("___"), "");
    }

    #[test]
    fn mapping_preserves_insertion_order() {
        let mut m = ColumnMapping::new();
        m.insert("B", "beta");
        m.insert("A", "alpha");
        let headers: Vec<&str> = m.entries().iter().map(|e| e.header.as_str()).collect();
        assert_eq!(headers, vec!["B", "A"]);
    }

    #[test]
    fn mapping_reports_duplicate_targets() {
        let m = ColumnMapping::from_pairs([("Name", "donorName"), ("Full Name", "donorName")]);
        let collisions = m.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].0, "donorName");
        assert_eq!(collisions[0].1, vec!["Name", "Full Name"]);
    }

    #[test]
    fn registry_rejects_duplicate_entities() {
        let schema = || {
            EntitySchema::new(
                EntityType::new("donation"),
                vec![FieldSpec::required("amount", FieldType::Number)],
            )
        };
        let err = SchemaRegistry::new(vec![schema(), schema()]).unwrap_err();
        assert!(err.to_string().contains("duplicate entity"));
    }

    #[test]
    fn registry_rejects_schema_without_required_fields() {
        let schema = EntitySchema::new(
            EntityType::new("note"),
            vec![FieldSpec::optional("text", FieldType::Text)],
        );
        let err = SchemaRegistry::new(vec![schema]).unwrap_err();
        assert!(err.to_string().contains("no required fields"));
    }

    #[test]
    fn registry_rejects_alias_claimed_twice() {
        let schema = EntitySchema::new(
            EntityType::new("contact"),
            vec![
                FieldSpec::required("name", FieldType::Text).with_aliases(["full name"]),
                FieldSpec::optional("displayName", FieldType::Text).with_aliases(["Full-Name"]),
            ],
        );
        let err = SchemaRegistry::new(vec![schema]).unwrap_err();
        assert!(err.to_string().contains("claimed by two fields"));
    }

    #[test]
    fn registry_reserves_unknown() {
        let schema = EntitySchema::new(
            EntityType::unknown(),
            vec![FieldSpec::required("x", FieldType::Text)],
        );
        assert!(SchemaRegistry::new(vec![schema]).is_err());
    }
}
