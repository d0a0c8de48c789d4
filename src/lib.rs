//! `entity-import` is a small library for turning spreadsheet-like files (CSV, and with
//! the `excel` feature XLSX/XLS/ODS) into normalized, typed records — by inferring which
//! *entity type* each table represents from its column headers.
//!
//! The primary entrypoints are [`import::parse_path`] (one file, pure) and
//! [`import::ImportSession`] (many files, with a pending-mapping queue and error list).
//!
//! ## How a file flows through
//!
//! 1. **Decode** ([`decode`]): the file becomes one or more [`types::RawTable`]s —
//!    a header row plus untyped cells.
//! 2. **Match** ([`matcher`]): every [`types::EntitySchema`] in the
//!    [`types::SchemaRegistry`] is scored against the headers. Full coverage of a
//!    schema's required fields resolves the entity and the header→field mapping; anything
//!    less produces a [`import::MappingRequest`] for a user to complete.
//! 3. **Remap** ([`remap`]): with a finalized [`types::ColumnMapping`], each row is
//!    copied into a typed record, coercing cells per field type. A cell that will not
//!    coerce becomes [`types::Value::Invalid`]; it never aborts the batch.
//!
//! ## Quick example: match and remap
//!
//! ```rust
//! use entity_import::matcher::{HeaderMatcher, MatchResult};
//! use entity_import::remap::remap_rows;
//! use entity_import::types::{
//!     EntitySchema, EntityType, FieldSpec, FieldType, RawCell, RawTable, SchemaRegistry,
//!     Value,
//! };
//!
//! # fn main() -> Result<(), entity_import::ImportError> {
//! let donation = EntitySchema::new(
//!     EntityType::new("donation"),
//!     vec![
//!         FieldSpec::required("donorName", FieldType::Text).with_aliases(["Name"]),
//!         FieldSpec::required("donorEmail", FieldType::Text).with_aliases(["Email"]),
//!         FieldSpec::required("amount", FieldType::Number).with_aliases(["Amount"]),
//!     ],
//! );
//! let registry = SchemaRegistry::new(vec![donation])?;
//!
//! let table = RawTable::new(
//!     vec!["Name".into(), "Email".into(), "Amount".into()],
//!     vec![vec![
//!         RawCell::Text("A".into()),
//!         RawCell::Text("a@x.com".into()),
//!         RawCell::Text("10".into()),
//!     ]],
//! );
//!
//! let matcher = HeaderMatcher::new(&registry);
//! let MatchResult::Resolved { entity, mapping } = matcher.match_headers(&table.headers)
//! else {
//!     unreachable!("all required aliases are present");
//! };
//!
//! let records = remap_rows(&table, &mapping, registry.get(&entity).unwrap())?;
//! assert_eq!(records.value(0, "amount"), Some(&Value::Number(10.0)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Quick example: a session over files
//!
//! ```no_run
//! use entity_import::import::ImportSession;
//! use entity_import::types::{EntitySchema, EntityType, FieldSpec, FieldType, SchemaRegistry};
//!
//! # fn main() -> Result<(), entity_import::ImportError> {
//! let registry = SchemaRegistry::new(vec![EntitySchema::new(
//!     EntityType::new("contact"),
//!     vec![
//!         FieldSpec::required("name", FieldType::Text),
//!         FieldSpec::required("email", FieldType::Text),
//!     ],
//! )])?;
//!
//! let mut session = ImportSession::new(registry);
//! let imported = session.ingest_path("contacts.csv");
//! for table in &imported {
//!     println!("{}: {} rows of {}", table.source, table.records.row_count(), table.entity);
//! }
//! // Tables the matcher could not fully resolve wait here, one at a time:
//! if let Some(request) = session.pending_request() {
//!     println!("needs mapping: {} (guess: {})", request.source, request.entity);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`decode`]: CSV/Excel decoding into raw tables
//! - [`matcher`]: header scoring and entity inference
//! - [`remap`]: mapping validation and row normalization
//! - [`import`]: per-file orchestration, sessions, observers
//! - [`types`]: schemas, registries, mappings, tables, records
//! - [`error`]: error types used across the pipeline

pub mod decode;
pub mod error;
pub mod import;
pub mod matcher;
pub mod remap;
pub mod types;

pub use error::{ImportError, ImportResult};
