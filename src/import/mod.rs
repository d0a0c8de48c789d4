//! Import orchestration: decode → match → remap, plus the stateful session layer.
//!
//! [`parse_path`] is the pure per-file pipeline: it decodes a file into logical tables
//! and, per table, either remaps immediately (headers matched a schema in full) or hands
//! back a [`MappingRequest`] carrying the raw rows for a later, user-confirmed remap.
//!
//! [`session::ImportSession`] wraps it with multi-file state: a FIFO queue of pending
//! mapping requests surfaced one at a time, a per-file error list, and observer
//! callbacks.

pub mod observability;
pub mod session;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decode::{DecodeOptions, decode_from_path};
use crate::error::ImportResult;
use crate::matcher::{HeaderMatcher, MatchResult};
use crate::remap::remap_rows;
use crate::types::{ColumnMapping, EntityType, RawTable, RecordSet, SchemaRegistry};

pub use observability::{CompositeObserver, ImportObserver, StdErrObserver};
pub use session::{FileError, ImportSession, ImportedTable};

/// A suspended import awaiting user confirmation of its header mapping.
///
/// This is data, not an error: it is what the manual-mapping UI renders. The raw rows
/// travel separately (see [`ParseResult::NeedsMapping`]) so the request itself stays
/// cheap to serialize across a UI boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRequest {
    /// Source name (file stem or sheet name) for display.
    pub source: String,
    /// Best-guess entity, or [`EntityType::unknown`] when nothing matched.
    pub entity: EntityType,
    /// Partial mapping found so far; required fields it misses are for the user to fill.
    pub mapping: ColumnMapping,
    /// All observed headers, in file order, for the UI to offer.
    pub headers: Vec<String>,
}

/// Outcome of parsing one logical table.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    /// Headers matched a schema in full; rows are already normalized.
    Parsed {
        /// Source name (file stem or sheet name).
        source: String,
        /// Matched entity type.
        entity: EntityType,
        /// Normalized records.
        records: RecordSet,
    },
    /// Matching was ambiguous or incomplete. `rows` carries the raw table unmodified so
    /// the eventual user-confirmed mapping can remap it.
    NeedsMapping {
        /// The request to surface to the user.
        request: MappingRequest,
        /// Raw rows, untouched.
        rows: RawTable,
    },
}

/// Parse one file: decode it and run header matching (and, where resolved, remapping)
/// over every logical table it contains.
///
/// Returns one [`ParseResult`] per table — a single CSV yields exactly one; a workbook
/// yields one per selected sheet. Decode failures (unreadable format, empty file,
/// unknown extension) and mapping collisions inside an auto-resolved mapping are
/// terminal for the file and surface as `Err`; callers processing several files must
/// report each file's error independently rather than stopping the batch.
pub fn parse_path(
    path: impl AsRef<Path>,
    registry: &SchemaRegistry,
    options: &DecodeOptions,
) -> ImportResult<Vec<ParseResult>> {
    let tables = decode_from_path(path, options)?;
    let matcher = HeaderMatcher::new(registry);

    let mut results = Vec::with_capacity(tables.len());
    for named in tables {
        results.push(parse_table(named.name, named.table, registry, &matcher)?);
    }
    Ok(results)
}

/// Parse one already-decoded table. Exposed for callers with their own decoders.
pub fn parse_table(
    source: String,
    table: RawTable,
    registry: &SchemaRegistry,
    matcher: &HeaderMatcher<'_>,
) -> ImportResult<ParseResult> {
    match matcher.match_headers(&table.headers) {
        MatchResult::Resolved { entity, mapping } => {
            // Registry lookup cannot fail here: Resolved only ever names a registered
            // entity. Collisions (two headers normalizing identically) still can.
            let schema = registry
                .get(&entity)
                .expect("resolved entity must exist in registry");
            let records = remap_rows(&table, &mapping, schema)?;
            Ok(ParseResult::Parsed {
                source,
                entity,
                records,
            })
        }
        MatchResult::Ambiguous { entity, mapping } => Ok(ParseResult::NeedsMapping {
            request: MappingRequest {
                source,
                entity,
                mapping,
                headers: table.headers.clone(),
            },
            rows: table,
        }),
    }
}

/// Validate a user-confirmed mapping and remap queued rows with it.
///
/// The entity is explicit because the pending request's guess may have been
/// [`EntityType::unknown`]; the confirming UI picks the real target.
pub fn resolve_mapping(
    rows: &RawTable,
    entity: &EntityType,
    mapping: &ColumnMapping,
    registry: &SchemaRegistry,
) -> ImportResult<RecordSet> {
    let schema = registry
        .get(entity)
        .ok_or_else(|| crate::error::ImportError::UnknownEntity {
            entity: entity.as_str().to_string(),
        })?;
    remap_rows(rows, mapping, schema)
}
