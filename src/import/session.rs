//! Stateful multi-file import session.
//!
//! Wraps the per-file pipeline ([`super::parse_path`]) with the state a caller-facing
//! widget needs: resolved tables flow straight to the observer, ambiguous tables queue as
//! pending mapping requests (surfaced strictly one at a time, FIFO), and per-file
//! failures land in an error list without disturbing any other file.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use crate::decode::DecodeOptions;
use crate::error::{ImportError, ImportResult};
use crate::matcher::HeaderMatcher;
use crate::types::{ColumnMapping, EntityType, RawTable, RecordSet, SchemaRegistry};

use super::observability::ImportObserver;
use super::{MappingRequest, ParseResult, parse_table, resolve_mapping};

/// A human-readable per-file failure, for the caller's error surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    /// Name of the file (or sheet) that failed.
    pub file_name: String,
    /// What went wrong.
    pub message: String,
}

/// A successfully normalized table.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTable {
    /// Source name (file stem or sheet name).
    pub source: String,
    /// Entity the rows were normalized as.
    pub entity: EntityType,
    /// The normalized records.
    pub records: RecordSet,
}

struct PendingImport {
    request: MappingRequest,
    rows: RawTable,
}

/// Multi-file import session.
///
/// Files are independent: nothing one file does — succeed, queue, or fail — affects
/// another. The pending-mapping queue is the single piece of cross-file state, and it
/// only sequences *when* each request is shown, never mixes their data.
pub struct ImportSession {
    registry: SchemaRegistry,
    observer: Option<Arc<dyn ImportObserver>>,
    queue: VecDeque<PendingImport>,
    errors: Vec<FileError>,
}

impl ImportSession {
    /// Create a session over a schema registry.
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            observer: None,
            queue: VecDeque::new(),
            errors: Vec::new(),
        }
    }

    /// Attach an observer for parsed-data and error events.
    pub fn with_observer(mut self, observer: Arc<dyn ImportObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The registry this session matches against.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Ingest one file with default decode options. See [`ImportSession::ingest_path_with`].
    pub fn ingest_path(&mut self, path: impl AsRef<Path>) -> Vec<ImportedTable> {
        self.ingest_path_with(path, &DecodeOptions::default())
    }

    /// Ingest one file: decode, match, and either normalize or queue each table.
    ///
    /// Returns the tables that resolved immediately (each also reported through
    /// `on_data_parsed`). Ambiguous tables join the pending queue; decode and collision
    /// failures are recorded in [`ImportSession::errors`] and reported through
    /// `on_error`. This method never fails the caller: per-file isolation is the whole
    /// point of the session.
    pub fn ingest_path_with(
        &mut self,
        path: impl AsRef<Path>,
        options: &DecodeOptions,
    ) -> Vec<ImportedTable> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("<unnamed>")
            .to_string();

        match super::parse_path(path, &self.registry, options) {
            Ok(results) => self.absorb(results),
            Err(err) => {
                self.record_error(file_name, err.to_string());
                Vec::new()
            }
        }
    }

    /// Ingest an already-decoded table (for callers with their own decoder).
    pub fn ingest_table(&mut self, source: &str, table: RawTable) -> Option<ImportedTable> {
        let matcher = HeaderMatcher::new(&self.registry);
        match parse_table(source.to_string(), table, &self.registry, &matcher) {
            Ok(result) => self.absorb(vec![result]).pop(),
            Err(err) => {
                self.record_error(source.to_string(), err.to_string());
                None
            }
        }
    }

    fn absorb(&mut self, results: Vec<ParseResult>) -> Vec<ImportedTable> {
        let mut imported = Vec::new();
        for result in results {
            match result {
                ParseResult::Parsed {
                    source,
                    entity,
                    records,
                } => {
                    if let Some(obs) = &self.observer {
                        obs.on_data_parsed(&source, &entity, &records);
                    }
                    imported.push(ImportedTable {
                        source,
                        entity,
                        records,
                    });
                }
                ParseResult::NeedsMapping { request, rows } => {
                    self.queue.push_back(PendingImport { request, rows });
                }
            }
        }
        imported
    }

    fn record_error(&mut self, file_name: String, message: String) {
        if let Some(obs) = &self.observer {
            obs.on_error(&file_name, &message);
        }
        self.errors.push(FileError { file_name, message });
    }

    /// The mapping request currently awaiting the user, if any.
    ///
    /// Only the front of the queue is ever visible; later requests wait their turn.
    pub fn pending_request(&self) -> Option<&MappingRequest> {
        self.queue.front().map(|p| &p.request)
    }

    /// Number of queued mapping requests (including the surfaced one).
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Finalize the surfaced mapping request with a user-confirmed entity and mapping.
    ///
    /// On success the request is consumed, its rows are remapped, and `on_data_parsed`
    /// fires. On failure (unknown entity, unknown field, mapping collision) the request
    /// *stays queued* so the user can correct the mapping and try again; no partial data
    /// is emitted.
    pub fn resolve_pending(
        &mut self,
        entity: &EntityType,
        mapping: &ColumnMapping,
    ) -> ImportResult<ImportedTable> {
        let pending = self.queue.front().ok_or(ImportError::NoPendingMapping)?;
        let records = resolve_mapping(&pending.rows, entity, mapping, &self.registry)?;

        // Validation passed; now it is safe to consume the request.
        let pending = self
            .queue
            .pop_front()
            .expect("front checked non-empty above");
        if let Some(obs) = &self.observer {
            obs.on_data_parsed(&pending.request.source, entity, &records);
        }
        Ok(ImportedTable {
            source: pending.request.source,
            entity: entity.clone(),
            records,
        })
    }

    /// Dismiss the surfaced mapping request, discarding its rows.
    ///
    /// No data is emitted and no error is recorded: cancellation is a user choice, not a
    /// failure. The next queued request (if any) becomes visible.
    pub fn cancel_pending(&mut self) -> ImportResult<()> {
        self.queue
            .pop_front()
            .map(|_| ())
            .ok_or(ImportError::NoPendingMapping)
    }

    /// Per-file failures accumulated so far, in occurrence order.
    pub fn errors(&self) -> &[FileError] {
        &self.errors
    }

    /// Drain the error list (e.g. after the caller has rendered it).
    pub fn take_errors(&mut self) -> Vec<FileError> {
        std::mem::take(&mut self.errors)
    }
}

impl std::fmt::Debug for ImportSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportSession")
            .field("schemas", &self.registry.schemas().len())
            .field("pending", &self.queue.len())
            .field("errors", &self.errors.len())
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}
