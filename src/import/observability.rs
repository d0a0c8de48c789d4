use std::fmt;
use std::sync::Arc;

use crate::types::{EntityType, RecordSet};

/// Observer interface for import outcomes.
///
/// `on_data_parsed` fires once per resolved table and once per user-confirmed mapping;
/// `on_error` fires once per file that failed decode or had an unusable mapping.
pub trait ImportObserver: Send + Sync {
    /// Called when a table's rows have been normalized.
    fn on_data_parsed(&self, _source: &str, _entity: &EntityType, _records: &RecordSet) {}

    /// Called when a file fails terminally (decode error, mapping collision).
    fn on_error(&self, _source: &str, _message: &str) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ImportObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ImportObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ImportObserver for CompositeObserver {
    fn on_data_parsed(&self, source: &str, entity: &EntityType, records: &RecordSet) {
        for o in &self.observers {
            o.on_data_parsed(source, entity, records);
        }
    }

    fn on_error(&self, source: &str, message: &str) {
        for o in &self.observers {
            o.on_error(source, message);
        }
    }
}

/// Logs import events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ImportObserver for StdErrObserver {
    fn on_data_parsed(&self, source: &str, entity: &EntityType, records: &RecordSet) {
        eprintln!(
            "[import][ok] source={source} entity={entity} rows={}",
            records.row_count()
        );
    }

    fn on_error(&self, source: &str, message: &str) {
        eprintln!("[import][err] source={source} err={message}");
    }
}
