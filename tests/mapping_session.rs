use std::sync::{Arc, Mutex};

use entity_import::import::{ImportObserver, ImportSession};
use entity_import::types::{
    ColumnMapping, EntitySchema, EntityType, FieldSpec, FieldType, RawCell, RawTable,
    RecordSet, SchemaRegistry, Value,
};

fn donation_registry() -> SchemaRegistry {
    SchemaRegistry::new(vec![EntitySchema::new(
        EntityType::new("donation"),
        vec![
            FieldSpec::required("donorName", FieldType::Text).with_aliases(["Name"]),
            FieldSpec::required("donorEmail", FieldType::Text).with_aliases(["Email"]),
            FieldSpec::required("amount", FieldType::Number).with_aliases(["Amount"]),
        ],
    )])
    .unwrap()
}

#[derive(Default)]
struct RecordingObserver {
    parsed: Mutex<Vec<(String, String, usize)>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl ImportObserver for RecordingObserver {
    fn on_data_parsed(&self, source: &str, entity: &EntityType, records: &RecordSet) {
        self.parsed.lock().unwrap().push((
            source.to_string(),
            entity.as_str().to_string(),
            records.row_count(),
        ));
    }

    fn on_error(&self, source: &str, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((source.to_string(), message.to_string()));
    }
}

fn text(s: &str) -> RawCell {
    RawCell::Text(s.to_string())
}

fn unlabeled_table() -> RawTable {
    RawTable::new(
        vec!["Col1".into(), "Col2".into()],
        vec![
            vec![text("Alice"), text("10")],
            vec![text("Bob"), text("20")],
        ],
    )
}

#[test]
fn one_good_file_one_corrupt_file() {
    let observer = Arc::new(RecordingObserver::default());
    let mut session =
        ImportSession::new(donation_registry()).with_observer(observer.clone());

    let imported = session.ingest_path("tests/fixtures/donations.csv");
    assert_eq!(imported.len(), 1);

    let also = session.ingest_path("tests/fixtures/notes.txt");
    assert!(also.is_empty());

    // Exactly one data callback, exactly one error entry naming the bad file.
    let parsed = observer.parsed.lock().unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].1, "donation");

    assert_eq!(session.errors().len(), 1);
    assert_eq!(session.errors()[0].file_name, "notes.txt");
    assert_eq!(observer.errors.lock().unwrap().len(), 1);
}

#[test]
fn manual_mapping_completes_an_unknown_table() {
    let mut session = ImportSession::new(donation_registry());

    assert!(session.ingest_table("mystery", unlabeled_table()).is_none());
    let request = session.pending_request().expect("should be queued");
    assert!(request.entity.is_unknown());
    assert!(request.mapping.is_empty());

    // User decides: Col1 is the donor name, Col2 the amount; no email column exists.
    let mapping = ColumnMapping::from_pairs([("Col1", "donorName"), ("Col2", "amount")]);
    let imported = session
        .resolve_pending(&EntityType::new("donation"), &mapping)
        .unwrap();

    assert_eq!(imported.records.row_count(), 2);
    assert_eq!(
        imported.records.value(0, "donorName"),
        Some(&Value::Text("Alice".into()))
    );
    assert_eq!(imported.records.value(0, "amount"), Some(&Value::Number(10.0)));
    // The unmapped field stays Null rather than being invented.
    assert_eq!(imported.records.value(0, "donorEmail"), Some(&Value::Null));
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn pending_requests_queue_fifo_and_surface_one_at_a_time() {
    let mut session = ImportSession::new(donation_registry());

    session.ingest_table("first", unlabeled_table());
    session.ingest_table("second", unlabeled_table());

    assert_eq!(session.pending_count(), 2);
    assert_eq!(session.pending_request().unwrap().source, "first");

    let mapping = ColumnMapping::from_pairs([("Col1", "donorName"), ("Col2", "amount")]);
    session
        .resolve_pending(&EntityType::new("donation"), &mapping)
        .unwrap();

    // Only now does the second request surface.
    assert_eq!(session.pending_request().unwrap().source, "second");
}

#[test]
fn cancel_discards_rows_without_emitting_anything() {
    let observer = Arc::new(RecordingObserver::default());
    let mut session =
        ImportSession::new(donation_registry()).with_observer(observer.clone());

    session.ingest_table("mystery", unlabeled_table());
    session.cancel_pending().unwrap();

    assert_eq!(session.pending_count(), 0);
    assert!(observer.parsed.lock().unwrap().is_empty());
    assert!(session.errors().is_empty());

    // Nothing left to cancel or resolve.
    assert!(session.cancel_pending().is_err());
    let mapping = ColumnMapping::from_pairs([("Col1", "donorName")]);
    assert!(
        session
            .resolve_pending(&EntityType::new("donation"), &mapping)
            .is_err()
    );
}

#[test]
fn bad_resolution_keeps_the_request_queued() {
    let mut session = ImportSession::new(donation_registry());
    session.ingest_table("mystery", unlabeled_table());

    // Collision: both columns aimed at the same field.
    let colliding = ColumnMapping::from_pairs([("Col1", "amount"), ("Col2", "amount")]);
    let err = session
        .resolve_pending(&EntityType::new("donation"), &colliding)
        .unwrap_err();
    assert!(err.to_string().contains("mapping collision"));
    assert_eq!(session.pending_count(), 1);

    // Unknown entity is rejected the same way.
    let mapping = ColumnMapping::from_pairs([("Col1", "donorName"), ("Col2", "amount")]);
    assert!(
        session
            .resolve_pending(&EntityType::new("invoice"), &mapping)
            .is_err()
    );
    assert_eq!(session.pending_count(), 1);

    // A corrected mapping still works.
    session
        .resolve_pending(&EntityType::new("donation"), &mapping)
        .unwrap();
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn ambiguous_with_partial_mapping_carries_the_best_guess() {
    let mut session = ImportSession::new(donation_registry());
    let table = RawTable::new(
        vec!["Name".into(), "Amount".into()],
        vec![vec![text("Ada"), text("10")]],
    );

    assert!(session.ingest_table("partial", table).is_none());
    let request = session.pending_request().unwrap();
    assert_eq!(request.entity.as_str(), "donation");
    assert_eq!(request.mapping.get("Name"), Some("donorName"));
    assert_eq!(request.mapping.get("Amount"), Some("amount"));
    assert!(!request.mapping.maps_to("donorEmail"));
}
