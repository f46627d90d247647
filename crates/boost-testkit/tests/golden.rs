//! Golden interchange document: every backend loads it identically and a
//! dump/load cycle preserves it.

use boost::{Adapter, Repository};
use boost_core::{format_timestamp, EventType};
use boost_store::{MemoryStore, SqliteStore, Store};
use boost_testkit::vectors::golden_first_created_at;
use boost_testkit::{
    golden_dataset, golden_document, golden_histories, golden_items, init_tracing, TestFixture,
};

fn history<S: Store + ?Sized>(store: &S, key: &str) -> Vec<EventType> {
    store
        .events(key)
        .unwrap()
        .into_iter()
        .map(|event| event.event_type)
        .collect()
}

fn assert_golden<S: Store + ?Sized>(store: &S) {
    assert_eq!(store.items().unwrap(), golden_items());
    for (key, expected) in golden_histories() {
        assert_eq!(history(store, key), expected, "history of {key}");
    }
}

#[test]
fn test_golden_document_loads_into_memory_store() {
    init_tracing();
    let store = MemoryStore::new();
    Adapter::new(&store).from_json(golden_document()).unwrap();
    assert_golden(&store);
}

#[test]
fn test_golden_document_loads_from_file_into_sqlite() {
    init_tracing();
    let fixture = TestFixture::new();
    let path = fixture.path("data.json");
    std::fs::write(&path, golden_document()).unwrap();

    let store = fixture.sqlite_store("golden.db");
    Adapter::new(&store).load(&path).unwrap();
    assert_golden(&store);

    let record = store.get_record("foo_expression").unwrap().unwrap();
    assert_eq!(record.created_at, golden_first_created_at());
    assert_eq!(
        format_timestamp(&record.updated_at),
        "2022-04-16 12:54:24.671928"
    );
}

#[test]
fn test_golden_dump_load_cycle_is_lossless() {
    let fixture = TestFixture::new();
    let first = SqliteStore::open_memory().unwrap();
    Adapter::new(&first).from_json(golden_document()).unwrap();

    let path = fixture.path("cycle.json");
    Adapter::new(&first).dump(&path).unwrap();

    let second = MemoryStore::new();
    Adapter::new(&second).load(&path).unwrap();

    let dataset = second.export().unwrap();
    assert_eq!(dataset, golden_dataset());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"created_on\": \"2022-04-16 12:54:24.673138\""));
    assert!(text.contains("\"is_checked\": true"));
}

#[test]
fn test_golden_import_into_repository_is_undoable() {
    let fixture = TestFixture::new();
    let path = fixture.path("data.json");
    std::fs::write(&path, golden_document()).unwrap();

    let mut repo = fixture.seeded_repository(&[("mine", "kept")]);
    repo.import(&path).unwrap();
    assert!(repo.is_dirty());
    assert_golden(repo.store());

    repo.restore().unwrap();
    assert_eq!(repo.keys().unwrap(), vec!["mine"]);
}

#[test]
fn test_golden_export_from_repository() {
    let fixture = TestFixture::new();
    let source = fixture.path("data.json");
    let target = fixture.path("export.json");
    std::fs::write(&source, golden_document()).unwrap();

    let mut repo: Repository = fixture.repository("boost.db");
    repo.import(&source).unwrap();
    repo.save(None).unwrap();
    repo.export(&target).unwrap();

    let store = MemoryStore::new();
    Adapter::new(&store).load(&target).unwrap();
    assert_golden(&store);
}
