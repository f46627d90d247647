//! Property tests: stores and the repository against the reference model.

use boost::Repository;
use boost_core::EventType;
use boost_store::{MemoryStore, SqliteStore, Store};
use boost_testkit::generators::{apply_all, key, ops, value, Op};
use boost_testkit::TestFixture;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn memory_store_matches_model(ops in ops(48)) {
        let store = MemoryStore::new();
        let model = apply_all(&store, &ops);

        prop_assert_eq!(store.keys().unwrap(), model.keys());
        prop_assert_eq!(store.items().unwrap(), model.items());
    }

    #[test]
    fn sqlite_store_matches_model(ops in ops(48)) {
        let store = SqliteStore::open_memory().unwrap();
        let model = apply_all(&store, &ops);

        prop_assert_eq!(store.items().unwrap(), model.items());
        for entry in model.entries() {
            let history: Vec<EventType> = store
                .events(&entry.key)
                .unwrap()
                .into_iter()
                .map(|event| event.event_type)
                .collect();
            prop_assert_eq!(&history, &entry.events);
        }
    }

    #[test]
    fn keys_stay_unique(ops in ops(48)) {
        let store = MemoryStore::new();
        apply_all(&store, &ops);

        let mut keys = store.keys().unwrap();
        let len = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), len);
        prop_assert_eq!(store.count().unwrap(), len);
    }

    #[test]
    fn no_event_outlives_its_record(ops in ops(48)) {
        let store = SqliteStore::open_memory().unwrap();
        apply_all(&store, &ops);

        let live: Vec<_> = store.records().unwrap().into_iter().map(|r| r.id).collect();
        for event in store.all_events().unwrap() {
            prop_assert!(live.contains(&event.record_id));
        }
    }

    #[test]
    fn last_write_wins(k in key(), v1 in value(), v2 in value()) {
        let store = MemoryStore::new();
        store.set(&k, &v1).unwrap();
        store.set(&k, &v2).unwrap();

        prop_assert_eq!(store.get(&k).unwrap(), Some(v2));
        prop_assert_eq!(store.count().unwrap(), 1);
        prop_assert!(store.is_checked(&k).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn restore_returns_to_saved_state(
        seed in ops(16),
        edits in ops(16),
    ) {
        let fixture = TestFixture::new();
        let mut repo = fixture.repository("prop.db");
        replay_ops(&mut repo, &seed);
        repo.save(None).unwrap();

        // Flag changes are not undoable, so only content edits are replayed
        let edits: Vec<Op> = edits
            .into_iter()
            .filter(|op| !matches!(op, Op::Uncheck { .. }))
            .collect();

        let before = repo.items().unwrap();
        replay_ops(&mut repo, &edits);
        repo.restore().unwrap();

        prop_assert!(!repo.is_dirty());
        prop_assert_eq!(repo.items().unwrap(), before);
        prop_assert_eq!(fixture.file_count(), 1);
    }
}

/// Drive a repository with generated operations, ignoring expected failures.
fn replay_ops(repo: &mut Repository, ops: &[Op]) {
    for op in ops {
        let _ = match op {
            Op::Set { key, value } => repo.set(key.as_str(), value),
            Op::Rename { from, to, value } => repo.rename(from, to, value),
            Op::Delete { key } => repo.delete(key),
            Op::Uncheck { key } => repo.set_unchecked(key),
            Op::Commit { key, event_type } => match event_type {
                EventType::Success => repo.commit_success_event(key).map(|_| ()),
                EventType::Failure => repo.commit_failure_event(key).map(|_| ()),
                EventType::Hint => repo.commit_hint_event(key).map(|_| ()),
            },
        };
    }
}
