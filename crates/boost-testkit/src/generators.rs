//! Proptest generators for property-based testing.
//!
//! Keys are drawn from a small alphabet so that generated operation sequences
//! hit existing keys, renames onto taken keys, and re-adds after deletes.

use proptest::prelude::*;

use boost_core::{EventType, Item};
use boost_store::{ErrorKind, Store, StoreExt};

/// Generate a key from a small pool.
pub fn key() -> impl Strategy<Value = String> {
    "[a-f]{1,2}".prop_map(String::from)
}

/// Generate a value, possibly empty.
pub fn value() -> impl Strategy<Value = String> {
    "[a-z ]{0,12}".prop_map(String::from)
}

/// Generate an EventType.
pub fn event_type() -> impl Strategy<Value = EventType> {
    prop_oneof![
        Just(EventType::Success),
        Just(EventType::Failure),
        Just(EventType::Hint),
    ]
}

/// One store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Set { key: String, value: String },
    Rename { from: String, to: String, value: String },
    Delete { key: String },
    Uncheck { key: String },
    Commit { key: String, event_type: EventType },
}

/// Generate a single operation, weighted towards inserts.
pub fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (key(), value()).prop_map(|(key, value)| Op::Set { key, value }),
        2 => (key(), key(), value()).prop_map(|(from, to, value)| Op::Rename { from, to, value }),
        2 => key().prop_map(|key| Op::Delete { key }),
        1 => key().prop_map(|key| Op::Uncheck { key }),
        2 => (key(), event_type()).prop_map(|(key, event_type)| Op::Commit { key, event_type }),
    ]
}

/// Generate up to `max_len` operations.
pub fn ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..=max_len)
}

/// An entry of the reference model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub key: String,
    pub value: String,
    pub is_checked: bool,
    pub events: Vec<EventType>,
}

/// Reference model of a store: a plain insertion-ordered list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    entries: Vec<ModelEntry>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key == key)
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut ModelEntry, ErrorKind> {
        let idx = self.position(key).ok_or(ErrorKind::NotFound)?;
        Ok(&mut self.entries[idx])
    }

    /// Apply `op` and return the outcome a conforming store must report.
    pub fn apply(&mut self, op: &Op) -> Result<(), ErrorKind> {
        match op {
            Op::Set { key, value } => {
                match self.position(key) {
                    Some(idx) => self.entries[idx].value = value.clone(),
                    None => self.entries.push(ModelEntry {
                        key: key.clone(),
                        value: value.clone(),
                        is_checked: true,
                        events: Vec::new(),
                    }),
                }
                Ok(())
            }
            Op::Rename { from, to, value } => {
                let idx = self.position(from).ok_or(ErrorKind::NotFound)?;
                if from != to && self.position(to).is_some() {
                    return Err(ErrorKind::DuplicateKey);
                }
                let entry = &mut self.entries[idx];
                entry.key = to.clone();
                entry.value = value.clone();
                Ok(())
            }
            Op::Delete { key } => {
                let idx = self.position(key).ok_or(ErrorKind::NotFound)?;
                self.entries.remove(idx);
                Ok(())
            }
            Op::Uncheck { key } => {
                self.entry_mut(key)?.is_checked = false;
                Ok(())
            }
            Op::Commit { key, event_type } => {
                self.entry_mut(key)?.events.push(*event_type);
                Ok(())
            }
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key.clone()).collect()
    }

    pub fn items(&self) -> Vec<Item> {
        self.entries
            .iter()
            .map(|entry| Item::new(entry.key.clone(), entry.value.clone(), entry.is_checked))
            .collect()
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Event types committed to `key`, oldest first.
    pub fn history(&self, key: &str) -> Option<Vec<EventType>> {
        self.position(key).map(|idx| self.entries[idx].events.clone())
    }
}

/// Apply `op` to `store`, reducing any failure to its kind.
pub fn apply_op<S: Store + ?Sized>(store: &S, op: &Op) -> Result<(), ErrorKind> {
    let result = match op {
        Op::Set { key, value } => store.set(key, value).map(|_| ()),
        Op::Rename { from, to, value } => store.rename(from, to, value),
        Op::Delete { key } => store.delete(key),
        Op::Uncheck { key } => store.set_unchecked(key),
        Op::Commit { key, event_type } => store.commit_event(key, *event_type).map(|_| ()),
    };
    result.map_err(|e| e.kind())
}

/// Apply `ops` to both `store` and a fresh model.
///
/// Panics as soon as the store's outcome for an operation differs from the
/// model's.
pub fn apply_all<S: Store + ?Sized>(store: &S, ops: &[Op]) -> Model {
    let mut model = Model::new();
    for (step, op) in ops.iter().enumerate() {
        let expected = model.apply(op);
        let actual = apply_op(store, op);
        assert_eq!(actual, expected, "step {step}: {op:?}");
    }
    model
}
