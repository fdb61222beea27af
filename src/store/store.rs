//! Ordered record store with a unique key field
//!
//! Records are held as `Arc<Record>`: a snapshot is a shallow copy of the
//! sequence and an update swaps in a new record wholesale. A key index maps
//! each key to its position, so lookups and inserts do not scan.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::executor::RecordSource;
use crate::observability::Logger;

use super::errors::{StoreError, StoreResult};
use super::history::{Operation, OperationHistory};
use super::record::{FieldValue, Record};

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.imported + self.skipped
    }
}

/// Ordered collection of records, unique on `key_field`
#[derive(Debug, Clone)]
pub struct RecordStore {
    key_field: String,
    records: Vec<Arc<Record>>,
    index: HashMap<String, usize>,
    history: OperationHistory,
}

impl RecordStore {
    /// Creates an empty store keyed on `key_field`
    pub fn new(key_field: impl Into<String>, history_capacity: usize) -> Self {
        Self {
            key_field: key_field.into(),
            records: Vec::new(),
            index: HashMap::new(),
            history: OperationHistory::new(history_capacity),
        }
    }

    /// Name of the key field
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Extracts the key of a record.
    ///
    /// Only text and number values can be keys.
    pub fn key_of(&self, record: &Record) -> StoreResult<String> {
        key_ref(record, &self.key_field)
            .map(Cow::into_owned)
            .ok_or_else(|| StoreError::MissingKey(self.key_field.clone()))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Re-points the index at every record from `start` onwards
    fn reindex_from(&mut self, start: usize) {
        for (i, record) in self.records.iter().enumerate().skip(start) {
            if let Some(key) = key_ref(record, &self.key_field) {
                self.index.insert(key.into_owned(), i);
            }
        }
    }

    fn remove_at(&mut self, position: usize, key: &str) -> Arc<Record> {
        let record = self.records.remove(position);
        self.index.remove(key);
        self.reindex_from(position);
        record
    }

    /// Appends a record. Fails if its key is missing or already taken.
    pub fn insert(&mut self, record: Record) -> StoreResult<()> {
        let key = self.key_of(&record)?;
        if self.index.contains_key(&key) {
            return Err(StoreError::DuplicateKey {
                field: self.key_field.clone(),
                key,
            });
        }

        let record = Arc::new(record);
        self.records.push(Arc::clone(&record));
        self.index.insert(key.clone(), self.records.len() - 1);
        self.history.push(Operation::Insert { key, record });
        Ok(())
    }

    /// Looks up a record by key
    pub fn get(&self, key: &str) -> Option<&Arc<Record>> {
        self.position(key).map(|i| &self.records[i])
    }

    /// Replaces the record stored under `key` and returns the previous one.
    ///
    /// The replacement may carry a new key as long as it is not taken.
    pub fn update(&mut self, key: &str, record: Record) -> StoreResult<Arc<Record>> {
        let index = self
            .position(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        let new_key = self.key_of(&record)?;
        if new_key != key && self.index.contains_key(&new_key) {
            return Err(StoreError::DuplicateKey {
                field: self.key_field.clone(),
                key: new_key,
            });
        }

        let replacement = Arc::new(record);
        let previous = std::mem::replace(&mut self.records[index], Arc::clone(&replacement));
        if new_key != key {
            self.index.remove(key);
            self.index.insert(new_key, index);
        }
        self.history.push(Operation::Update {
            key: key.to_string(),
            previous: Arc::clone(&previous),
            replacement,
        });
        Ok(previous)
    }

    /// Removes the record stored under `key`
    pub fn delete(&mut self, key: &str) -> StoreResult<Arc<Record>> {
        let position = self
            .position(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        let record = self.remove_at(position, key);
        self.history.push(Operation::Delete {
            key: key.to_string(),
            record: Arc::clone(&record),
            position,
        });
        Ok(record)
    }

    /// Reverts the newest recorded operation.
    ///
    /// The undo itself is not recorded. If the revert cannot be applied the
    /// entry goes back on the history unchanged and the error is returned.
    pub fn undo(&mut self) -> StoreResult<Operation> {
        let entry = self.history.pop().ok_or(StoreError::NothingToUndo)?;

        let reverted = match &entry.operation {
            Operation::Insert { key, .. } => match self.position(key) {
                Some(i) => {
                    self.remove_at(i, key);
                    Ok(())
                }
                None => Err(StoreError::NotFound(key.clone())),
            },
            Operation::Delete {
                key,
                record,
                position,
            } => {
                if self.index.contains_key(key) {
                    Err(StoreError::DuplicateKey {
                        field: self.key_field.clone(),
                        key: key.clone(),
                    })
                } else {
                    let at = (*position).min(self.records.len());
                    self.records.insert(at, Arc::clone(record));
                    self.reindex_from(at);
                    Ok(())
                }
            }
            Operation::Update {
                key,
                previous,
                replacement,
            } => self.key_of(replacement).and_then(|current_key| {
                let i = self
                    .position(&current_key)
                    .ok_or_else(|| StoreError::NotFound(current_key.clone()))?;
                if current_key != *key && self.index.contains_key(key) {
                    return Err(StoreError::DuplicateKey {
                        field: self.key_field.clone(),
                        key: key.clone(),
                    });
                }
                self.records[i] = Arc::clone(previous);
                self.index.remove(&current_key);
                self.index.insert(key.clone(), i);
                Ok(())
            }),
        };

        match reverted {
            Ok(()) => Ok(entry.operation),
            Err(e) => {
                self.history.restore(entry);
                Err(e)
            }
        }
    }

    /// Inserts every record, skipping the ones that are rejected
    pub fn import(&mut self, records: impl IntoIterator<Item = Record>) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for record in records {
            match self.insert(record) {
                Ok(()) => summary.imported += 1,
                Err(err) => {
                    Logger::warn(
                        "RECORD_SKIPPED",
                        &[("code", err.code()), ("reason", &err.to_string())],
                    );
                    summary.skipped += 1;
                }
            }
        }
        summary
    }

    /// Records whose text fields contain `term`, case-insensitively
    pub fn search(&self, term: &str) -> Vec<Arc<Record>> {
        let needle = term.to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                r.iter().any(|(_, v)| match v {
                    FieldValue::Text(s) => s.to_lowercase().contains(&needle),
                    _ => false,
                })
            })
            .cloned()
            .collect()
    }

    /// Records whose list field `field` contains `member` exactly
    pub fn filter_by_member(&self, field: &str, member: &str) -> Vec<Arc<Record>> {
        self.records
            .iter()
            .filter(|r| {
                r.get(field)
                    .and_then(FieldValue::as_list)
                    .map(|items| items.iter().any(|v| v.render() == member))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Records whose mean over the numeric list `source` lies in `[min, max]`.
    ///
    /// Records with an empty or missing list never match.
    pub fn filter_by_average(&self, source: &str, min: f64, max: f64) -> Vec<Arc<Record>> {
        self.records
            .iter()
            .filter(|r| match mean_of(r, source) {
                Some(avg) => min <= avg && avg <= max,
                None => false,
            })
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Record>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn history(&self) -> &OperationHistory {
        &self.history
    }
}

impl RecordSource for RecordStore {
    fn snapshot(&self) -> Vec<Arc<Record>> {
        self.records.clone()
    }
}

/// Borrowed key of a record, `None` when the key field is absent or not a
/// text or number value
fn key_ref<'r>(record: &'r Record, key_field: &str) -> Option<Cow<'r, str>> {
    match record.get(key_field) {
        Some(FieldValue::Text(s)) if !s.trim().is_empty() => Some(Cow::Borrowed(s.as_str())),
        Some(v @ FieldValue::Number(_)) => Some(Cow::Owned(v.render())),
        _ => None,
    }
}

/// Mean of the numeric entries of a list field, `None` when there are none
pub(crate) fn mean_of(record: &Record, source: &str) -> Option<f64> {
    let values: Vec<f64> = record
        .get(source)?
        .as_list()?
        .iter()
        .filter_map(FieldValue::as_number)
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(roll: &str, name: &str, grades: Vec<f64>, courses: Vec<&str>) -> Record {
        Record::new()
            .with("roll_no", roll)
            .with("name", name)
            .with("email", format!("{}@school.edu", name.to_lowercase()))
            .with("grades", grades)
            .with("courses", courses)
    }

    fn populated() -> RecordStore {
        let mut store = RecordStore::new("roll_no", 100);
        store
            .insert(student("A1", "Alice", vec![90.0, 80.0], vec!["Math", "Art"]))
            .unwrap();
        store
            .insert(student("A2", "Bob", vec![60.0, 50.0], vec!["Math"]))
            .unwrap();
        store
            .insert(student("A3", "Carol", vec![], vec!["Physics"]))
            .unwrap();
        store
    }

    fn keys(store: &RecordStore) -> Vec<String> {
        store.iter().map(|r| store.key_of(r).unwrap()).collect()
    }

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let mut store = populated();
        let err = store
            .insert(student("A1", "Alicia", vec![], vec![]))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_insert_requires_key() {
        let mut store = RecordStore::new("roll_no", 10);
        let err = store.insert(Record::new().with("name", "NoKey")).unwrap_err();
        assert_eq!(err, StoreError::MissingKey("roll_no".into()));
    }

    #[test]
    fn test_numeric_key() {
        let mut store = RecordStore::new("id", 10);
        store.insert(Record::new().with("id", 7i64)).unwrap();
        assert!(store.get("7").is_some());
    }

    #[test]
    fn test_get_update_delete() {
        let mut store = populated();
        assert_eq!(
            store.get("A2").unwrap().get("name"),
            Some(&FieldValue::from("Bob"))
        );

        let previous = store
            .update("A2", student("A2", "Robert", vec![70.0], vec!["Math"]))
            .unwrap();
        assert_eq!(previous.get("name"), Some(&FieldValue::from("Bob")));
        assert_eq!(
            store.get("A2").unwrap().get("name"),
            Some(&FieldValue::from("Robert"))
        );

        store.delete("A2").unwrap();
        assert!(store.get("A2").is_none());
        assert_eq!(keys(&store), vec!["A1", "A3"]);

        assert_eq!(store.delete("A2").unwrap_err(), StoreError::NotFound("A2".into()));
    }

    #[test]
    fn test_update_cannot_steal_key() {
        let mut store = populated();
        let err = store
            .update("A2", student("A1", "Bob", vec![], vec![]))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[test]
    fn test_undo_reverts_each_operation() {
        let mut store = populated();
        store.delete("A1").unwrap();
        store
            .update("A3", student("A3", "Caroline", vec![], vec![]))
            .unwrap();

        let undone = store.undo().unwrap();
        assert_eq!(undone.action(), "update");
        assert_eq!(
            store.get("A3").unwrap().get("name"),
            Some(&FieldValue::from("Carol"))
        );

        let undone = store.undo().unwrap();
        assert_eq!(undone.action(), "delete");
        assert_eq!(keys(&store), vec!["A1", "A2", "A3"]);

        let undone = store.undo().unwrap();
        assert_eq!(undone.action(), "insert");
        assert_eq!(keys(&store), vec!["A1", "A2"]);
    }

    #[test]
    fn test_undo_empty_history() {
        let mut store = RecordStore::new("roll_no", 10);
        assert_eq!(store.undo().unwrap_err(), StoreError::NothingToUndo);
    }

    #[test]
    fn test_import_skips_duplicates() {
        let mut store = RecordStore::new("roll_no", 10);
        let summary = store.import(vec![
            student("A1", "Alice", vec![], vec![]),
            student("A1", "Again", vec![], vec![]),
            Record::new().with("name", "nokey"),
            student("A2", "Bob", vec![], vec![]),
        ]);
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_search_helpers() {
        let store = populated();

        assert_eq!(store.search("ALI").len(), 1);
        assert_eq!(store.search("school.edu").len(), 3);
        assert_eq!(store.filter_by_member("courses", "Math").len(), 2);
        assert_eq!(store.filter_by_member("courses", "math").len(), 0);

        let mid = store.filter_by_average("grades", 50.0, 70.0);
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].get("name"), Some(&FieldValue::from("Bob")));
    }

    #[test]
    fn test_import_thousands_resolves_keys() {
        let mut store = RecordStore::new("roll_no", 16);
        let summary = store.import(
            (0..5000).map(|i| student(&format!("R{}", i), "Student", vec![70.0], vec!["Math"])),
        );
        assert_eq!(summary.imported, 5000);
        assert_eq!(summary.skipped, 0);
        assert!(store.get("R0").is_some());
        assert!(store.get("R4999").is_some());

        store.delete("R10").unwrap();
        assert!(store.get("R10").is_none());
        let last = store.get("R4999").unwrap();
        assert_eq!(store.key_of(last).unwrap(), "R4999");
        assert!(Arc::ptr_eq(last, &store.snapshot()[4998]));

        store.undo().unwrap();
        assert!(Arc::ptr_eq(store.get("R10").unwrap(), &store.snapshot()[10]));
        assert!(Arc::ptr_eq(store.get("R4999").unwrap(), &store.snapshot()[4999]));
    }

    #[test]
    fn test_key_change_moves_index_entry() {
        let mut store = populated();
        store
            .update("A2", student("B2", "Bob", vec![], vec![]))
            .unwrap();
        assert!(store.get("A2").is_none());
        assert_eq!(keys(&store), vec!["A1", "B2", "A3"]);
        store.insert(student("A2", "Another", vec![], vec![])).unwrap();

        store.delete("A2").unwrap();
        store.undo().unwrap();
        assert!(store.get("A2").is_some());
        store.undo().unwrap();
        store.undo().unwrap();
        assert_eq!(keys(&store), vec!["A1", "A2", "A3"]);
        assert!(store.get("B2").is_none());
    }

    #[test]
    fn test_failed_undo_keeps_entry() {
        let mut store = populated();
        store.delete("A1").unwrap();
        let id = store.history().peek().unwrap().id;
        let timestamp = store.history().peek().unwrap().timestamp;

        // a record with the deleted key reappears outside the history
        store.records.push(Arc::new(student("A1", "Other", vec![], vec![])));
        store.reindex_from(0);

        let err = store.undo().unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        let entry = store.history().peek().unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.timestamp, timestamp);
        assert_eq!(entry.operation.action(), "delete");
        assert_eq!(store.history().len(), 4);
    }

    #[test]
    fn test_snapshot_is_shallow() {
        let store = populated();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert!(Arc::ptr_eq(&snapshot[0], store.get("A1").unwrap()));
    }
}
