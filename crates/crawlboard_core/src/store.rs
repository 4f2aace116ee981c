use crate::{Record, RecordId};

/// Local copy of the backend collection as last reconciled.
///
/// Every write replaces a whole record keyed by id; no field-level patching
/// happens here, so writes from independent sources commute per id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Replace the whole store with a freshly fetched collection.
    ///
    /// The result is ordered by id so repeated fetches render identically
    /// regardless of backend ordering. Duplicate ids keep the last occurrence.
    /// Returns whether the stored collection changed.
    pub fn reconcile(&mut self, fetched: Vec<Record>) -> bool {
        let next = canonicalize(fetched);
        if next == self.records {
            return false;
        }
        self.records = next;
        true
    }

    /// Insert a record, or replace the existing record with the same id.
    /// New records are appended so they show up at the end until the next
    /// reconciliation sorts them in.
    pub fn upsert(&mut self, record: Record) -> bool {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) if *existing == record => false,
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                self.records.push(record);
                true
            }
        }
    }

    /// Replace a record only if its id is still present.
    pub fn replace_existing(&mut self, record: Record) -> bool {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) if *existing != record => {
                *existing = record;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let index = self.records.iter().position(|r| &r.id == id)?;
        Some(self.records.remove(index))
    }
}

fn canonicalize(mut fetched: Vec<Record>) -> Vec<Record> {
    // Stable sort keeps duplicates in arrival order; keep the last of each run.
    fetched.sort_by(|a, b| a.id.cmp(&b.id));
    let mut out: Vec<Record> = Vec::with_capacity(fetched.len());
    for record in fetched {
        match out.last_mut() {
            Some(last) if last.id == record.id => *last = record,
            _ => out.push(record),
        }
    }
    out
}
