//! Accumulated results across fetched pages.

use std::collections::HashSet;

use crate::models::BookRecord;

/// Records fetched so far, in the order pages arrived.
///
/// The store never sorts or drops records on its own; [`ResultStore::merge`]
/// appends everything. Identity keys are tracked so a caller can opt into
/// [`ResultStore::merge_unseen`] when re-fetches may repeat records.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    records: Vec<BookRecord>,
    seen: HashSet<String>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything accumulated so far
    pub fn reset(&mut self) {
        self.records.clear();
        self.seen.clear();
    }

    /// Append `records` after the current contents, keeping their order
    pub fn merge(&mut self, records: impl IntoIterator<Item = BookRecord>) {
        for record in records {
            if let Some(key) = record.identity_key() {
                self.seen.insert(key);
            }
            self.records.push(record);
        }
    }

    /// Append only records whose identity key has not been merged before.
    ///
    /// Records without an identity key are always appended. Returns the
    /// number of records appended.
    pub fn merge_unseen(&mut self, records: impl IntoIterator<Item = BookRecord>) -> usize {
        let before = self.records.len();
        for record in records {
            match record.identity_key() {
                Some(key) => {
                    if self.seen.insert(key) {
                        self.records.push(record);
                    }
                }
                None => self.records.push(record),
            }
        }
        self.records.len() - before
    }

    /// Read-only view of the accumulated records
    pub fn all(&self) -> &[BookRecord] {
        &self.records
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
