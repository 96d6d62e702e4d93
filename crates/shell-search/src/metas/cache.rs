//! Process-lifetime cache of display metadata, keyed by result identifier.
//!
//! Entries are never evicted or replaced. Inserting an identifier that is
//! already present keeps the first record.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::record::MetaRecord;

#[derive(Debug, Default)]
pub struct MetadataCache {
    records: HashMap<String, Arc<MetaRecord>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Arc<MetaRecord>> {
        self.records.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Returns the cached record for the record's id, inserting it first if
    /// the id is new.
    pub fn insert(&mut self, record: MetaRecord) -> Arc<MetaRecord> {
        self.records
            .entry(record.id.clone())
            .or_insert_with(|| Arc::new(record))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifiers from `ids` with no cached record, de-duplicated in
    /// first-seen order.
    pub fn missing(&self, ids: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        for id in ids {
            if !self.contains(id) && seen.insert(id.as_str()) {
                missing.push(id.clone());
            }
        }
        missing
    }

    /// Cached records for `ids` in input order, plus the ids that had none.
    pub fn collect(&self, ids: &[String]) -> (Vec<Arc<MetaRecord>>, Vec<String>) {
        let mut records = Vec::with_capacity(ids.len());
        let mut unresolved = Vec::new();
        for id in ids {
            match self.get(id) {
                Some(record) => records.push(record),
                None => unresolved.push(id.clone()),
            }
        }
        (records, unresolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metas::MetaIcon;

    fn record(id: &str, name: &str) -> MetaRecord {
        MetaRecord {
            id: id.to_string(),
            name: name.to_string(),
            icon: MetaIcon::Named("folder".to_string()),
        }
    }

    #[test]
    fn first_insert_wins() {
        let mut cache = MetadataCache::new();
        let first = cache.insert(record("u1", "first"));
        let second = cache.insert(record("u1", "second"));

        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.name, "first");
    }

    #[test]
    fn missing_is_deduplicated_in_order() {
        let mut cache = MetadataCache::new();
        cache.insert(record("u2", "two"));
        let ids: Vec<String> = ["u3", "u1", "u2", "u3", "u1"]
            .iter()
            .map(|id| id.to_string())
            .collect();

        assert_eq!(cache.missing(&ids), vec!["u3", "u1"]);
    }

    #[test]
    fn collect_keeps_input_order_and_duplicates() {
        let mut cache = MetadataCache::new();
        cache.insert(record("u1", "one"));
        cache.insert(record("u2", "two"));
        let ids: Vec<String> = ["u1", "u2", "gone", "u1"]
            .iter()
            .map(|id| id.to_string())
            .collect();

        let (records, unresolved) = cache.collect(&ids);
        let names: Vec<&str> = records.iter().map(|record| record.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two", "one"]);
        assert_eq!(unresolved, vec!["gone"]);
    }
}
