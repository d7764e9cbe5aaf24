//! Record table with per-record optimistic concurrency.

use crate::error::{ServerError, ServerResult};
use parking_lot::RwLock;
use recordsync_codec::{Record, RecordMetadata, RemoteIdentity};
use recordsync_protocol::Predicate;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stored records ordered by identity.
///
/// Every stored record carries metadata with a change tag that is replaced
/// on each write. A write must present the current tag, or no tag for an
/// insert.
#[derive(Debug, Default)]
pub struct RecordTable {
    records: RwLock<BTreeMap<RemoteIdentity, Record>>,
}

impl RecordTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Returns a stored record.
    pub fn get(&self, identity: &RemoteIdentity) -> Option<Record> {
        self.records.read().get(identity).cloned()
    }

    /// Returns up to `limit` matching records after `after`, and whether
    /// more remain.
    pub fn scan(
        &self,
        record_type: &str,
        predicate: &Predicate,
        after: Option<&RemoteIdentity>,
        limit: usize,
    ) -> (Vec<Record>, bool) {
        let records = self.records.read();
        let lower = match after {
            Some(identity) => Bound::Excluded(identity),
            None => Bound::Unbounded,
        };
        let mut matching = records
            .range::<RemoteIdentity, _>((lower, Bound::Unbounded))
            .map(|(_, record)| record)
            .filter(|record| record.record_type() == record_type && predicate.matches(record));

        let page: Vec<Record> = matching.by_ref().take(limit).cloned().collect();
        let more = matching.next().is_some();
        (page, more)
    }

    /// Writes a record if its metadata matches the stored version.
    ///
    /// Returns the stored record with fresh metadata.
    pub fn write(&self, record: &Record) -> ServerResult<Record> {
        let identity = record.identity().clone();
        let client_tag = record.metadata().map(|m| m.change_tag.clone());
        let mut records = self.records.write();

        let created_at = match (records.get(&identity), &client_tag) {
            (None, None) => now_millis(),
            (None, Some(_)) => return Err(ServerError::NotFound(identity)),
            (Some(current), client) => {
                let metadata = current.metadata().ok_or_else(|| {
                    ServerError::Internal(format!("stored record {identity} has no metadata"))
                })?;
                if client.as_deref() != Some(metadata.change_tag.as_str()) {
                    return Err(ServerError::VersionMismatch {
                        server: metadata.change_tag.clone(),
                        client: client.clone(),
                        current: Box::new(current.clone()),
                        identity,
                    });
                }
                metadata.created_at
            }
        };

        let stored = stamp(record, created_at);
        records.insert(identity, stored.clone());
        Ok(stored)
    }

    /// Stores a record unconditionally, replacing any existing version.
    pub fn put(&self, record: &Record) -> Record {
        let mut records = self.records.write();
        let created_at = records
            .get(record.identity())
            .and_then(|r| r.metadata().map(|m| m.created_at))
            .unwrap_or_else(now_millis);
        let stored = stamp(record, created_at);
        records.insert(record.identity().clone(), stored.clone());
        stored
    }

    /// Removes a record.
    pub fn remove(&self, identity: &RemoteIdentity) -> ServerResult<Record> {
        self.records
            .write()
            .remove(identity)
            .ok_or_else(|| ServerError::NotFound(identity.clone()))
    }

    /// Removes every record.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

fn stamp(record: &Record, created_at: i64) -> Record {
    let metadata = RecordMetadata::new(record.identity().clone(), Uuid::new_v4().to_string())
        .with_timestamps(created_at, now_millis());
    record.clone().with_metadata(Some(metadata))
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(key: &str) -> Record {
        Record::new(RemoteIdentity::new("Station", key).unwrap()).with_field("name", key)
    }

    #[test]
    fn insert_assigns_metadata() {
        let table = RecordTable::new();
        let stored = table.write(&station("1")).unwrap();
        let metadata = stored.metadata().unwrap();
        assert!(!metadata.change_tag.is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn update_requires_current_tag() {
        let table = RecordTable::new();
        let first = table.write(&station("1")).unwrap();

        let updated = table
            .write(&first.clone().with_field("name", "renamed"))
            .unwrap();
        assert_ne!(
            updated.metadata().unwrap().change_tag,
            first.metadata().unwrap().change_tag
        );
        assert_eq!(
            updated.metadata().unwrap().created_at,
            first.metadata().unwrap().created_at
        );

        let err = table.write(&first).unwrap_err();
        assert!(matches!(err, ServerError::VersionMismatch { .. }));
    }

    #[test]
    fn insert_over_existing_conflicts() {
        let table = RecordTable::new();
        table.write(&station("1")).unwrap();
        let err = table.write(&station("1")).unwrap_err();
        assert!(matches!(err, ServerError::VersionMismatch { client: None, .. }));
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let table = RecordTable::new();
        let ghost = station("9").with_metadata(Some(RecordMetadata::new(
            RemoteIdentity::new("Station", "9").unwrap(),
            "old",
        )));
        assert!(matches!(
            table.write(&ghost),
            Err(ServerError::NotFound(_))
        ));
    }

    #[test]
    fn scan_pages_in_identity_order() {
        let table = RecordTable::new();
        for key in ["c", "a", "b", "d"] {
            table.put(&station(key));
        }
        table.put(&Record::new(RemoteIdentity::new("Brand", "x").unwrap()));

        let (page, more) = table.scan("Station", &Predicate::All, None, 3);
        let keys: Vec<_> = page.iter().map(|r| r.identity().key().to_string()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert!(more);

        let after = page.last().unwrap().identity().clone();
        let (page, more) = table.scan("Station", &Predicate::All, Some(&after), 3);
        assert_eq!(page.len(), 1);
        assert!(!more);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let table = RecordTable::new();
        table.put(&station("1"));
        table.remove(station("1").identity()).unwrap();
        assert!(table.remove(station("1").identity()).is_err());
        assert!(table.is_empty());
    }
}
