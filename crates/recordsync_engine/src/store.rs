//! Remote record store abstraction.
//!
//! The engine talks to the remote store only through
//! [`RemoteRecordStore`]. Implementations map their native failures into
//! [`StoreError`] so the engine can classify them.

use async_trait::async_trait;
use parking_lot::Mutex;
use recordsync_codec::{Record, RemoteIdentity};
use recordsync_protocol::{Cursor, Query, QueryOptions, QueryPage, StoreError, StoreResult};
use std::collections::VecDeque;
use std::sync::Arc;

/// A remote record store with per-record optimistic concurrency.
#[async_trait]
pub trait RemoteRecordStore: Send + Sync {
    /// Fetches one record by identity.
    async fn fetch(&self, identity: &RemoteIdentity) -> StoreResult<Record>;

    /// Issues a bulk query and returns its first page.
    async fn query(&self, query: &Query) -> StoreResult<QueryPage>;

    /// Requests the page that follows `cursor`.
    async fn query_continue(
        &self,
        cursor: &Cursor,
        options: &QueryOptions,
    ) -> StoreResult<QueryPage>;

    /// Saves a record.
    ///
    /// A record without metadata is an insert. A record with metadata must
    /// match the server's current version or the save fails with
    /// `ServerRecordChanged`. Returns the record as stored, with fresh
    /// metadata.
    async fn save(&self, record: &Record) -> StoreResult<Record>;

    /// Deletes a record by identity.
    async fn delete(&self, identity: &RemoteIdentity) -> StoreResult<()>;
}

#[async_trait]
impl<S: RemoteRecordStore + ?Sized> RemoteRecordStore for Arc<S> {
    async fn fetch(&self, identity: &RemoteIdentity) -> StoreResult<Record> {
        (**self).fetch(identity).await
    }

    async fn query(&self, query: &Query) -> StoreResult<QueryPage> {
        (**self).query(query).await
    }

    async fn query_continue(
        &self,
        cursor: &Cursor,
        options: &QueryOptions,
    ) -> StoreResult<QueryPage> {
        (**self).query_continue(cursor, options).await
    }

    async fn save(&self, record: &Record) -> StoreResult<Record> {
        (**self).save(record).await
    }

    async fn delete(&self, identity: &RemoteIdentity) -> StoreResult<()> {
        (**self).delete(identity).await
    }
}

/// A page request observed by [`MockStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest {
    /// An initial query.
    Query(Query),
    /// A continuation by cursor.
    Continue(Cursor),
}

/// A scripted store for testing.
///
/// Responses are queued per operation and handed out in order. A call with
/// an empty queue fails with `StoreError::Other`. Every request is recorded
/// for verification.
#[derive(Debug, Default, Clone)]
pub struct MockStore {
    inner: Arc<Mutex<MockStoreInner>>,
}

#[derive(Debug, Default)]
struct MockStoreInner {
    fetch_queue: VecDeque<StoreResult<Record>>,
    page_queue: VecDeque<StoreResult<QueryPage>>,
    save_queue: VecDeque<StoreResult<Record>>,
    delete_queue: VecDeque<StoreResult<()>>,
    fetched: Vec<RemoteIdentity>,
    pages: Vec<PageRequest>,
    saved: Vec<Record>,
    deleted: Vec<RemoteIdentity>,
}

impl MockStore {
    /// Creates an empty mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for the next `fetch`.
    pub fn queue_fetch(&self, response: StoreResult<Record>) {
        self.inner.lock().fetch_queue.push_back(response);
    }

    /// Queues a response for the next `query` or `query_continue`.
    pub fn queue_page(&self, response: StoreResult<QueryPage>) {
        self.inner.lock().page_queue.push_back(response);
    }

    /// Queues a response for the next `save`.
    pub fn queue_save(&self, response: StoreResult<Record>) {
        self.inner.lock().save_queue.push_back(response);
    }

    /// Queues a response for the next `delete`.
    pub fn queue_delete(&self, response: StoreResult<()>) {
        self.inner.lock().delete_queue.push_back(response);
    }

    /// Identities passed to `fetch`, in call order.
    pub fn fetched(&self) -> Vec<RemoteIdentity> {
        self.inner.lock().fetched.clone()
    }

    /// Page requests, in call order.
    pub fn page_requests(&self) -> Vec<PageRequest> {
        self.inner.lock().pages.clone()
    }

    /// Records passed to `save`, in call order.
    pub fn saved(&self) -> Vec<Record> {
        self.inner.lock().saved.clone()
    }

    /// Identities passed to `delete`, in call order.
    pub fn deleted(&self) -> Vec<RemoteIdentity> {
        self.inner.lock().deleted.clone()
    }

    /// Total number of store calls of any kind.
    pub fn call_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.fetched.len() + inner.pages.len() + inner.saved.len() + inner.deleted.len()
    }
}

fn unscripted<T>(operation: &str) -> StoreResult<T> {
    Err(StoreError::Other(format!("no scripted {operation} response")))
}

#[async_trait]
impl RemoteRecordStore for MockStore {
    async fn fetch(&self, identity: &RemoteIdentity) -> StoreResult<Record> {
        let mut inner = self.inner.lock();
        inner.fetched.push(identity.clone());
        inner
            .fetch_queue
            .pop_front()
            .unwrap_or_else(|| unscripted("fetch"))
    }

    async fn query(&self, query: &Query) -> StoreResult<QueryPage> {
        let mut inner = self.inner.lock();
        inner.pages.push(PageRequest::Query(query.clone()));
        inner
            .page_queue
            .pop_front()
            .unwrap_or_else(|| unscripted("query"))
    }

    async fn query_continue(
        &self,
        cursor: &Cursor,
        _options: &QueryOptions,
    ) -> StoreResult<QueryPage> {
        let mut inner = self.inner.lock();
        inner.pages.push(PageRequest::Continue(cursor.clone()));
        inner
            .page_queue
            .pop_front()
            .unwrap_or_else(|| unscripted("query"))
    }

    async fn save(&self, record: &Record) -> StoreResult<Record> {
        let mut inner = self.inner.lock();
        inner.saved.push(record.clone());
        inner
            .save_queue
            .pop_front()
            .unwrap_or_else(|| unscripted("save"))
    }

    async fn delete(&self, identity: &RemoteIdentity) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.deleted.push(identity.clone());
        inner
            .delete_queue
            .pop_front()
            .unwrap_or_else(|| unscripted("delete"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(key: &str) -> RemoteIdentity {
        RemoteIdentity::new("Station", key).unwrap()
    }

    #[tokio::test]
    async fn mock_store_hands_out_responses_in_order() {
        let store = MockStore::new();
        store.queue_fetch(Err(StoreError::NetworkUnavailable));
        store.queue_fetch(Ok(Record::new(identity("1"))));

        assert_eq!(
            store.fetch(&identity("1")).await,
            Err(StoreError::NetworkUnavailable)
        );
        assert!(store.fetch(&identity("1")).await.is_ok());
        assert_eq!(store.fetched().len(), 2);
    }

    #[tokio::test]
    async fn mock_store_unscripted_call_fails() {
        let store = MockStore::new();
        let result = store.delete(&identity("1")).await;
        assert!(matches!(result, Err(StoreError::Other(_))));
        assert_eq!(store.deleted(), vec![identity("1")]);
    }

    #[tokio::test]
    async fn mock_store_records_page_requests() {
        let store = MockStore::new();
        store.queue_page(Ok(QueryPage::new(vec![], Some(Cursor::new("c1")))));
        store.queue_page(Ok(QueryPage::last(vec![])));

        let query = Query::all("Station");
        store.query(&query).await.unwrap();
        store
            .query_continue(&Cursor::new("c1"), &query.options)
            .await
            .unwrap();

        assert_eq!(
            store.page_requests(),
            vec![
                PageRequest::Query(query),
                PageRequest::Continue(Cursor::new("c1"))
            ]
        );
        assert_eq!(store.call_count(), 2);
    }

    #[tokio::test]
    async fn arc_store_delegates() {
        let store = Arc::new(MockStore::new());
        store.queue_save(Ok(Record::new(identity("2"))));
        let shared: Arc<dyn RemoteRecordStore> = store.clone();
        shared.save(&Record::new(identity("2"))).await.unwrap();
        assert_eq!(store.saved().len(), 1);
    }
}
