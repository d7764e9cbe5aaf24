//! Store adapters for integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use recordsync_codec::{Record, RemoteIdentity};
use recordsync_engine::RemoteRecordStore;
use recordsync_protocol::{Cursor, Query, QueryOptions, QueryPage, StoreError, StoreResult};
use recordsync_server::RecordServer;
use std::collections::HashMap;
use std::sync::Arc;

/// Exposes a [`RecordServer`] as a remote record store.
#[derive(Clone)]
pub struct ServerStore {
    server: Arc<RecordServer>,
}

impl ServerStore {
    /// Wraps a server.
    pub fn new(server: RecordServer) -> Self {
        Self::shared(Arc::new(server))
    }

    /// Wraps a shared server.
    pub fn shared(server: Arc<RecordServer>) -> Self {
        Self { server }
    }

    /// Returns the server.
    pub fn server(&self) -> &Arc<RecordServer> {
        &self.server
    }
}

#[async_trait]
impl RemoteRecordStore for ServerStore {
    async fn fetch(&self, identity: &RemoteIdentity) -> StoreResult<Record> {
        Ok(self.server.handle_fetch(identity)?)
    }

    async fn query(&self, query: &Query) -> StoreResult<QueryPage> {
        Ok(self.server.handle_query(query)?)
    }

    async fn query_continue(
        &self,
        cursor: &Cursor,
        options: &QueryOptions,
    ) -> StoreResult<QueryPage> {
        Ok(self.server.handle_query_continue(cursor, options)?)
    }

    async fn save(&self, record: &Record) -> StoreResult<Record> {
        Ok(self.server.handle_save(record)?)
    }

    async fn delete(&self, identity: &RemoteIdentity) -> StoreResult<()> {
        Ok(self.server.handle_delete(identity)?)
    }
}

/// Store operations a fault can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `fetch`.
    Fetch,
    /// `query` and `query_continue`.
    Query,
    /// `save`.
    Save,
    /// `delete`.
    Delete,
}

#[derive(Debug, Default)]
struct FaultPlan {
    calls: HashMap<Operation, usize>,
    scheduled: Vec<(Operation, usize, StoreError)>,
    permanent: HashMap<Operation, StoreError>,
}

impl FaultPlan {
    fn next_call(&mut self, operation: Operation) -> Option<StoreError> {
        let call = {
            let count = self.calls.entry(operation).or_insert(0);
            *count += 1;
            *count
        };
        if let Some(pos) = self
            .scheduled
            .iter()
            .position(|(op, n, _)| *op == operation && *n == call)
        {
            return Some(self.scheduled.remove(pos).2);
        }
        self.permanent.get(&operation).cloned()
    }
}

/// Wraps a store and injects failures into chosen calls.
///
/// Calls are counted per operation, starting at 1. A faulted call never
/// reaches the inner store.
#[derive(Clone)]
pub struct FlakyStore<S> {
    inner: S,
    plan: Arc<Mutex<FaultPlan>>,
}

impl<S: RemoteRecordStore> FlakyStore<S> {
    /// Wraps a store with no faults planned.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            plan: Arc::new(Mutex::new(FaultPlan::default())),
        }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Makes the `call`-th call of an operation fail.
    pub fn fail_call(&self, operation: Operation, call: usize, error: StoreError) {
        self.plan.lock().scheduled.push((operation, call, error));
    }

    /// Makes every call of an operation fail until cleared.
    pub fn fail_always(&self, operation: Operation, error: StoreError) {
        self.plan.lock().permanent.insert(operation, error);
    }

    /// Removes every planned fault.
    pub fn clear_faults(&self) {
        let mut plan = self.plan.lock();
        plan.scheduled.clear();
        plan.permanent.clear();
    }

    /// Number of calls made for an operation, faulted or not.
    pub fn calls(&self, operation: Operation) -> usize {
        self.plan.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    fn fault(&self, operation: Operation) -> StoreResult<()> {
        match self.plan.lock().next_call(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<S: RemoteRecordStore> RemoteRecordStore for FlakyStore<S> {
    async fn fetch(&self, identity: &RemoteIdentity) -> StoreResult<Record> {
        self.fault(Operation::Fetch)?;
        self.inner.fetch(identity).await
    }

    async fn query(&self, query: &Query) -> StoreResult<QueryPage> {
        self.fault(Operation::Query)?;
        self.inner.query(query).await
    }

    async fn query_continue(
        &self,
        cursor: &Cursor,
        options: &QueryOptions,
    ) -> StoreResult<QueryPage> {
        self.fault(Operation::Query)?;
        self.inner.query_continue(cursor, options).await
    }

    async fn save(&self, record: &Record) -> StoreResult<Record> {
        self.fault(Operation::Save)?;
        self.inner.save(record).await
    }

    async fn delete(&self, identity: &RemoteIdentity) -> StoreResult<()> {
        self.fault(Operation::Delete)?;
        self.inner.delete(identity).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{seeded_server, station_record};

    #[tokio::test]
    async fn server_store_maps_errors() {
        let store = ServerStore::new(seeded_server(1));
        let missing = RemoteIdentity::new("Station", "AT|99").unwrap();
        assert_eq!(
            store.fetch(&missing).await,
            Err(StoreError::UnknownItem(missing))
        );

        let err = store.save(&station_record(1, "dup")).await.unwrap_err();
        assert!(matches!(err, StoreError::ServerRecordChanged { .. }));
    }

    #[tokio::test]
    async fn flaky_store_fails_chosen_call() {
        let store = FlakyStore::new(ServerStore::new(seeded_server(1)));
        store.fail_call(Operation::Query, 2, StoreError::NetworkUnavailable);
        let query = Query::all("Station");

        assert!(store.query(&query).await.is_ok());
        assert_eq!(
            store.query(&query).await,
            Err(StoreError::NetworkUnavailable)
        );
        assert!(store.query(&query).await.is_ok());
        assert_eq!(store.calls(Operation::Query), 3);
    }

    #[tokio::test]
    async fn flaky_store_permanent_fault() {
        let store = FlakyStore::new(ServerStore::new(seeded_server(1)));
        store.fail_always(Operation::Save, StoreError::QuotaExceeded);
        for _ in 0..3 {
            assert_eq!(
                store.save(&station_record(5, "x")).await,
                Err(StoreError::QuotaExceeded)
            );
        }
        store.clear_faults();
        assert!(store.save(&station_record(5, "x")).await.is_ok());
        assert_eq!(store.inner().server().record_count(), 2);
    }
}
