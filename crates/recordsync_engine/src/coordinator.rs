//! Entry point tying the store, caches, retries and notifications together.

use crate::cache::SyncedEntityCache;
use crate::classify::ErrorKind;
use crate::completion::CompletionQueue;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::notify::NotificationBus;
use crate::paginator::BulkQueryPaginator;
use crate::retry::RetryPolicy;
use crate::store::RemoteRecordStore;
use parking_lot::RwLock;
use recordsync_codec::{EntityCodec, Record, RemoteIdentity};
use recordsync_protocol::{Query, QueryOptions, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Statistics about sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Cache refreshes that completed.
    pub refreshes_completed: u64,
    /// Records received from bulk queries.
    pub records_fetched: u64,
    /// Records dropped because they could not be decoded.
    pub records_skipped: u64,
    /// Successful uploads.
    pub uploads: u64,
    /// Successful downloads, including unknown items.
    pub downloads: u64,
    /// Successful deletes.
    pub deletes: u64,
    /// Upload conflicts reconciled.
    pub conflicts_resolved: u64,
    /// Store calls repeated after a backoff.
    pub retries: u64,
    /// Time of the last completed refresh.
    pub last_refresh: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Result of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The remote record was applied.
    Updated {
        /// Whether any local field changed.
        changed: bool,
    },
    /// The record does not exist remotely; local metadata was cleared.
    NotFound,
}

/// Result of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    /// Store calls made, including the successful one.
    pub attempts: u32,
    /// Conflicts reconciled along the way.
    pub conflicts_resolved: u32,
}

/// Coordinates remote store access for every entity type.
///
/// Remote work runs on the background runtime; completion callbacks run on
/// the [`CompletionQueue`].
pub struct SyncCoordinator<S: RemoteRecordStore> {
    store: Arc<S>,
    config: SyncConfig,
    policy: RetryPolicy,
    notifications: NotificationBus,
    completions: CompletionQueue,
    background: Handle,
    stats: RwLock<SyncStats>,
}

impl<S: RemoteRecordStore + 'static> SyncCoordinator<S> {
    /// Creates a coordinator on the current runtime.
    pub fn new(store: S, config: SyncConfig) -> SyncResult<Self> {
        let background = Handle::try_current().map_err(|e| SyncError::Background(e.to_string()))?;
        let completions = CompletionQueue::start(&background);
        Ok(Self::with_runtime(store, config, background, completions))
    }

    /// Creates a coordinator with an explicit background runtime and
    /// completion queue.
    pub fn with_runtime(
        store: S,
        config: SyncConfig,
        background: Handle,
        completions: CompletionQueue,
    ) -> Self {
        Self {
            store: Arc::new(store),
            policy: RetryPolicy::new(config.retry.clone()),
            notifications: NotificationBus::new(config.notification_capacity),
            completions,
            background,
            config,
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Returns the store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the notification bus.
    pub fn notifications(&self) -> &NotificationBus {
        &self.notifications
    }

    /// Returns the completion queue.
    pub fn completions(&self) -> &CompletionQueue {
        &self.completions
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Creates a cache for an entity type using the configured refresh mode.
    pub fn new_cache<E: EntityCodec>(&self, defaults: HashMap<E::Key, E>) -> SyncedEntityCache<E> {
        SyncedEntityCache::with_mode(defaults, self.config.refresh_mode)
    }

    /// Fetches every record matching a query, following all pages.
    pub async fn fetch_all(&self, query: &Query) -> SyncResult<Vec<Record>> {
        let paginator = BulkQueryPaginator::new(self.store.as_ref(), &self.policy);
        let result = paginator.fetch_all(query).await;

        let mut stats = self.stats.write();
        stats.retries += u64::from(paginator.retries());
        match result {
            Ok(records) => {
                stats.records_fetched += records.len() as u64;
                Ok(records)
            }
            Err(e) => {
                stats.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Fetches and decodes every entity of a type.
    ///
    /// Records that fail to decode are skipped and logged.
    pub async fn fetch_entities<E: EntityCodec>(&self) -> SyncResult<HashMap<E::Key, E>> {
        let mut options = QueryOptions::default();
        if let Some(size) = self.config.page_size {
            options = options.with_results_limit(size);
        }
        let query = Query::all(E::RECORD_TYPE).with_options(options);
        let records = self.fetch_all(&query).await?;

        let mut entities = HashMap::with_capacity(records.len());
        let mut skipped = 0u64;
        for record in &records {
            match E::from_record(record) {
                Ok(entity) => {
                    entities.insert(entity.natural_key(), entity);
                }
                Err(e) => {
                    skipped += 1;
                    warn!(
                        record_type = E::RECORD_TYPE,
                        identity = %record.identity(),
                        error = %e,
                        "skipping undecodable record"
                    );
                }
            }
        }
        if skipped > 0 {
            self.stats.write().records_skipped += skipped;
        }
        Ok(entities)
    }

    /// Refreshes a cache from the store.
    ///
    /// On success the whole cache is replaced and a notification for the
    /// entity type is broadcast after the cache lock is released.
    pub async fn retrieve<E: EntityCodec>(&self, cache: &SyncedEntityCache<E>) -> SyncResult<usize> {
        let started = Instant::now();
        match cache.refresh(|| self.fetch_entities::<E>()).await {
            Ok(count) => {
                {
                    let mut stats = self.stats.write();
                    stats.refreshes_completed += 1;
                    stats.last_refresh = Some(Instant::now());
                }
                self.notifications.notify(E::RECORD_TYPE);
                info!(
                    record_type = E::RECORD_TYPE,
                    entities = count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "cache refreshed"
                );
                Ok(count)
            }
            Err(e) => {
                warn!(record_type = E::RECORD_TYPE, error = %e, "cache refresh failed");
                Err(e)
            }
        }
    }

    /// Refreshes a cache on the background runtime and hands the result to
    /// `callback` on the completion queue.
    pub fn spawn_retrieve<E, F>(
        self: &Arc<Self>,
        cache: Arc<SyncedEntityCache<E>>,
        callback: F,
    ) -> JoinHandle<()>
    where
        E: EntityCodec,
        F: FnOnce(SyncResult<usize>) + Send + 'static,
    {
        let coordinator = Arc::clone(self);
        self.background.spawn(async move {
            let result = coordinator.retrieve(&cache).await;
            if let Err(e) = coordinator.completions.post(move || callback(result)) {
                error!(record_type = E::RECORD_TYPE, error = %e, "refresh completion dropped");
            }
        })
    }

    /// Downloads the remote state of an entity into it.
    ///
    /// An entity the store does not know has its metadata cleared and the
    /// download still succeeds.
    pub async fn download<E: EntityCodec>(&self, entity: &mut E) -> SyncResult<DownloadOutcome> {
        let identity = entity.remote_identity();
        let mut attempt = 0u32;

        loop {
            debug!(identity = %identity, attempt, "fetching record");
            match self.store.fetch(&identity).await {
                Ok(record) => {
                    let changed = entity.apply(&record)?;
                    self.stats.write().downloads += 1;
                    return Ok(DownloadOutcome::Updated { changed });
                }
                Err(StoreError::UnknownItem(_)) => {
                    entity.set_remote_metadata(None);
                    self.stats.write().downloads += 1;
                    debug!(identity = %identity, "record unknown remotely, metadata cleared");
                    return Ok(DownloadOutcome::NotFound);
                }
                Err(error) => {
                    if let Some(record) = returned_record(&error, &identity) {
                        let changed = entity.apply(record)?;
                        self.stats.write().downloads += 1;
                        return Ok(DownloadOutcome::Updated { changed });
                    }
                    self.retry_or_fail("fetch", error, attempt).await?;
                    attempt += 1;
                }
            }
        }
    }

    /// Uploads an entity, reconciling conflicts until it is accepted.
    ///
    /// On success the entity adopts the metadata the store returned.
    pub async fn upload<E: EntityCodec>(&self, entity: &mut E) -> SyncResult<UploadReport> {
        let identity = entity.remote_identity();
        let mut conflicts = 0u32;
        let mut attempt = 0u32;

        loop {
            let record = entity.encode();
            debug!(
                identity = %identity,
                attempt,
                insert = record.metadata().is_none(),
                "saving record"
            );
            match self.store.save(&record).await {
                Ok(saved) => {
                    entity.set_remote_metadata(saved.metadata().cloned());
                    return Ok(self.uploaded(attempt, conflicts));
                }
                Err(error) => {
                    if let Some(returned) = returned_record(&error, &identity) {
                        entity.apply(returned)?;
                        return Ok(self.uploaded(attempt, conflicts));
                    }
                    match ErrorKind::of(&error) {
                        ErrorKind::Conflict => {
                            self.attempts_left(attempt, error)?;
                            debug!(identity = %identity, attempt, "save conflict, reconciling");
                            self.reconcile(entity).await?;
                            conflicts += 1;
                        }
                        ErrorKind::UnknownItem => {
                            self.attempts_left(attempt, error)?;
                            debug!(identity = %identity, "record vanished, retrying as insert");
                            entity.set_remote_metadata(None);
                        }
                        _ => self.retry_or_fail("save", error, attempt).await?,
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Uploads an entity only if it differs from `remote`.
    ///
    /// Returns `None` when nothing needed saving.
    pub async fn upload_if_changed<E: EntityCodec>(
        &self,
        entity: &mut E,
        remote: &Record,
    ) -> SyncResult<Option<UploadReport>> {
        if !entity.changed(remote) {
            debug!(identity = %entity.remote_identity(), "entity unchanged, skipping save");
            return Ok(None);
        }
        self.upload(entity).await.map(Some)
    }

    /// Deletes an entity remotely and clears its metadata.
    ///
    /// A record that is already gone counts as deleted.
    pub async fn delete<E: EntityCodec>(&self, entity: &mut E) -> SyncResult<()> {
        let identity = entity.remote_identity();
        let mut attempt = 0u32;

        loop {
            match self.store.delete(&identity).await {
                Ok(()) | Err(StoreError::UnknownItem(_)) => {
                    entity.set_remote_metadata(None);
                    self.stats.write().deletes += 1;
                    debug!(identity = %identity, "record deleted");
                    return Ok(());
                }
                Err(error) => {
                    self.retry_or_fail("delete", error, attempt).await?;
                    attempt += 1;
                }
            }
        }
    }

    async fn reconcile<E: EntityCodec>(&self, entity: &mut E) -> SyncResult<()> {
        if self.config.conflict_policy.adopts_remote_fields() {
            self.download(entity).await.map_err(|e| self.failed(e))?;
        } else {
            let mut remote = entity.clone();
            self.download(&mut remote)
                .await
                .map_err(|e| self.failed(e))?;
            entity.set_remote_metadata(remote.remote_metadata().cloned());
        }
        Ok(())
    }

    async fn retry_or_fail(
        &self,
        operation: &'static str,
        error: StoreError,
        attempt: u32,
    ) -> SyncResult<()> {
        match self.policy.backoff_or_fail(operation, error, attempt).await {
            Ok(()) => {
                self.stats.write().retries += 1;
                Ok(())
            }
            Err(e) => Err(self.failed(e)),
        }
    }

    fn attempts_left(&self, attempt: u32, error: StoreError) -> SyncResult<()> {
        self.policy
            .ensure_attempts_left(attempt, error)
            .map(|_| ())
            .map_err(|e| self.failed(e))
    }

    fn uploaded(&self, attempt: u32, conflicts: u32) -> UploadReport {
        let mut stats = self.stats.write();
        stats.uploads += 1;
        stats.conflicts_resolved += u64::from(conflicts);
        UploadReport {
            attempts: attempt + 1,
            conflicts_resolved: conflicts,
        }
    }

    fn failed(&self, error: SyncError) -> SyncError {
        self.stats.write().last_error = Some(error.to_string());
        error
    }
}

/// Picks the record for `identity` out of a partial failure.
fn returned_record<'a>(error: &'a StoreError, identity: &RemoteIdentity) -> Option<&'a Record> {
    match error {
        StoreError::PartialFailure { records, .. } => {
            records.iter().find(|record| record.identity() == identity)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheState;
    use crate::config::RetryConfig;
    use crate::store::MockStore;
    use crate::testing::{pump, pump_defaults, pump_record, tag, Pump};
    use recordsync_protocol::{ConflictPolicy, QueryPage};
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn coordinator(store: MockStore) -> SyncCoordinator<MockStore> {
        SyncCoordinator::new(store, SyncConfig::default()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn retrieve_warms_cache_and_notifies() {
        let store = MockStore::new();
        store.queue_page(Ok(QueryPage::last(vec![
            pump_record(1, "north", Some("t1")),
            pump_record(2, "south", Some("t1")),
        ])));
        let sync = coordinator(store);
        let cache = sync.new_cache(pump_defaults());
        let mut events = sync.notifications().subscribe_to(Pump::RECORD_TYPE);

        assert_eq!(sync.retrieve(&cache).await.unwrap(), 2);
        assert_eq!(cache.state(), CacheState::Warm);
        assert_eq!(cache.get(&1).unwrap().label, "north");
        assert_eq!(events.recv().await.unwrap().record_type, "Pump");

        let stats = sync.stats();
        assert_eq!(stats.refreshes_completed, 1);
        assert_eq!(stats.records_fetched, 2);
        assert!(stats.last_refresh.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_records_are_skipped() {
        let store = MockStore::new();
        let broken = Record::new(Pump::identity(&9)).with_field("label", 5i64);
        store.queue_page(Ok(QueryPage::last(vec![
            pump_record(1, "north", None),
            broken,
        ])));
        let sync = coordinator(store);
        let cache = sync.new_cache(pump_defaults());

        assert_eq!(sync.retrieve(&cache).await.unwrap(), 1);
        assert_eq!(sync.stats().records_skipped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_retrieve_does_not_notify() {
        let store = MockStore::new();
        store.queue_page(Err(StoreError::NotAuthenticated));
        let sync = coordinator(store);
        let cache = sync.new_cache(pump_defaults());
        let mut events = sync.notifications().subscribe();

        let err = sync.retrieve(&cache).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Rejected));
        assert_eq!(cache.state(), CacheState::Cold);
        assert!(events.try_recv().is_none());
        assert!(sync.stats().last_error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_retrieve_reports_on_completion_queue() {
        let store = MockStore::new();
        store.queue_page(Ok(QueryPage::last(vec![pump_record(4, "east", None)])));
        let sync = Arc::new(coordinator(store));
        let cache = Arc::new(sync.new_cache(pump_defaults()));

        let (tx, rx) = oneshot::channel();
        sync.spawn_retrieve(Arc::clone(&cache), move |result| {
            let _ = tx.send(result);
        })
        .await
        .unwrap();

        assert_eq!(rx.await.unwrap(), Ok(1));
        assert_eq!(cache.get(&4).unwrap().label, "east");
    }

    #[tokio::test(start_paused = true)]
    async fn download_applies_remote_state() {
        let store = MockStore::new();
        store.queue_fetch(Err(StoreError::NetworkFailure("reset".into())));
        store.queue_fetch(Ok(pump_record(1, "remote", Some("t7"))));
        let sync = coordinator(store.clone());

        let mut local = pump(1, "local");
        let outcome = sync.download(&mut local).await.unwrap();

        assert_eq!(outcome, DownloadOutcome::Updated { changed: true });
        assert_eq!(local.label, "remote");
        assert_eq!(local.metadata, Some(tag(1, "t7")));
        assert_eq!(store.fetched().len(), 2);
        assert_eq!(sync.stats().retries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn download_unknown_item_clears_metadata() {
        let store = MockStore::new();
        store.queue_fetch(Err(StoreError::UnknownItem(Pump::identity(&1))));
        let sync = coordinator(store);

        let mut local = pump(1, "local");
        local.metadata = Some(tag(1, "t1"));
        assert_eq!(
            sync.download(&mut local).await.unwrap(),
            DownloadOutcome::NotFound
        );
        assert_eq!(local.metadata, None);
        assert_eq!(local.label, "local");
    }

    #[tokio::test(start_paused = true)]
    async fn download_non_retryable_fails_immediately() {
        let store = MockStore::new();
        store.queue_fetch(Err(StoreError::PermissionFailure("denied".into())));
        let sync = coordinator(store.clone());

        let err = sync.download(&mut pump(1, "local")).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Rejected));
        assert_eq!(store.fetched().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_adopts_returned_metadata() {
        let store = MockStore::new();
        store.queue_save(Ok(pump_record(1, "local", Some("t2"))));
        let sync = coordinator(store.clone());

        let mut local = pump(1, "local");
        let report = sync.upload(&mut local).await.unwrap();

        assert_eq!(report.attempts, 1);
        assert_eq!(local.metadata, Some(tag(1, "t2")));
        assert!(store.saved()[0].metadata().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn upload_conflict_downloads_then_retries() {
        let store = MockStore::new();
        store.queue_save(Err(StoreError::conflict(None)));
        store.queue_fetch(Ok(pump_record(1, "server", Some("t5"))));
        store.queue_save(Ok(pump_record(1, "server", Some("t6"))));
        let sync = coordinator(store.clone());

        let mut local = pump(1, "local");
        local.metadata = Some(tag(1, "t4"));
        let report = sync.upload(&mut local).await.unwrap();

        assert_eq!(report.conflicts_resolved, 1);
        assert_eq!(report.attempts, 2);
        assert_eq!(local.label, "server");
        assert_eq!(local.metadata, Some(tag(1, "t6")));

        let saved = store.saved();
        assert_eq!(saved[1].metadata(), Some(&tag(1, "t5")));
        assert_eq!(sync.stats().conflicts_resolved, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn client_wins_keeps_local_fields() {
        let store = MockStore::new();
        store.queue_save(Err(StoreError::conflict(None)));
        store.queue_fetch(Ok(pump_record(1, "server", Some("t5"))));
        store.queue_save(Ok(pump_record(1, "local", Some("t6"))));
        let config = SyncConfig::default().with_conflict_policy(ConflictPolicy::ClientWins);
        let sync = SyncCoordinator::new(store.clone(), config).unwrap();

        let mut local = pump(1, "local");
        sync.upload(&mut local).await.unwrap();

        let saved = store.saved();
        assert_eq!(saved[1].text("label").unwrap(), Some("local"));
        assert_eq!(saved[1].metadata(), Some(&tag(1, "t5")));
        assert_eq!(local.label, "local");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reconcile_records_last_error() {
        let store = MockStore::new();
        store.queue_save(Err(StoreError::conflict(None)));
        store.queue_fetch(Ok(Record::new(Pump::identity(&1)).with_field("label", 5i64)));
        let sync = coordinator(store.clone());

        let err = sync.upload(&mut pump(1, "local")).await.unwrap_err();
        assert!(matches!(err, SyncError::Codec(_)));
        assert_eq!(sync.stats().last_error, Some(err.to_string()));
        assert_eq!(store.saved().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn download_clears_fields_missing_remotely() {
        let store = MockStore::new();
        store.queue_fetch(Ok(pump_record(1, "north", Some("t2"))));
        let sync = coordinator(store);

        let mut local = pump(1, "north");
        local.price = Some(1.599);
        let outcome = sync.download(&mut local).await.unwrap();

        assert_eq!(outcome, DownloadOutcome::Updated { changed: true });
        assert_eq!(local.price, None);
        assert_eq!(local.metadata, Some(tag(1, "t2")));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_unknown_item_retries_as_insert() {
        let store = MockStore::new();
        store.queue_save(Err(StoreError::UnknownItem(Pump::identity(&1))));
        store.queue_save(Ok(pump_record(1, "local", Some("n1"))));
        let sync = coordinator(store.clone());

        let mut local = pump(1, "local");
        local.metadata = Some(tag(1, "stale"));
        sync.upload(&mut local).await.unwrap();

        let saved = store.saved();
        assert!(saved[0].metadata().is_some());
        assert!(saved[1].metadata().is_none());
        assert_eq!(local.metadata, Some(tag(1, "n1")));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_rate_limit_honors_hint() {
        let store = MockStore::new();
        store.queue_save(Err(StoreError::rate_limited(Duration::from_secs(7))));
        store.queue_save(Ok(pump_record(1, "local", Some("t1"))));
        let sync = coordinator(store);

        let start = tokio::time::Instant::now();
        sync.upload(&mut pump(1, "local")).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_partial_failure_with_record_succeeds() {
        let store = MockStore::new();
        store.queue_save(Err(StoreError::partial(
            "1 of 2 failed",
            vec![pump_record(1, "accepted", Some("t3"))],
        )));
        let sync = coordinator(store.clone());

        let mut local = pump(1, "local");
        sync.upload(&mut local).await.unwrap();
        assert_eq!(local.label, "accepted");
        assert_eq!(local.metadata, Some(tag(1, "t3")));
        assert_eq!(store.saved().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_gives_up_at_ceiling() {
        let store = MockStore::new();
        for _ in 0..3 {
            store.queue_save(Err(StoreError::ZoneBusy { retry_after: None }));
        }
        let config = SyncConfig::default().with_retry(RetryConfig::new(3));
        let sync = SyncCoordinator::new(store.clone(), config).unwrap();

        let start = tokio::time::Instant::now();
        let err = sync.upload(&mut pump(1, "local")).await.unwrap_err();
        assert!(matches!(err, SyncError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(store.saved().len(), 3);
        // 1s + 2s of backoff between the three calls
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_if_changed_skips_identical() {
        let store = MockStore::new();
        let sync = coordinator(store.clone());

        let mut local = pump(1, "same");
        let remote = pump_record(1, "same", Some("t1"));
        assert_eq!(sync.upload_if_changed(&mut local, &remote).await.unwrap(), None);
        assert!(store.saved().is_empty());

        store.queue_save(Ok(pump_record(1, "different", Some("t2"))));
        let mut edited = pump(1, "different");
        assert!(sync
            .upload_if_changed(&mut edited, &remote)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_treats_unknown_as_success() {
        let store = MockStore::new();
        store.queue_delete(Err(StoreError::NetworkUnavailable));
        store.queue_delete(Err(StoreError::UnknownItem(Pump::identity(&1))));
        let sync = coordinator(store.clone());

        let mut local = pump(1, "gone");
        local.metadata = Some(tag(1, "t1"));
        sync.delete(&mut local).await.unwrap();
        assert_eq!(local.metadata, None);
        assert_eq!(store.deleted().len(), 2);
        assert_eq!(sync.stats().deletes, 1);
    }

    #[test]
    fn new_outside_runtime_fails() {
        assert!(matches!(
            SyncCoordinator::new(MockStore::new(), SyncConfig::default()),
            Err(SyncError::Background(_))
        ));
    }
}
