//! Per-entity-type in-memory cache with non-blocking reads.
//!
//! Readers never wait on a refresh. While the write lock is held they fall
//! back to the static defaults table supplied at construction.

use crate::config::RefreshMode;
use crate::error::SyncResult;
use recordsync_codec::EntityCodec;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Lifecycle of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No refresh has succeeded yet.
    Cold,
    /// A refresh is in progress.
    Refreshing,
    /// At least one refresh has succeeded.
    Warm,
}

struct Entries<E: EntityCodec> {
    map: HashMap<E::Key, E>,
    has_data: bool,
}

impl<E: EntityCodec> Entries<E> {
    fn install(&mut self, map: HashMap<E::Key, E>) -> usize {
        self.map = map;
        self.has_data = true;
        self.map.len()
    }
}

/// Clears the refreshing flag when a refresh ends, however it ends.
struct RefreshFlag<'a>(&'a AtomicBool);

impl<'a> RefreshFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RefreshFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// In-memory map of natural key to entity for one entity type.
pub struct SyncedEntityCache<E: EntityCodec> {
    entries: RwLock<Entries<E>>,
    defaults: HashMap<E::Key, E>,
    refresh_gate: Mutex<()>,
    refreshing: AtomicBool,
    warm: AtomicBool,
    mode: RefreshMode,
}

impl<E: EntityCodec> SyncedEntityCache<E> {
    /// Creates a cold cache backed by a defaults table.
    pub fn new(defaults: HashMap<E::Key, E>) -> Self {
        Self::with_mode(defaults, RefreshMode::default())
    }

    /// Creates a cold cache with an explicit refresh mode.
    pub fn with_mode(defaults: HashMap<E::Key, E>, mode: RefreshMode) -> Self {
        Self {
            entries: RwLock::new(Entries {
                map: HashMap::new(),
                has_data: false,
            }),
            defaults,
            refresh_gate: Mutex::new(()),
            refreshing: AtomicBool::new(false),
            warm: AtomicBool::new(false),
            mode,
        }
    }

    /// Returns the refresh mode.
    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    /// Returns the defaults table.
    pub fn defaults(&self) -> &HashMap<E::Key, E> {
        &self.defaults
    }

    /// Looks up an entity without waiting.
    ///
    /// Returns the cached entity when the cache is warm and holds the key,
    /// otherwise the default for the key.
    pub fn get(&self, key: &E::Key) -> Option<E> {
        match self.entries.try_read() {
            Ok(entries) if entries.has_data => entries
                .map
                .get(key)
                .or_else(|| self.defaults.get(key))
                .cloned(),
            _ => self.defaults.get(key).cloned(),
        }
    }

    /// Returns every entity without waiting.
    pub fn values(&self) -> Vec<E> {
        match self.entries.try_read() {
            Ok(entries) if entries.has_data => entries.map.values().cloned().collect(),
            _ => self.defaults.values().cloned().collect(),
        }
    }

    /// Returns every key without waiting.
    pub fn keys(&self) -> Vec<E::Key> {
        match self.entries.try_read() {
            Ok(entries) if entries.has_data => entries.map.keys().cloned().collect(),
            _ => self.defaults.keys().cloned().collect(),
        }
    }

    /// Returns the number of entities a reader would see right now.
    pub fn len(&self) -> usize {
        match self.entries.try_read() {
            Ok(entries) if entries.has_data => entries.map.len(),
            _ => self.defaults.len(),
        }
    }

    /// Returns true if a reader would see no entities right now.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once a refresh has succeeded.
    pub fn has_data(&self) -> bool {
        match self.entries.try_read() {
            Ok(entries) => entries.has_data,
            Err(_) => self.warm.load(Ordering::Acquire),
        }
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> CacheState {
        if self.refreshing.load(Ordering::Acquire) {
            CacheState::Refreshing
        } else if self.warm.load(Ordering::Acquire) {
            CacheState::Warm
        } else {
            CacheState::Cold
        }
    }

    /// Replaces the whole cache with the result of `load`.
    ///
    /// Refreshes of one cache never overlap. On failure the previous
    /// entries and state are kept. Returns the number of entities
    /// installed.
    pub async fn refresh<F, Fut>(&self, load: F) -> SyncResult<usize>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SyncResult<HashMap<E::Key, E>>>,
    {
        let _gate = self.refresh_gate.lock().await;
        let _refreshing = RefreshFlag::raise(&self.refreshing);

        let installed = match self.mode {
            RefreshMode::HoldLock => {
                let mut entries = self.entries.write().await;
                let map = load().await?;
                entries.install(map)
            }
            RefreshMode::Snapshot => {
                let map = load().await?;
                self.entries.write().await.install(map)
            }
        };

        self.warm.store(true, Ordering::Release);
        debug!(
            record_type = E::RECORD_TYPE,
            installed,
            mode = ?self.mode,
            "cache snapshot replaced"
        );
        Ok(installed)
    }
}
