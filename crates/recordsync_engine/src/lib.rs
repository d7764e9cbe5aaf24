//! # RecordSync Engine
//!
//! Keeps typed in-memory caches in step with a remote record store.
//!
//! This crate provides:
//! - `SyncedEntityCache`, a per-type cache with non-blocking reads
//! - `BulkQueryPaginator`, cursor-following query accumulation
//! - `ErrorKind` and `RetryPolicy`, failure classification and backoff
//! - `SyncCoordinator`, refresh, download, upload and delete with
//!   conflict reconciliation
//! - `NotificationBus` and `CompletionQueue` for reporting results
//! - `RemoteRecordStore`, the store abstraction, plus `MockStore`
//!
//! ## Architecture
//!
//! A composition root owns one `SyncCoordinator` and one cache per entity
//! type. Refreshes replace a cache wholesale; readers either see the old
//! snapshot, the new one, or the defaults table, never a mix.
//!
//! ## Key Invariants
//!
//! - Cache reads never wait on a refresh
//! - Refreshes of one cache never overlap
//! - Every store failure maps to exactly one `ErrorKind`
//! - Retryable failures are absorbed up to the attempt ceiling
//! - A failed refresh leaves the cache as it was

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod cache;
mod classify;
mod completion;
mod config;
mod coordinator;
mod error;
mod notify;
mod paginator;
mod retry;
mod store;

#[cfg(test)]
mod testing;

pub use cache::{CacheState, SyncedEntityCache};
pub use classify::ErrorKind;
pub use completion::CompletionQueue;
pub use config::{RefreshMode, RetryConfig, SyncConfig};
pub use coordinator::{DownloadOutcome, SyncCoordinator, SyncStats, UploadReport};
pub use error::{SyncError, SyncResult};
pub use notify::{Notification, NotificationBus, Subscription};
pub use paginator::BulkQueryPaginator;
pub use retry::RetryPolicy;
pub use store::{MockStore, PageRequest, RemoteRecordStore};
