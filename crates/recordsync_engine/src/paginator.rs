//! Cursor-driven bulk query accumulation.

use crate::classify::ErrorKind;
use crate::error::{SyncError, SyncResult};
use crate::retry::RetryPolicy;
use crate::store::RemoteRecordStore;
use recordsync_codec::Record;
use recordsync_protocol::{Cursor, Query, StoreError};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, warn};

/// Drives a bulk query through every page the store returns.
pub struct BulkQueryPaginator<'a, S: RemoteRecordStore + ?Sized> {
    store: &'a S,
    policy: &'a RetryPolicy,
    retries: AtomicU32,
}

impl<'a, S: RemoteRecordStore + ?Sized> BulkQueryPaginator<'a, S> {
    /// Creates a paginator over a store.
    pub fn new(store: &'a S, policy: &'a RetryPolicy) -> Self {
        Self {
            store,
            policy,
            retries: AtomicU32::new(0),
        }
    }

    /// Number of page requests re-issued so far.
    pub fn retries(&self) -> u32 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Fetches every record matching the query.
    ///
    /// A retryable failure re-issues the same page request after backoff;
    /// pages already accumulated are kept. A partial failure ends the scan
    /// early and returns what was gathered, as long as that is non-empty.
    /// Any other failure discards the accumulation.
    pub async fn fetch_all(&self, query: &Query) -> SyncResult<Vec<Record>> {
        let mut records = Vec::new();
        let mut cursor: Option<Cursor> = None;
        let mut page = 0usize;
        let mut attempt = 0u32;

        loop {
            let result = match &cursor {
                None => self.store.query(query).await,
                Some(cursor) => self.store.query_continue(cursor, &query.options).await,
            };

            match result {
                Ok(next) => {
                    debug!(
                        record_type = %query.record_type,
                        page,
                        received = next.records.len(),
                        has_more = next.cursor.is_some(),
                        "query page received"
                    );
                    records.extend(next.records);
                    attempt = 0;
                    page += 1;
                    match next.cursor {
                        Some(next_cursor) => cursor = Some(next_cursor),
                        None => return Ok(records),
                    }
                }
                Err(StoreError::PartialFailure {
                    message,
                    records: partial,
                }) => {
                    records.extend(partial);
                    if records.is_empty() {
                        return Err(SyncError::Store {
                            kind: ErrorKind::PartialFailure,
                            source: StoreError::PartialFailure {
                                message,
                                records: Vec::new(),
                            },
                        });
                    }
                    warn!(
                        record_type = %query.record_type,
                        page,
                        returned = records.len(),
                        %message,
                        "query ended with a partial failure, returning short result"
                    );
                    return Ok(records);
                }
                Err(error) => {
                    self.policy.backoff_or_fail("query", error, attempt).await?;
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    attempt += 1;
                }
            }
        }
    }
}
