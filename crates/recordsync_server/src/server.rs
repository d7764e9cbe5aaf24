//! Reference record server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::table::RecordTable;
use parking_lot::Mutex;
use recordsync_codec::{Record, RemoteIdentity};
use recordsync_protocol::{Cursor, Query, QueryOptions, QueryPage};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct CursorState {
    query: Query,
    after: RemoteIdentity,
}

#[derive(Debug, Default)]
struct CursorBook {
    open: HashMap<String, CursorState>,
    order: VecDeque<String>,
}

impl CursorBook {
    fn open(&mut self, state: CursorState, limit: usize) -> Cursor {
        let token = Uuid::new_v4().to_string();
        self.open.insert(token.clone(), state);
        self.order.push_back(token.clone());
        while self.order.len() > limit {
            if let Some(oldest) = self.order.pop_front() {
                self.open.remove(&oldest);
            }
        }
        Cursor::new(token)
    }
}

/// An in-memory record store.
///
/// Implements the store semantics the sync engine relies on: cursor
/// pagination, change-tag concurrency checks, unknown-item reporting.
/// Cursors stay valid after use so a lost page can be requested again.
///
/// # Example
///
/// ```
/// use recordsync_codec::{Record, RemoteIdentity};
/// use recordsync_protocol::Query;
/// use recordsync_server::{RecordServer, ServerConfig};
///
/// let server = RecordServer::new(ServerConfig::default());
/// let identity = RemoteIdentity::new("Station", "1").unwrap();
/// server.handle_save(&Record::new(identity).with_field("name", "Mitte")).unwrap();
///
/// let page = server.handle_query(&Query::all("Station")).unwrap();
/// assert_eq!(page.records.len(), 1);
/// assert!(page.is_last());
/// ```
pub struct RecordServer {
    config: ServerConfig,
    table: Arc<RecordTable>,
    cursors: Mutex<CursorBook>,
}

impl RecordServer {
    /// Creates a new server.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_table(config, Arc::new(RecordTable::new()))
    }

    /// Creates a server over an existing table.
    pub fn with_table(config: ServerConfig, table: Arc<RecordTable>) -> Self {
        Self {
            config,
            table,
            cursors: Mutex::new(CursorBook::default()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the record table.
    pub fn table(&self) -> &Arc<RecordTable> {
        &self.table
    }

    /// Handles a fetch by identity.
    pub fn handle_fetch(&self, identity: &RemoteIdentity) -> ServerResult<Record> {
        self.table
            .get(identity)
            .ok_or_else(|| ServerError::NotFound(identity.clone()))
    }

    /// Handles the first page of a query.
    pub fn handle_query(&self, query: &Query) -> ServerResult<QueryPage> {
        if query.record_type.is_empty() {
            return Err(ServerError::InvalidRequest("query without record type".into()));
        }
        Ok(self.page(query, &query.options, None))
    }

    /// Handles a continuation request.
    pub fn handle_query_continue(
        &self,
        cursor: &Cursor,
        options: &QueryOptions,
    ) -> ServerResult<QueryPage> {
        let state = self
            .cursors
            .lock()
            .open
            .get(cursor.as_str())
            .cloned()
            .ok_or_else(|| ServerError::UnknownCursor(cursor.as_str().to_string()))?;
        Ok(self.page(&state.query, options, Some(&state.after)))
    }

    /// Handles a save, checking the record's change tag.
    pub fn handle_save(&self, record: &Record) -> ServerResult<Record> {
        let stored = self.table.write(record)?;
        debug!(
            identity = %record.identity(),
            insert = record.metadata().is_none(),
            "record saved"
        );
        Ok(stored)
    }

    /// Handles a delete by identity.
    pub fn handle_delete(&self, identity: &RemoteIdentity) -> ServerResult<()> {
        self.table.remove(identity)?;
        debug!(identity = %identity, "record deleted");
        Ok(())
    }

    /// Stores a record without a version check, as another client would.
    pub fn insert(&self, record: &Record) -> Record {
        self.table.put(record)
    }

    /// Returns the number of stored records.
    pub fn record_count(&self) -> usize {
        self.table.len()
    }

    /// Returns the number of continuation cursors held.
    pub fn open_cursor_count(&self) -> usize {
        self.cursors.lock().open.len()
    }

    fn page(
        &self,
        query: &Query,
        options: &QueryOptions,
        after: Option<&RemoteIdentity>,
    ) -> QueryPage {
        let limit = self.config.page_size(options.results_limit);
        let (records, more) = self
            .table
            .scan(&query.record_type, &query.predicate, after, limit);

        let cursor = match (more, records.last()) {
            (true, Some(last)) => Some(self.cursors.lock().open(
                CursorState {
                    query: query.clone(),
                    after: last.identity().clone(),
                },
                self.config.max_open_cursors,
            )),
            _ => None,
        };

        debug!(
            record_type = %query.record_type,
            returned = records.len(),
            has_more = cursor.is_some(),
            "query page served"
        );
        let records = records.iter().map(|r| options.project(r)).collect();
        QueryPage::new(records, cursor)
    }
}
