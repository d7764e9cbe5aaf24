//! # RecordSync Protocol
//!
//! Request, response and failure types shared by the sync engine and any
//! remote record store implementation.
//!
//! This crate provides:
//! - `Query`, `Predicate` and `QueryOptions` for bulk scans
//! - `Cursor` and `QueryPage` for cursor-based pagination
//! - `StoreError`, the raw store failure taxonomy
//! - `ConflictPolicy` for optimistic-concurrency merges
//!
//! This is a pure types crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod conflict;
mod error;
mod query;

pub use conflict::ConflictPolicy;
pub use error::{StoreError, StoreResult};
pub use query::{Cursor, Predicate, Query, QueryOptions, QueryPage};
