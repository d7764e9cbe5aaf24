//! # RecordSync Server
//!
//! In-memory reference implementation of a remote record store.
//!
//! This crate provides:
//! - `RecordTable`, records with per-record change tags
//! - `RecordServer`, fetch, save, delete and cursor-paginated queries
//! - `ServerError`, converted into `StoreError` at the client boundary
//!
//! The server has no transport. Tests and local tools call the
//! `handle_*` methods directly or wrap the server in a store adapter.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod server;
mod table;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::RecordServer;
pub use table::RecordTable;
