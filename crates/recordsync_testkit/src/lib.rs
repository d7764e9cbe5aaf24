//! # RecordSync Testkit
//!
//! Test utilities for RecordSync.
//!
//! This crate provides:
//! - The `Station` fixture entity, its defaults table and record builders
//! - Property-based test generators using proptest
//! - `ServerStore`, the reference server exposed as a remote store
//! - `FlakyStore`, a fault-injecting store wrapper
//!
//! ## Usage
//!
//! ```rust,ignore
//! use recordsync_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn refresh_from_seeded_server() {
//!     let store = ServerStore::new(seeded_server(3));
//!     let sync = SyncCoordinator::new(store, SyncConfig::default()).unwrap();
//!     let cache = sync.new_cache(station_defaults());
//!     sync.retrieve(&cache).await.unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stores;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stores::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stores::*;
