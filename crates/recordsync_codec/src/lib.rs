//! # RecordSync Codec
//!
//! Mapping between typed domain entities and remote store records.
//!
//! This crate provides:
//! - `FieldValue`, the dynamic value a record field holds
//! - `Record`, a remote record with typed field readers
//! - `RemoteIdentity` and the `NaturalKey` bijection
//! - `RecordMetadata`, the opaque store version token
//! - `EntityCodec`, the per-entity-type mapping contract
//!
//! ## Identity Rules
//!
//! - Identities have the form `"<Type>:<key>"`
//! - `key_from_identity(identity(k)) == k` for every key
//! - Composite keys escape `\` and `|` inside components
//!
//! ## Usage
//!
//! ```
//! use recordsync_codec::{NaturalKey, RemoteIdentity};
//!
//! let key = ("AT".to_string(), 1042i64);
//! let identity = RemoteIdentity::new("Station", key.to_key_string()).unwrap();
//! assert_eq!(identity.to_string(), "Station:AT|1042");
//!
//! let decoded = <(String, i64)>::from_key_string(identity.key()).unwrap();
//! assert_eq!(decoded, key);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod error;
mod identity;
mod metadata;
mod record;
mod value;

pub use entity::EntityCodec;
pub use error::{CodecError, CodecResult};
pub use identity::{join_components, split_components, NaturalKey, RemoteIdentity};
pub use metadata::RecordMetadata;
pub use record::Record;
pub use value::FieldValue;
