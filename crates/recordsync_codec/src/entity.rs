//! Entity codec trait.

use crate::error::{CodecError, CodecResult};
use crate::identity::{NaturalKey, RemoteIdentity};
use crate::metadata::RecordMetadata;
use crate::record::Record;
use crate::value::FieldValue;
use std::collections::BTreeMap;

/// Trait for domain types that are synchronized with the remote store.
///
/// Implementors must provide:
/// - `natural_key()`: the stable, immutable identity of the entity
/// - `encode_fields()`: projection of the entity's fields into record fields
/// - `decode()`: construction of an entity from a record
/// - access to the opaque `RecordMetadata` slot
///
/// Everything else (identity mapping, change detection, merging a fresh
/// record into an existing entity) has a provided implementation.
///
/// # Example
///
/// ```rust
/// use recordsync_codec::{CodecResult, EntityCodec, FieldValue, Record, RecordMetadata};
/// use std::collections::BTreeMap;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Brand {
///     code: i64,
///     name: String,
///     metadata: Option<RecordMetadata>,
/// }
///
/// impl EntityCodec for Brand {
///     type Key = i64;
///     const RECORD_TYPE: &'static str = "Brand";
///
///     fn natural_key(&self) -> i64 {
///         self.code
///     }
///
///     fn remote_metadata(&self) -> Option<&RecordMetadata> {
///         self.metadata.as_ref()
///     }
///
///     fn set_remote_metadata(&mut self, metadata: Option<RecordMetadata>) {
///         self.metadata = metadata;
///     }
///
///     fn encode_fields(&self) -> BTreeMap<String, FieldValue> {
///         BTreeMap::from([("name".to_string(), FieldValue::from(self.name.as_str()))])
///     }
///
///     fn decode(record: &Record) -> CodecResult<Self> {
///         Ok(Brand {
///             code: Self::key_from_identity(record.identity())?,
///             name: record.text("name")?.unwrap_or_default().to_string(),
///             metadata: None,
///         })
///     }
/// }
///
/// let brand = Brand { code: 3, name: "Eni".into(), metadata: None };
/// let record = brand.encode();
/// assert_eq!(record.identity().to_string(), "Brand:3");
/// assert_eq!(Brand::from_record(&record).unwrap(), brand);
/// ```
pub trait EntityCodec: Clone + Send + Sync + 'static {
    /// The entity's natural key type.
    type Key: NaturalKey;

    /// Record type tag. Must be non-empty and must not contain `:`.
    const RECORD_TYPE: &'static str;

    /// Returns the entity's natural key.
    ///
    /// This key must not change over the entity's lifetime.
    fn natural_key(&self) -> Self::Key;

    /// Returns the store metadata captured at the last fetch or save.
    fn remote_metadata(&self) -> Option<&RecordMetadata>;

    /// Replaces the store metadata. `None` marks the entity as never
    /// synchronized.
    fn set_remote_metadata(&mut self, metadata: Option<RecordMetadata>);

    /// Projects the entity's fields into record fields.
    fn encode_fields(&self) -> BTreeMap<String, FieldValue>;

    /// Builds an entity from a record.
    ///
    /// Missing optional fields must decode as absent or default. The
    /// returned entity's metadata is ignored; [`from_record`](Self::from_record)
    /// sets it from the record.
    fn decode(record: &Record) -> CodecResult<Self>;

    /// Maps a natural key to its remote identity.
    fn identity(key: &Self::Key) -> RemoteIdentity {
        RemoteIdentity::from_trusted_parts(Self::RECORD_TYPE, key.to_key_string())
    }

    /// Recovers the natural key from a remote identity.
    fn key_from_identity(identity: &RemoteIdentity) -> CodecResult<Self::Key> {
        check_record_type::<Self>(identity.record_type())?;
        Self::Key::from_key_string(identity.key())
    }

    /// Returns this entity's remote identity.
    fn remote_identity(&self) -> RemoteIdentity {
        Self::identity(&self.natural_key())
    }

    /// Encodes the entity as a record.
    ///
    /// The entity's metadata is attached when present so the store can
    /// detect concurrent writes. Without metadata the record asks for a
    /// fresh insert.
    fn encode(&self) -> Record {
        let mut record = Record::new(self.remote_identity())
            .with_metadata(self.remote_metadata().cloned());
        for (name, value) in self.encode_fields() {
            record.set(name, value);
        }
        record
    }

    /// Decodes a record of this type and captures its metadata.
    fn from_record(record: &Record) -> CodecResult<Self> {
        check_record_type::<Self>(record.record_type())?;
        let mut entity = Self::decode(record)?;
        entity.set_remote_metadata(record.metadata().cloned());
        Ok(entity)
    }

    /// Returns true if the record disagrees with this entity on any field
    /// the record carries. Fields absent from the record have no opinion.
    fn changed(&self, record: &Record) -> bool {
        let local = self.encode_fields();
        record
            .fields()
            .iter()
            .any(|(name, remote)| local.get(name) != Some(remote))
    }

    /// Decodes a fresh remote record into this entity.
    ///
    /// The record is authoritative: optional fields it omits are cleared,
    /// and the record's metadata is adopted. Returns true if any field
    /// changed.
    fn apply(&mut self, record: &Record) -> CodecResult<bool> {
        let remote = Self::from_record(record)?;
        let changed = remote.encode_fields() != self.encode_fields();
        if changed {
            *self = remote;
        } else {
            self.set_remote_metadata(record.metadata().cloned());
        }
        Ok(changed)
    }
}

fn check_record_type<E: EntityCodec>(actual: &str) -> CodecResult<()> {
    if actual == E::RECORD_TYPE {
        Ok(())
    } else {
        Err(CodecError::type_mismatch(E::RECORD_TYPE, actual))
    }
}
