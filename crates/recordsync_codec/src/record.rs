//! Remote records.

use crate::error::{CodecError, CodecResult};
use crate::identity::RemoteIdentity;
use crate::metadata::RecordMetadata;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record as the remote store sees it: an identity, a set of named
/// fields, and the store's metadata for the version the client holds.
///
/// A record without metadata asks the store to create a fresh record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    identity: RemoteIdentity,
    fields: BTreeMap<String, FieldValue>,
    metadata: Option<RecordMetadata>,
}

impl Record {
    /// Creates an empty record with no metadata.
    pub fn new(identity: RemoteIdentity) -> Self {
        Self {
            identity,
            fields: BTreeMap::new(),
            metadata: None,
        }
    }

    /// Adds a field, builder style.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Attaches metadata, builder style.
    pub fn with_metadata(mut self, metadata: Option<RecordMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the record identity.
    pub fn identity(&self) -> &RemoteIdentity {
        &self.identity
    }

    /// Returns the record type tag.
    pub fn record_type(&self) -> &str {
        self.identity.record_type()
    }

    /// Returns the store metadata, if the record has been synchronized.
    pub fn metadata(&self) -> Option<&RecordMetadata> {
        self.metadata.as_ref()
    }

    /// Replaces the store metadata.
    pub fn set_metadata(&mut self, metadata: Option<RecordMetadata>) {
        self.metadata = metadata;
    }

    /// Returns all fields.
    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Looks up a field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Sets a field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a field.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Looks up a field that must be present.
    pub fn require(&self, name: &str) -> CodecResult<&FieldValue> {
        self.get(name).ok_or_else(|| CodecError::missing_field(name))
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: &'static str,
        extract: impl Fn(&'a FieldValue) -> Option<T>,
    ) -> CodecResult<Option<T>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => extract(value).map(Some).ok_or(CodecError::FieldType {
                field: name.to_string(),
                expected,
                actual: value.type_name(),
            }),
        }
    }

    /// Reads an optional text field.
    pub fn text(&self, name: &str) -> CodecResult<Option<&str>> {
        self.typed(name, "text", FieldValue::as_text)
    }

    /// Reads an optional integer field.
    pub fn integer(&self, name: &str) -> CodecResult<Option<i64>> {
        self.typed(name, "integer", FieldValue::as_integer)
    }

    /// Reads an optional double field.
    pub fn double(&self, name: &str) -> CodecResult<Option<f64>> {
        self.typed(name, "double", FieldValue::as_double)
    }

    /// Reads an optional boolean field.
    pub fn boolean(&self, name: &str) -> CodecResult<Option<bool>> {
        self.typed(name, "bool", FieldValue::as_bool)
    }

    /// Reads an optional timestamp field.
    pub fn timestamp(&self, name: &str) -> CodecResult<Option<i64>> {
        self.typed(name, "timestamp", FieldValue::as_timestamp)
    }

    /// Reads an optional location field.
    pub fn location(&self, name: &str) -> CodecResult<Option<(f64, f64)>> {
        self.typed(name, "location", FieldValue::as_location)
    }

    /// Reads an optional reference field.
    pub fn reference(&self, name: &str) -> CodecResult<Option<&RemoteIdentity>> {
        self.typed(name, "reference", FieldValue::as_reference)
    }

    /// Reads an optional list field.
    pub fn list(&self, name: &str) -> CodecResult<Option<&[FieldValue]>> {
        self.typed(name, "list", FieldValue::as_list)
    }

    /// Reads a text field that must be present.
    pub fn required_text(&self, name: &str) -> CodecResult<&str> {
        self.text(name)?.ok_or_else(|| CodecError::missing_field(name))
    }
}
