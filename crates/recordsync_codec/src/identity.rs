//! Remote identities and natural keys.
//!
//! A remote identity is the string `"<Type>:<key>"`. The mapping from a
//! natural key to its identity is a bijection within one record type:
//! parsing the identity recovers exactly the key that produced it.
//!
//! Composite keys join their components with `|`. Backslash and `|`
//! inside a component are escaped with a backslash, so components may
//! contain any text.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

const TYPE_SEPARATOR: char = ':';
const COMPONENT_SEPARATOR: char = '|';
const ESCAPE: char = '\\';

/// Address of a record in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RemoteIdentity {
    record_type: String,
    key: String,
}

impl RemoteIdentity {
    /// Creates an identity from a record type tag and an encoded key.
    ///
    /// The record type must be non-empty and must not contain `:`.
    pub fn new(record_type: impl Into<String>, key: impl Into<String>) -> CodecResult<Self> {
        let record_type = record_type.into();
        let key = key.into();
        if record_type.is_empty() || record_type.contains(TYPE_SEPARATOR) {
            return Err(CodecError::invalid_identity(
                format!("{record_type}{TYPE_SEPARATOR}{key}"),
                "record type must be non-empty and must not contain ':'",
            ));
        }
        Ok(Self { record_type, key })
    }

    /// Creates an identity without validating the record type.
    ///
    /// Used for record types fixed at compile time.
    pub fn from_trusted_parts(record_type: &str, key: String) -> Self {
        Self {
            record_type: record_type.to_string(),
            key,
        }
    }

    /// Parses an identity string of the form `"<Type>:<key>"`.
    pub fn parse(identity: &str) -> CodecResult<Self> {
        let (record_type, key) = identity
            .split_once(TYPE_SEPARATOR)
            .ok_or_else(|| CodecError::invalid_identity(identity, "missing ':' separator"))?;
        Self::new(record_type, key)
    }

    /// Returns the record type tag.
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Returns the encoded natural key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for RemoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.record_type, TYPE_SEPARATOR, self.key)
    }
}

impl std::str::FromStr for RemoteIdentity {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A type-specific entity identity.
///
/// Implementations must make `from_key_string(k.to_key_string()) == k`
/// hold for every key.
pub trait NaturalKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Encodes the key as a string.
    fn to_key_string(&self) -> String;

    /// Decodes a key previously produced by `to_key_string`.
    fn from_key_string(s: &str) -> CodecResult<Self>;
}

impl NaturalKey for String {
    fn to_key_string(&self) -> String {
        self.clone()
    }

    fn from_key_string(s: &str) -> CodecResult<Self> {
        Ok(s.to_string())
    }
}

macro_rules! integer_key {
    ($($ty:ty),*) => {
        $(
            impl NaturalKey for $ty {
                fn to_key_string(&self) -> String {
                    self.to_string()
                }

                fn from_key_string(s: &str) -> CodecResult<Self> {
                    s.parse::<$ty>()
                        .map_err(|e| CodecError::invalid_key(s, e.to_string()))
                }
            }
        )*
    };
}

integer_key!(i32, i64, u32, u64);

fn escape_component(component: &str, out: &mut String) {
    for c in component.chars() {
        if c == ESCAPE || c == COMPONENT_SEPARATOR {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

/// Joins key components, escaping separators inside each one.
pub fn join_components(components: &[String]) -> String {
    let mut out = String::new();
    for (i, component) in components.iter().enumerate() {
        if i > 0 {
            out.push(COMPONENT_SEPARATOR);
        }
        escape_component(component, &mut out);
    }
    out
}

/// Splits a composite key produced by [`join_components`].
pub fn split_components(key: &str) -> CodecResult<Vec<String>> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut chars = key.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => return Err(CodecError::invalid_key(key, "dangling escape")),
            },
            COMPONENT_SEPARATOR => components.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    components.push(current);
    Ok(components)
}

fn expect_components(key: &str, expected: usize) -> CodecResult<Vec<String>> {
    let components = split_components(key)?;
    if components.len() != expected {
        return Err(CodecError::invalid_key(
            key,
            format!(
                "expected {expected} components, found {}",
                components.len()
            ),
        ));
    }
    Ok(components)
}

impl<A: NaturalKey, B: NaturalKey> NaturalKey for (A, B) {
    fn to_key_string(&self) -> String {
        join_components(&[self.0.to_key_string(), self.1.to_key_string()])
    }

    fn from_key_string(s: &str) -> CodecResult<Self> {
        let parts = expect_components(s, 2)?;
        Ok((A::from_key_string(&parts[0])?, B::from_key_string(&parts[1])?))
    }
}

impl<A: NaturalKey, B: NaturalKey, C: NaturalKey> NaturalKey for (A, B, C) {
    fn to_key_string(&self) -> String {
        join_components(&[
            self.0.to_key_string(),
            self.1.to_key_string(),
            self.2.to_key_string(),
        ])
    }

    fn from_key_string(s: &str) -> CodecResult<Self> {
        let parts = expect_components(s, 3)?;
        Ok((
            A::from_key_string(&parts[0])?,
            B::from_key_string(&parts[1])?,
            C::from_key_string(&parts[2])?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identity_display_and_parse() {
        let identity = RemoteIdentity::new("Station", "1042").unwrap();
        assert_eq!(identity.to_string(), "Station:1042");

        let parsed = RemoteIdentity::parse("Station:1042").unwrap();
        assert_eq!(parsed, identity);
        assert_eq!(parsed.record_type(), "Station");
        assert_eq!(parsed.key(), "1042");
    }

    #[test]
    fn key_may_contain_separator() {
        let identity = RemoteIdentity::parse("Brand:a:b").unwrap();
        assert_eq!(identity.record_type(), "Brand");
        assert_eq!(identity.key(), "a:b");
    }

    #[test]
    fn invalid_identities() {
        assert!(RemoteIdentity::parse("no-separator").is_err());
        assert!(RemoteIdentity::parse(":key").is_err());
        assert!(RemoteIdentity::new("Bad:Type", "1").is_err());
    }

    #[test]
    fn composite_key_escaping() {
        let key = ("a|b".to_string(), "c\\d".to_string());
        let encoded = key.to_key_string();
        assert_eq!(encoded, "a\\|b|c\\\\d");
        assert_eq!(<(String, String)>::from_key_string(&encoded).unwrap(), key);
    }

    #[test]
    fn composite_key_wrong_arity() {
        assert!(<(i64, i64)>::from_key_string("1|2|3").is_err());
        assert!(<(i64, i64)>::from_key_string("1").is_err());
        assert!(split_components("dangling\\").is_err());
    }

    #[test]
    fn integer_key_rejects_text() {
        assert!(i64::from_key_string("abc").is_err());
        assert_eq!(i64::from_key_string("-17").unwrap(), -17);
    }

    proptest! {
        #[test]
        fn string_pairs_roundtrip(a in ".*", b in ".*") {
            let key = (a, b);
            let decoded = <(String, String)>::from_key_string(&key.to_key_string()).unwrap();
            prop_assert_eq!(decoded, key);
        }

        #[test]
        fn nested_composite_roundtrip(a in ".*", b in any::<i64>(), c in ".*", d in any::<u32>()) {
            let key = ((a, b), c, d);
            let decoded =
                <((String, i64), String, u32)>::from_key_string(&key.to_key_string()).unwrap();
            prop_assert_eq!(decoded, key);
        }
    }
}
