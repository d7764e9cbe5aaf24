//! Bulk query types.

use recordsync_codec::{FieldValue, Record};
use serde::{Deserialize, Serialize};

/// Filter applied by the store to the records of one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Matches every record.
    All,
    /// Matches records whose field equals the value.
    Equals {
        /// Field name.
        field: String,
        /// Value to compare with.
        value: FieldValue,
    },
    /// Matches records whose field equals any of the values.
    In {
        /// Field name.
        field: String,
        /// Accepted values.
        values: Vec<FieldValue>,
    },
    /// Matches records that satisfy every inner predicate.
    And(Vec<Predicate>),
}

impl Predicate {
    /// Creates an equality predicate.
    pub fn equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Predicate::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if the record satisfies this predicate.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Equals { field, value } => record.get(field) == Some(value),
            Predicate::In { field, values } => record
                .get(field)
                .is_some_and(|actual| values.contains(actual)),
            Predicate::And(inner) => inner.iter().all(|p| p.matches(record)),
        }
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::All
    }
}

/// Options that shape every page of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Fields to return. `None` returns all fields.
    pub desired_fields: Option<Vec<String>>,
    /// Maximum records per page. `None` lets the store decide.
    pub results_limit: Option<usize>,
}

impl QueryOptions {
    /// Restricts the fields returned with each record.
    pub fn with_desired_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.desired_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the page size.
    pub fn with_results_limit(mut self, limit: usize) -> Self {
        self.results_limit = Some(limit);
        self
    }

    /// Applies the field projection to a record.
    pub fn project(&self, record: &Record) -> Record {
        match &self.desired_fields {
            None => record.clone(),
            Some(fields) => {
                let mut projected = Record::new(record.identity().clone())
                    .with_metadata(record.metadata().cloned());
                for name in fields {
                    if let Some(value) = record.get(name) {
                        projected.set(name.clone(), value.clone());
                    }
                }
                projected
            }
        }
    }
}

/// A bulk query over one record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Record type to scan.
    pub record_type: String,
    /// Filter.
    pub predicate: Predicate,
    /// Page shaping options.
    pub options: QueryOptions,
}

impl Query {
    /// Creates a query matching every record of a type.
    pub fn all(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            predicate: Predicate::All,
            options: QueryOptions::default(),
        }
    }

    /// Sets the predicate.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Sets the page options.
    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

/// Store-issued continuation token for a paginated query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    /// Wraps a store token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPage {
    /// Records in this page.
    pub records: Vec<Record>,
    /// Continuation cursor; `None` when the query is complete.
    pub cursor: Option<Cursor>,
}

impl QueryPage {
    /// Creates a page.
    pub fn new(records: Vec<Record>, cursor: Option<Cursor>) -> Self {
        Self { records, cursor }
    }

    /// Creates the final page of a query.
    pub fn last(records: Vec<Record>) -> Self {
        Self::new(records, None)
    }

    /// Returns true if no further pages exist.
    pub fn is_last(&self) -> bool {
        self.cursor.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordsync_codec::RemoteIdentity;

    fn station(key: &str, brand: i64) -> Record {
        Record::new(RemoteIdentity::new("Station", key).unwrap())
            .with_field("brand", brand)
            .with_field("name", format!("Station {key}"))
    }

    #[test]
    fn predicate_matching() {
        let record = station("1", 4);
        assert!(Predicate::All.matches(&record));
        assert!(Predicate::equals("brand", 4i64).matches(&record));
        assert!(!Predicate::equals("brand", 5i64).matches(&record));
        assert!(!Predicate::equals("missing", 4i64).matches(&record));

        let within = Predicate::In {
            field: "brand".into(),
            values: vec![FieldValue::Integer(3), FieldValue::Integer(4)],
        };
        assert!(within.matches(&record));

        let both = Predicate::And(vec![within, Predicate::equals("brand", 3i64)]);
        assert!(!both.matches(&record));
    }

    #[test]
    fn projection_keeps_only_desired_fields() {
        let options = QueryOptions::default().with_desired_fields(["brand"]);
        let projected = options.project(&station("1", 4));
        assert_eq!(projected.fields().len(), 1);
        assert_eq!(projected.integer("brand").unwrap(), Some(4));
    }

    #[test]
    fn page_completion() {
        assert!(QueryPage::last(vec![]).is_last());
        assert!(!QueryPage::new(vec![], Some(Cursor::new("p2"))).is_last());
    }

    #[test]
    fn query_builder() {
        let query = Query::all("Station")
            .with_predicate(Predicate::equals("brand", 4i64))
            .with_options(QueryOptions::default().with_results_limit(50));
        assert_eq!(query.record_type, "Station");
        assert_eq!(query.options.results_limit, Some(50));
    }
}
