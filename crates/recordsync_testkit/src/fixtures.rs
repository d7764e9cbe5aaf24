//! Fixture entity and helpers.
//!
//! `Station` is a fuel station keyed by country code and station number.
//! It exercises composite keys, required and optional fields, and every
//! common field type.

use recordsync_codec::{CodecResult, EntityCodec, FieldValue, Record, RecordMetadata};
use recordsync_server::{RecordServer, ServerConfig};
use std::collections::{BTreeMap, HashMap};
use tracing_subscriber::EnvFilter;

/// A fuel station.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// ISO country code.
    pub country: String,
    /// Station number within the country.
    pub number: i64,
    /// Display name. Required.
    pub name: String,
    /// Brand name.
    pub brand: Option<String>,
    /// Latitude and longitude.
    pub location: Option<(f64, f64)>,
    /// Open around the clock. Missing means false.
    pub open_24h: bool,
    /// Store-issued metadata.
    pub metadata: Option<RecordMetadata>,
}

impl Station {
    /// Creates a station with only the required fields.
    pub fn new(country: impl Into<String>, number: i64, name: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            number,
            name: name.into(),
            brand: None,
            location: None,
            open_24h: false,
            metadata: None,
        }
    }

    /// Sets the brand.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some((latitude, longitude));
        self
    }

    /// Marks the station as open around the clock.
    pub fn open_all_day(mut self) -> Self {
        self.open_24h = true;
        self
    }

    /// Returns the station without its metadata.
    pub fn without_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }
}

impl EntityCodec for Station {
    type Key = (String, i64);
    const RECORD_TYPE: &'static str = "Station";

    fn natural_key(&self) -> (String, i64) {
        (self.country.clone(), self.number)
    }

    fn remote_metadata(&self) -> Option<&RecordMetadata> {
        self.metadata.as_ref()
    }

    fn set_remote_metadata(&mut self, metadata: Option<RecordMetadata>) {
        self.metadata = metadata;
    }

    fn encode_fields(&self) -> BTreeMap<String, FieldValue> {
        let mut fields = BTreeMap::new();
        fields.insert("name".to_string(), FieldValue::from(self.name.as_str()));
        if let Some(brand) = &self.brand {
            fields.insert("brand".to_string(), FieldValue::from(brand.as_str()));
        }
        if let Some((latitude, longitude)) = self.location {
            fields.insert(
                "location".to_string(),
                FieldValue::Location {
                    latitude,
                    longitude,
                },
            );
        }
        fields.insert("open_24h".to_string(), FieldValue::Bool(self.open_24h));
        fields
    }

    fn decode(record: &Record) -> CodecResult<Self> {
        let (country, number) = Self::key_from_identity(record.identity())?;
        Ok(Self {
            country,
            number,
            name: record.required_text("name")?.to_string(),
            brand: record.text("brand")?.map(str::to_string),
            location: record.location("location")?,
            open_24h: record.boolean("open_24h")?.unwrap_or(false),
            metadata: None,
        })
    }
}

/// Creates an Austrian station.
pub fn station(number: i64, name: &str) -> Station {
    Station::new("AT", number, name)
}

/// Encodes an Austrian station as a fresh record.
pub fn station_record(number: i64, name: &str) -> Record {
    station(number, name).encode()
}

/// Defaults table served before the first refresh.
pub fn station_defaults() -> HashMap<(String, i64), Station> {
    [station(1, "Default Mitte"), station(2, "Default Nord")]
        .into_iter()
        .map(|s| (s.natural_key(), s))
        .collect()
}

/// Creates a server holding `count` stations numbered from 1.
pub fn seeded_server(count: i64) -> RecordServer {
    seeded_server_with(ServerConfig::default(), count)
}

/// Creates a server with a given configuration holding `count` stations.
pub fn seeded_server_with(config: ServerConfig, count: i64) -> RecordServer {
    let server = RecordServer::new(config);
    for number in 1..=count {
        server.insert(&station_record(number, &format!("Station {number}")));
    }
    server
}

/// Installs a test tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
