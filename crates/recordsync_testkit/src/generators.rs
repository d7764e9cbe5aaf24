//! Property-based test generators using proptest.

use crate::fixtures::Station;
use proptest::prelude::*;
use recordsync_codec::FieldValue;

/// Strategy for record type names.
pub fn record_type_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9]{0,15}"
}

/// Strategy for key components, including separator and escape
/// characters.
pub fn key_component_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => prop::char::range('a', 'z'),
            1 => Just('|'),
            1 => Just('\\'),
            1 => Just(':'),
        ],
        0..12,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

/// Strategy for station keys.
pub fn station_key_strategy() -> impl Strategy<Value = (String, i64)> {
    (key_component_strategy(), any::<i64>())
}

/// Strategy for scalar field values.
pub fn scalar_value_strategy() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        any::<bool>().prop_map(FieldValue::Bool),
        any::<i64>().prop_map(FieldValue::Integer),
        (-1.0e9f64..1.0e9).prop_map(FieldValue::Double),
        "[ -~]{0,24}".prop_map(FieldValue::Text),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(FieldValue::Bytes),
        any::<i64>().prop_map(FieldValue::Timestamp),
    ]
}

/// Strategy for stations without metadata.
pub fn station_strategy() -> impl Strategy<Value = Station> {
    (
        station_key_strategy(),
        "[A-Za-z ]{1,24}",
        prop::option::of("[A-Za-z]{2,10}"),
        prop::option::of((-90.0f64..90.0, -180.0f64..180.0)),
        any::<bool>(),
    )
        .prop_map(|((country, number), name, brand, location, open_24h)| Station {
            country,
            number,
            name,
            brand,
            location,
            open_24h,
            metadata: None,
        })
}
