use recordsync_codec::{CodecResult, EntityCodec, FieldValue, Record, RecordMetadata};
use std::collections::BTreeMap;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pump {
    pub number: u32,
    pub label: String,
    pub price: Option<f64>,
    pub metadata: Option<RecordMetadata>,
}

impl EntityCodec for Pump {
    type Key = u32;
    const RECORD_TYPE: &'static str = "Pump";

    fn natural_key(&self) -> u32 {
        self.number
    }

    fn remote_metadata(&self) -> Option<&RecordMetadata> {
        self.metadata.as_ref()
    }

    fn set_remote_metadata(&mut self, metadata: Option<RecordMetadata>) {
        self.metadata = metadata;
    }

    fn encode_fields(&self) -> BTreeMap<String, FieldValue> {
        let mut fields = BTreeMap::new();
        fields.insert("label".to_string(), FieldValue::from(self.label.as_str()));
        if let Some(price) = self.price {
            fields.insert("price".to_string(), FieldValue::Double(price));
        }
        fields
    }

    fn decode(record: &Record) -> CodecResult<Self> {
        Ok(Self {
            number: Self::key_from_identity(record.identity())?,
            label: record.required_text("label")?.to_string(),
            price: record.double("price")?,
            metadata: None,
        })
    }
}

pub(crate) fn pump(number: u32, label: &str) -> Pump {
    Pump {
        number,
        label: label.to_string(),
        price: None,
        metadata: None,
    }
}

pub(crate) fn pump_defaults() -> HashMap<u32, Pump> {
    [1, 2]
        .into_iter()
        .map(|n| (n, pump(n, &format!("default {n}"))))
        .collect()
}

pub(crate) fn tag(number: u32, change_tag: &str) -> RecordMetadata {
    RecordMetadata::new(Pump::identity(&number), change_tag)
}

pub(crate) fn pump_record(number: u32, label: &str, change_tag: Option<&str>) -> Record {
    Record::new(Pump::identity(&number))
        .with_field("label", label)
        .with_metadata(change_tag.map(|t| tag(number, t)))
}
