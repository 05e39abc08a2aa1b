//! JSON record shape served to clients.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use super::{Data, Entry, Values};
use crate::units;

/// Reserved top-level key carrying the container id.
pub const ID_KEY: &str = "$id";
/// Reserved top-level key carrying the default name.
pub const DEFAULT_NAME_KEY: &str = "$defaultName";

/// Per-name record; field names are part of the client contract.
#[derive(Debug, Clone, Serialize)]
pub struct EntryRecord<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Type")]
    pub data_type: &'static str,
    #[serde(rename = "Value")]
    pub value: &'a Data,
    #[serde(rename = "Format")]
    pub format: &'a str,
    #[serde(rename = "UOM")]
    pub uom: &'a str,
    #[serde(rename = "UOMAbbr")]
    pub uom_abbr: String,
    #[serde(rename = "UOMDesc")]
    pub uom_desc: String,
    #[serde(rename = "Lang")]
    pub lang: &'a str,
    #[serde(rename = "State")]
    pub state: &'a str,
    #[serde(rename = "StatePercent")]
    pub state_percent: f64,
    #[serde(rename = "ValueFormatted")]
    pub value_formatted: String,
}

impl<'a> EntryRecord<'a> {
    pub fn from_entry(entry: &'a Entry) -> Self {
        let table = units::global();
        Self {
            name: entry.name(),
            data_type: entry.value().type_name(),
            value: entry.value(),
            format: entry.format(),
            uom: entry.unit(),
            uom_abbr: table.abbreviation(entry.unit()),
            uom_desc: table.description(entry.unit(), entry.value().as_f64().value()),
            lang: entry.lang(),
            state: entry.state(),
            state_percent: entry.state_percent(),
            value_formatted: super::format::format_entry(entry),
        }
    }
}

impl Values {
    /// `{ "$id": .., "$defaultName": .., <name>: record, .. }`
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert(ID_KEY.to_string(), JsonValue::String(self.id().to_string()));
        map.insert(DEFAULT_NAME_KEY.to_string(), JsonValue::String(self.default_name().to_string()));
        for entry in self.entries() {
            let record = serde_json::to_value(EntryRecord::from_entry(entry))
                .unwrap_or(JsonValue::Null);
            map.insert(entry.name().to_string(), record);
        }
        JsonValue::Object(map)
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}
