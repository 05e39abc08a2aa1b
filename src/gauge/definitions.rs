//! Layered instrument definition documents.
//!
//! Definitions come from several YAML documents (generic, per simulator, per
//! car or track). Later documents override earlier ones key by key: a gauge
//! field, a context, or a single state within a context, never a whole
//! document.
//!
//! ```yaml
//! Tachometer:
//!   uom: rev/min
//!   minimum: 0
//!   maximum: 9000
//!   increment: 100
//!   states:
//!     "":                  # default context
//!       NORMAL:   { start: 0, end: 9000 }
//!       SHIFT:    { start: 7000, end: 8000 }
//!     "4":                 # gear 4 only
//!       SHIFT:    { start: 7200, end: 8000 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use super::classifier::Classifier;
use super::instrument::Gauge;
use super::range::{RangeEntry, RangeOrder};
use crate::value::Data;
use crate::{PathError, Result};

/// One state's range inside a context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeDefinition {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub uom: Option<String>,
    /// Replacement value returned instead of the raw value.
    pub value: Option<serde_yaml_ng::Value>,
    pub value_uom: Option<String>,
}

impl RangeDefinition {
    fn merge(&mut self, other: &RangeDefinition) {
        if other.start.is_some() {
            self.start = other.start;
        }
        if other.end.is_some() {
            self.end = other.end;
        }
        if other.uom.is_some() {
            self.uom.clone_from(&other.uom);
        }
        if other.value.is_some() {
            self.value.clone_from(&other.value);
        }
        if other.value_uom.is_some() {
            self.value_uom.clone_from(&other.value_uom);
        }
    }

    fn to_range(&self, state: &str) -> RangeEntry {
        let mut range = RangeEntry::new(
            state,
            self.start.unwrap_or(f64::NEG_INFINITY),
            self.end.unwrap_or(f64::INFINITY),
        );
        if let Some(uom) = &self.uom {
            range = range.with_unit(uom.clone());
        }
        if let Some(value) = self.value.as_ref().and_then(yaml_to_data) {
            range = range.with_replacement(value, self.value_uom.clone().unwrap_or_default());
        }
        range
    }
}

fn yaml_to_data(value: &serde_yaml_ng::Value) -> Option<Data> {
    use serde_yaml_ng::Value as Yaml;
    match value {
        Yaml::Bool(b) => Some(Data::Bool(*b)),
        Yaml::Number(n) => n.as_i64().map(Data::Long).or_else(|| n.as_f64().map(Data::Double)),
        Yaml::String(s) => Some(Data::String(s.clone())),
        Yaml::Sequence(items) => {
            Some(Data::List(items.iter().filter_map(yaml_to_data).collect()))
        }
        _ => None,
    }
}

/// One instrument's definition; every field optional so documents can layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeDefinition {
    pub name: Option<String>,
    pub uom: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub increment: Option<f64>,
    pub order: Option<RangeOrder>,
    pub changeable: Option<bool>,
    pub format: Option<String>,
    /// context -> state name -> range
    pub states: BTreeMap<String, BTreeMap<String, RangeDefinition>>,
}

impl GaugeDefinition {
    pub fn merge(&mut self, other: &GaugeDefinition) {
        if other.name.is_some() {
            self.name.clone_from(&other.name);
        }
        if other.uom.is_some() {
            self.uom.clone_from(&other.uom);
        }
        if other.minimum.is_some() {
            self.minimum = other.minimum;
        }
        if other.maximum.is_some() {
            self.maximum = other.maximum;
        }
        if other.increment.is_some() {
            self.increment = other.increment;
        }
        if other.order.is_some() {
            self.order = other.order;
        }
        if other.changeable.is_some() {
            self.changeable = other.changeable;
        }
        if other.format.is_some() {
            self.format.clone_from(&other.format);
        }
        for (context, states) in &other.states {
            let mine = self.states.entry(context.clone()).or_default();
            for (state, range) in states {
                mine.entry(state.clone()).or_default().merge(range);
            }
        }
    }

    /// Builds the immutable classifier for `gauge_type`.
    pub fn classifier(&self, gauge_type: &str) -> Classifier {
        let mut classifier = Classifier::new(gauge_type, self.uom.clone().unwrap_or_default())
            .with_order(self.order.unwrap_or_default())
            .with_capacity(
                self.minimum.unwrap_or(f64::NEG_INFINITY),
                self.maximum.unwrap_or(f64::INFINITY),
                self.increment.unwrap_or(0.0),
            );
        for (context, states) in &self.states {
            for (state, range) in states {
                classifier.add_range(context, range.to_range(state));
            }
        }
        classifier
    }
}

/// The merged set of instrument definitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GaugeDefinitions {
    gauges: BTreeMap<String, GaugeDefinition>,
}

impl GaugeDefinitions {
    pub fn from_yaml(document: &str) -> Result<Self> {
        let gauges: BTreeMap<String, GaugeDefinition> = serde_yaml_ng::from_str(document)
            .map_err(|e| PathError::config("gauge definitions", e.to_string()))?;
        debug!(gauges = gauges.len(), "Parsed gauge definitions");
        Ok(Self { gauges })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .map_err(|e| PathError::file_error(path.to_path_buf(), e))?;
        let definitions = Self::from_yaml(&document)?;
        info!(path = %path.display(), gauges = definitions.gauges.len(), "Loaded gauge definitions");
        Ok(definitions)
    }

    /// Overlays a later-loaded document.
    pub fn merge(&mut self, other: &GaugeDefinitions) {
        for (gauge_type, definition) in &other.gauges {
            match self.key_of(gauge_type) {
                Some(key) => {
                    if let Some(existing) = self.gauges.get_mut(&key) {
                        existing.merge(definition);
                    }
                }
                None => {
                    self.gauges.insert(gauge_type.clone(), definition.clone());
                }
            }
        }
    }

    fn key_of(&self, gauge_type: &str) -> Option<String> {
        self.gauges.keys().find(|k| k.eq_ignore_ascii_case(gauge_type)).cloned()
    }

    /// Definition for `gauge_type`, matched case-insensitively.
    pub fn get(&self, gauge_type: &str) -> Option<&GaugeDefinition> {
        self.gauges
            .get(gauge_type)
            .or_else(|| self.key_of(gauge_type).and_then(|key| self.gauges.get(&key)))
    }

    pub fn gauge_types(&self) -> impl Iterator<Item = &str> {
        self.gauges.keys().map(String::as_str)
    }

    pub fn classifier(&self, gauge_type: &str) -> Option<Classifier> {
        self.get(gauge_type).map(|definition| definition.classifier(gauge_type))
    }

    /// One instrument per defined gauge type.
    pub fn instruments(&self) -> impl Iterator<Item = Gauge> + '_ {
        self.gauges
            .iter()
            .map(|(gauge_type, definition)| Gauge::from_definition(gauge_type, definition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Values;

    const BASE: &str = r#"
Tachometer:
  uom: rev/min
  minimum: 0
  maximum: 9000
  increment: 100
  states:
    "":
      NORMAL: { start: 0, end: 9000 }
      SHIFT: { start: 7000, end: 8000 }
      OVERLIMIT: { start: 8000 }
FuelLevel:
  uom: l
  maximum: 100
  increment: 0.5
  changeable: true
"#;

    const CAR_OVERRIDE: &str = r#"
tachometer:
  maximum: 8500
  states:
    "":
      SHIFT: { start: 7300 }
    "4":
      SHIFT: { start: 7600, end: 8200 }
Gear:
  states:
    "":
      REVERSE: { start: -1, end: 0, value: R }
"#;

    #[test]
    fn later_documents_override_key_by_key() {
        let mut defs = GaugeDefinitions::from_yaml(BASE).unwrap();
        defs.merge(&GaugeDefinitions::from_yaml(CAR_OVERRIDE).unwrap());

        let tach = defs.get("Tachometer").unwrap();
        assert_eq!(tach.maximum, Some(8500.0));
        assert_eq!(tach.minimum, Some(0.0));
        assert_eq!(tach.uom.as_deref(), Some("rev/min"));

        let shift = &tach.states[""]["SHIFT"];
        assert_eq!(shift.start, Some(7300.0));
        assert_eq!(shift.end, Some(8000.0), "end survives from the base document");
        assert!(tach.states[""].contains_key("NORMAL"));
        assert!(tach.states.contains_key("4"));

        assert!(defs.get("gear").is_some());
        assert_eq!(defs.gauge_types().count(), 3);
    }

    #[test]
    fn classifier_from_definitions() {
        let defs = GaugeDefinitions::from_yaml(BASE).unwrap();
        let tach = defs.classifier("Tachometer").unwrap();
        assert_eq!(tach.unit(), "rev/min");
        assert_eq!(tach.maximum(), 9000.0);
        assert_eq!(tach.increment(), 100.0);

        let result = tach.apply(&Values::new("rpm", 7500.0, "rev/min"), "");
        assert_eq!(result.state(), "SHIFT");
        let over = tach.apply(&Values::new("rpm", 12000.0, "rev/min"), "");
        assert_eq!(over.state(), "OVERLIMIT");
    }

    #[test]
    fn instruments_carry_definition_settings() {
        let defs = GaugeDefinitions::from_yaml(BASE).unwrap();
        let gauges: Vec<Gauge> = defs.instruments().collect();
        assert_eq!(gauges.len(), 2);
        let fuel = gauges.iter().find(|g| g.gauge_type() == "FuelLevel").unwrap();
        assert!(fuel.is_changeable());
        assert_eq!(fuel.classifier().increment(), 0.5);
    }

    #[test]
    fn replacement_values_come_from_yaml_scalars() {
        let defs = GaugeDefinitions::from_yaml(CAR_OVERRIDE).unwrap();
        let gear = defs.classifier("Gear").unwrap();
        let reverse = gear.apply(&Values::new("Gear", -1i64, ""), "");
        assert_eq!(reverse.state(), "REVERSE");
        assert_eq!(reverse.string(), "R");
    }

    #[test]
    fn bad_field_types_are_reported() {
        let err = GaugeDefinitions::from_yaml("Tachometer:\n  maximum: lots\n").unwrap_err();
        assert!(matches!(err, PathError::Config { .. }));
    }
}
