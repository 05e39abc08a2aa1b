//! Unit definitions document and lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error, info};

use super::strip_approximate;
use crate::locale::MeasurementSystem;
use crate::{PathError, Result};

const BUILTIN_UNITS: &str = include_str!("default_units.yaml");

/// One unit's presentation names and outgoing conversion factors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitDefinition {
    pub abbreviation: Option<String>,
    pub singular: Option<String>,
    pub plural: Option<String>,
    /// Counterpart symbol used for `IMPERIAL` (and `NATIVE` in imperial regions).
    pub imperial: Option<String>,
    /// Counterpart symbol used for `METRIC`.
    pub metric: Option<String>,
    /// Target symbol to multiplicative factor.
    pub conversions: HashMap<String, f64>,
}

impl UnitDefinition {
    /// Overlays `other` onto `self` field by field and conversion by conversion.
    pub fn merge(&mut self, other: &UnitDefinition) {
        if other.abbreviation.is_some() {
            self.abbreviation.clone_from(&other.abbreviation);
        }
        if other.singular.is_some() {
            self.singular.clone_from(&other.singular);
        }
        if other.plural.is_some() {
            self.plural.clone_from(&other.plural);
        }
        if other.imperial.is_some() {
            self.imperial.clone_from(&other.imperial);
        }
        if other.metric.is_some() {
            self.metric.clone_from(&other.metric);
        }
        for (target, factor) in &other.conversions {
            self.conversions.insert(target.clone(), *factor);
        }
    }

    /// Factor to `target`, exact symbol first, then case-insensitively.
    pub fn factor_to(&self, target: &str) -> Option<f64> {
        self.conversions.get(target).copied().or_else(|| {
            self.conversions
                .iter()
                .find(|(symbol, _)| symbol.eq_ignore_ascii_case(target))
                .map(|(_, factor)| *factor)
        })
    }
}

/// The process-wide table of unit definitions.
///
/// Lookups accept the exact symbol or, failing that, a case-insensitive match.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    units: HashMap<String, UnitDefinition>,
    folded: HashMap<String, String>,
}

impl UnitTable {
    /// The definitions shipped with the crate.
    ///
    /// The document is embedded at compile time and `builtin_table_parses`
    /// keeps it valid. Should it ever fail, conversions degrade to the
    /// formulas and same-unit passes rather than failing every lookup.
    pub fn builtin() -> Self {
        match Self::from_yaml(BUILTIN_UNITS) {
            Ok(table) => table,
            Err(e) => {
                error!(error = %e, "Built-in unit definitions failed to parse, conversions limited");
                Self::default()
            }
        }
    }

    /// Parse a unit definitions document.
    pub fn from_yaml(document: &str) -> Result<Self> {
        let units: HashMap<String, UnitDefinition> = serde_yaml_ng::from_str(document)
            .map_err(|e| PathError::config("unit definitions", e.to_string()))?;
        let mut table = Self::default();
        for (symbol, definition) in units {
            table.insert(symbol, definition);
        }
        debug!(units = table.len(), "Parsed unit definitions");
        Ok(table)
    }

    /// Load a unit definitions document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .map_err(|e| PathError::file_error(path.to_path_buf(), e))?;
        let table = Self::from_yaml(&document)?;
        info!(path = %path.display(), units = table.len(), "Loaded unit definitions");
        Ok(table)
    }

    pub fn insert(&mut self, symbol: impl Into<String>, definition: UnitDefinition) {
        let symbol = symbol.into();
        self.folded.insert(symbol.to_lowercase(), symbol.clone());
        self.units.insert(symbol, definition);
    }

    /// Overlay a later-loaded table key by key.
    pub fn merge(&mut self, other: &UnitTable) {
        for (symbol, definition) in &other.units {
            match self.key_of(symbol) {
                Some(existing) => {
                    if let Some(current) = self.units.get_mut(&existing) {
                        current.merge(definition);
                    }
                }
                None => self.insert(symbol.clone(), definition.clone()),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn key_of(&self, symbol: &str) -> Option<String> {
        if self.units.contains_key(symbol) {
            return Some(symbol.to_string());
        }
        self.folded.get(&symbol.to_lowercase()).cloned()
    }

    /// Definition for `symbol` (the `~` marker is ignored).
    pub fn get(&self, symbol: &str) -> Option<&UnitDefinition> {
        let symbol = strip_approximate(symbol);
        self.units.get(symbol).or_else(|| {
            self.folded.get(&symbol.to_lowercase()).and_then(|key| self.units.get(key))
        })
    }

    /// Forward factor `from -> to` declared in the table.
    pub fn factor(&self, from: &str, to: &str) -> Option<f64> {
        self.get(from)?.factor_to(to)
    }

    /// The `IMPERIAL` / `METRIC` counterpart of `symbol`.
    pub fn counterpart(&self, symbol: &str, system: MeasurementSystem) -> Option<&str> {
        let definition = self.get(symbol)?;
        match system {
            MeasurementSystem::Imperial => definition.imperial.as_deref(),
            MeasurementSystem::Metric => definition.metric.as_deref(),
        }
    }

    /// Abbreviation for display, keeping a leading `~`.
    pub fn abbreviation(&self, symbol: &str) -> String {
        let bare = strip_approximate(symbol);
        let abbr = self.get(bare).and_then(|d| d.abbreviation.as_deref()).unwrap_or(bare);
        if bare.len() == symbol.len() { abbr.to_string() } else { format!("~{abbr}") }
    }

    /// Singular name when `value` is exactly one, plural otherwise.
    pub fn description(&self, symbol: &str, value: f64) -> String {
        let bare = strip_approximate(symbol);
        let Some(definition) = self.get(bare) else {
            return bare.to_string();
        };
        let singular = (value.abs() - 1.0).abs() < f64::EPSILON;
        let name = if singular {
            definition.singular.as_deref().or(definition.plural.as_deref())
        } else {
            definition.plural.as_deref().or(definition.singular.as_deref())
        };
        name.unwrap_or(bare).to_string()
    }
}
