//! The multi-value container returned by every read.

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::time::{Duration, SystemTime};

use super::{Data, Entry, state};
use crate::units::{self, ConversionTable};

/// A named, typed, unit-bearing value, possibly holding several named
/// sub-values under one id.
///
/// One name is the *default*; every accessor comes in a default form
/// (`unit()`) and a named form (`unit_of(name)`), and the two agree whenever
/// `name == default_name()`. Named getters fall back to sentinels when the name
/// is absent. Entries keep their insertion order.
#[derive(Debug, Clone)]
pub struct Values {
    id: String,
    default_name: String,
    entries: IndexMap<String, Entry>,
    conversions: ConversionTable,
    is_set: bool,
}

impl Values {
    /// A single-entry container.
    pub fn new(name: impl Into<String>, value: impl Into<Data>, unit: impl Into<String>) -> Self {
        let name = name.into();
        let mut entries = IndexMap::new();
        entries.insert(name.clone(), Entry::new(name.clone(), value, unit));
        Self {
            id: name.clone(),
            default_name: name,
            entries,
            conversions: ConversionTable::default(),
            is_set: false,
        }
    }

    /// A single-entry container with an explicit state.
    pub fn with_state(
        name: impl Into<String>,
        value: impl Into<Data>,
        unit: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        let mut values = Self::new(name, value, unit);
        values.set_state(state);
        values
    }

    /// An `ERROR`-state container whose value is `message`.
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_state(name, message.into(), "", state::ERROR)
    }

    /// An empty container meant to collect other containers' values.
    pub fn aggregate(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            default_name: name,
            entries: IndexMap::new(),
            conversions: ConversionTable::default(),
            is_set: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Renames the default entry (and the container) to `name`.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name == self.default_name {
            return;
        }
        if let Some((index, _, mut entry)) = self.entries.shift_remove_full(&self.default_name) {
            entry.set_name(name.clone());
            self.entries.shift_remove(&name);
            let index = index.min(self.entries.len());
            self.entries.shift_insert(index, name.clone(), entry);
        }
        self.default_name = name;
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.get_mut(name)
    }

    pub fn default_entry(&self) -> Option<&Entry> {
        self.entries.get(&self.default_name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Returns the named entry, creating it (inheriting the default entry's
    /// language) when missing.
    fn entry_or_insert(&mut self, name: &str) -> &mut Entry {
        let lang = self.default_entry().map(|e| e.lang().to_string());
        self.entries.entry(name.to_string()).or_insert_with(|| {
            let mut entry = Entry::new(name, Data::default(), "");
            if let Some(lang) = lang {
                entry.set_lang(lang);
            }
            entry
        })
    }

    /// Stores a copy of `other`'s default entry under `name`. Local conversion
    /// tables travel with it.
    pub fn insert_from(&mut self, name: impl Into<String>, other: &Values) {
        let name = name.into();
        if let Some(entry) = other.default_entry() {
            let mut entry = entry.clone();
            entry.set_name(name.clone());
            self.entries.insert(name, entry);
        }
        self.conversions.merge(&other.conversions);
    }

    pub fn insert_entry(&mut self, mut entry: Entry) {
        let name = entry.name().to_string();
        entry.set_name(name.clone());
        self.entries.insert(name, entry);
    }

    // Values

    pub fn value(&self) -> Data {
        self.value_of(&self.default_name)
    }

    pub fn value_of(&self, name: &str) -> Data {
        self.entry(name).map(|e| e.value().clone()).unwrap_or_default()
    }

    /// Assigns the default value; marks it dirty only if it changed.
    pub fn set_value(&mut self, value: impl Into<Data>) -> bool {
        let name = self.default_name.clone();
        self.set_value_of(&name, value)
    }

    pub fn set_value_of(&mut self, name: &str, value: impl Into<Data>) -> bool {
        self.entry_or_insert(name).set_value(value)
    }

    pub(crate) fn replace_value_of(&mut self, name: &str, value: Data) {
        self.entry_or_insert(name).replace_value(value);
    }

    pub fn double(&self) -> f64 {
        self.value().as_f64().value()
    }

    pub fn double_of(&self, name: &str) -> f64 {
        self.value_of(name).as_f64().value()
    }

    /// The default value as a number, or `None` when it is not parseable.
    pub fn try_double(&self) -> Option<f64> {
        self.value().as_f64().ok()
    }

    pub fn try_double_of(&self, name: &str) -> Option<f64> {
        self.value_of(name).as_f64().ok()
    }

    pub fn float(&self) -> f32 {
        self.value().as_f32().value()
    }

    pub fn float_of(&self, name: &str) -> f32 {
        self.value_of(name).as_f32().value()
    }

    pub fn long(&self) -> i64 {
        self.value().as_i64().value()
    }

    pub fn long_of(&self, name: &str) -> i64 {
        self.value_of(name).as_i64().value()
    }

    pub fn try_long(&self) -> Option<i64> {
        self.value().as_i64().ok()
    }

    pub fn integer(&self) -> i32 {
        self.integer_of(&self.default_name)
    }

    pub fn integer_of(&self, name: &str) -> i32 {
        let long = self.long_of(name);
        i32::try_from(long).unwrap_or(if long < 0 { i32::MIN } else { i32::MAX })
    }

    pub fn boolean(&self) -> bool {
        self.value().as_bool().value()
    }

    pub fn boolean_of(&self, name: &str) -> bool {
        self.value_of(name).as_bool().value()
    }

    pub fn try_boolean(&self) -> Option<bool> {
        self.value().as_bool().ok()
    }

    pub fn string(&self) -> String {
        self.value().to_string()
    }

    pub fn string_of(&self, name: &str) -> String {
        self.value_of(name).to_string()
    }

    // Metadata

    pub fn unit(&self) -> &str {
        self.unit_of(&self.default_name)
    }

    pub fn unit_of(&self, name: &str) -> &str {
        self.entry(name).map_or("", Entry::unit)
    }

    pub fn set_unit(&mut self, unit: impl Into<String>) {
        let name = self.default_name.clone();
        self.set_unit_of(&name, unit);
    }

    pub fn set_unit_of(&mut self, name: &str, unit: impl Into<String>) {
        self.entry_or_insert(name).set_unit(unit);
    }

    pub fn requested_unit(&self) -> &str {
        self.requested_unit_of(&self.default_name)
    }

    pub fn requested_unit_of(&self, name: &str) -> &str {
        self.entry(name).map_or("", Entry::requested_unit)
    }

    pub fn set_requested_unit(&mut self, unit: impl Into<String>) {
        let name = self.default_name.clone();
        self.set_requested_unit_of(&name, unit);
    }

    pub fn set_requested_unit_of(&mut self, name: &str, unit: impl Into<String>) {
        self.entry_or_insert(name).set_requested_unit(unit);
    }

    pub fn state(&self) -> &str {
        self.state_of(&self.default_name)
    }

    pub fn state_of(&self, name: &str) -> &str {
        self.entry(name).map_or(state::NOTAVAILABLE, Entry::state)
    }

    pub fn set_state(&mut self, state: impl Into<String>) {
        let name = self.default_name.clone();
        self.set_state_of(&name, state);
    }

    pub fn set_state_of(&mut self, name: &str, state: impl Into<String>) {
        self.entry_or_insert(name).set_state(state);
    }

    pub fn state_percent(&self) -> f64 {
        self.state_percent_of(&self.default_name)
    }

    pub fn state_percent_of(&self, name: &str) -> f64 {
        self.entry(name).map_or(0.0, Entry::state_percent)
    }

    pub fn set_state_percent(&mut self, percent: f64) {
        let name = self.default_name.clone();
        self.set_state_percent_of(&name, percent);
    }

    pub fn set_state_percent_of(&mut self, name: &str, percent: f64) {
        self.entry_or_insert(name).set_state_percent(percent);
    }

    pub fn format(&self) -> &str {
        self.format_of(&self.default_name)
    }

    pub fn format_of(&self, name: &str) -> &str {
        self.entry(name).map_or("", Entry::format)
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        let name = self.default_name.clone();
        self.set_format_of(&name, format);
    }

    pub fn set_format_of(&mut self, name: &str, format: impl Into<String>) {
        self.entry_or_insert(name).set_format(format);
    }

    pub fn lang(&self) -> &str {
        self.lang_of(&self.default_name)
    }

    pub fn lang_of(&self, name: &str) -> &str {
        self.entry(name).map_or(crate::locale::DEFAULT_LANG, Entry::lang)
    }

    /// Sets the language on every entry.
    pub fn set_lang(&mut self, lang: impl Into<String>) {
        let lang = lang.into();
        for entry in self.entries.values_mut() {
            entry.set_lang(lang.clone());
        }
    }

    pub fn set_lang_of(&mut self, name: &str, lang: impl Into<String>) {
        self.entry_or_insert(name).set_lang(lang);
    }

    pub fn interval(&self) -> Duration {
        self.entry(&self.default_name).map_or(Duration::ZERO, Entry::interval)
    }

    pub fn set_interval(&mut self, interval: Duration) {
        let name = self.default_name.clone();
        self.entry_or_insert(&name).set_interval(interval);
    }

    pub fn timestamp(&self) -> SystemTime {
        self.entry(&self.default_name).map_or(SystemTime::UNIX_EPOCH, Entry::timestamp)
    }

    pub fn is_stale(&self) -> bool {
        self.default_entry().is_none_or(Entry::is_stale)
    }

    pub fn is_stale_at(&self, now: SystemTime) -> bool {
        self.default_entry().is_none_or(|e| e.is_stale_at(now))
    }

    pub fn is_dirty(&self) -> bool {
        self.entries.values().any(Entry::is_dirty)
    }

    pub fn clear_dirty(&mut self) {
        for entry in self.entries.values_mut() {
            entry.clear_dirty();
        }
    }

    /// Whether this container was produced by a mutating call.
    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn set_is_set(&mut self, is_set: bool) {
        self.is_set = is_set;
    }

    // Conversion

    /// Local unit conversions checked before the global table.
    pub fn conversions(&self) -> &ConversionTable {
        &self.conversions
    }

    pub fn add_conversion(&mut self, from: &str, to: &str, factor: f64) {
        self.conversions.insert(from, to, factor);
    }

    /// A converted copy of the default entry; `self` is untouched.
    pub fn convert(&self, target_unit: &str) -> Values {
        units::convert(self, &self.default_name, target_unit)
    }

    pub fn convert_of(&self, name: &str, target_unit: &str) -> Values {
        units::convert(self, name, target_unit)
    }

    /// Abbreviation of the default unit, `~` included.
    pub fn uom_abbr(&self) -> String {
        units::global().abbreviation(self.unit())
    }

    /// Singular or plural name of the default unit depending on the value.
    pub fn uom_desc(&self) -> String {
        units::global().description(self.unit(), self.double())
    }

    pub fn value_formatted(&self) -> String {
        self.value_formatted_of(&self.default_name)
    }

    pub fn value_formatted_of(&self, name: &str) -> String {
        match self.entry(name) {
            Some(entry) => super::format::format_entry(entry),
            None => String::new(),
        }
    }
}

impl PartialEq for Values {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_values(other).is_eq()
    }
}

impl PartialOrd for Values {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_values(other))
    }
}

impl Values {
    /// Compares entry values name by name in insertion order; the first
    /// non-equal comparison decides. A name missing on `other` sorts after.
    pub fn cmp_values(&self, other: &Values) -> Ordering {
        if self.entries.len() == 1 && other.entries.len() == 1 {
            if let (Some(a), Some(b)) = (self.entries.first(), other.entries.first()) {
                return a.1.value().compare(b.1.value());
            }
        }
        for (name, entry) in &self.entries {
            let ordering = match other.entries.get(name) {
                Some(theirs) => entry.value().compare(theirs.value()),
                None => Ordering::Greater,
            };
            if ordering.is_ne() {
                return ordering;
            }
        }
        self.entries.len().cmp(&other.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_and_named_accessors_agree() {
        let mut v = Values::new("Speed", 100.0, "km/h");
        v.set_state("WARNING");
        assert_eq!(v.unit(), v.unit_of("Speed"));
        assert_eq!(v.state(), v.state_of("Speed"));
        assert_eq!(v.double(), v.double_of("Speed"));
        assert_eq!(v.lang(), v.lang_of("Speed"));
    }

    #[test]
    fn named_sub_values() {
        let mut v = Values::new("Lap", 3i64, "lap");
        v.set_value_of("Sector", 2i64);
        v.set_unit_of("Sector", "sector");

        assert_eq!(v.len(), 2);
        assert_eq!(v.long(), 3);
        assert_eq!(v.long_of("Sector"), 2);
        assert_eq!(v.unit_of("Sector"), "sector");
        assert_eq!(v.names().collect::<Vec<_>>(), vec!["Lap", "Sector"]);
        assert_eq!(v.unit_of("Missing"), "");
        assert_eq!(v.state_of("Missing"), state::NOTAVAILABLE);
        assert!(v.double_of("Missing").is_nan());
    }

    #[test]
    fn rename_moves_default_entry() {
        let mut v = Values::new("ValueCurrent", 7500.0, "rev/min");
        v.set_name("Car/ME/Gauge/Tachometer/ValueCurrent");
        assert_eq!(v.default_name(), "Car/ME/Gauge/Tachometer/ValueCurrent");
        assert_eq!(v.double(), 7500.0);
        assert_eq!(v.unit(), "rev/min");
        assert_eq!(v.id(), "ValueCurrent");
        assert!(v.entry("ValueCurrent").is_none());
    }

    #[test]
    fn aggregate_collects_default_entries() {
        let mut all = Values::aggregate("Car");
        all.insert_from("Name", &Values::new("Name", "Driver", ""));
        all.insert_from("Gear", &Values::new("Gear", 4i64, ""));
        all.set_name("Car/ME");

        assert_eq!(all.len(), 2);
        assert_eq!(all.string_of("Name"), "Driver");
        assert_eq!(all.default_name(), "Car/ME");
    }

    #[test]
    fn comparison_is_numeric_across_subtypes() {
        let a = Values::new("x", 100i64, "");
        let b = Values::new("y", 100.0f64, "");
        assert_eq!(a, b);
        assert!(Values::new("x", 1.5, "") < Values::new("x", 2i64, ""));

        let mut multi_a = Values::new("a", 1i64, "");
        multi_a.set_value_of("b", 5i64);
        let mut multi_b = multi_a.clone();
        multi_b.set_value_of("b", 6i64);
        assert!(multi_a < multi_b);
    }

    #[test]
    fn set_value_reports_change() {
        let mut v = Values::new("Fuel", 10.0, "l");
        v.clear_dirty();
        assert!(!v.set_value(10.0));
        assert!(!v.is_dirty());
        assert!(v.set_value(9.5));
        assert!(v.is_dirty());
    }

    #[test]
    fn error_container() {
        let v = Values::error("Bogus/Path", "Unknown path 'Bogus/Path'");
        assert_eq!(v.state(), state::ERROR);
        assert!(v.string().contains("Bogus/Path"));
        assert!(!v.is_set());
    }
}
