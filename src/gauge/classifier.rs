//! Maps a raw value onto a named operating state.

use std::collections::HashMap;
use tracing::trace;

use super::range::{RangeEntry, RangeOrder, RangeTable, Replacement};
use crate::units::{ConversionTable, convert_scalar};
use crate::value::{Values, state};

/// Context key of the table used when no gear/power specific one exists.
pub const DEFAULT_CONTEXT: &str = "";

/// Result of classifying one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub state: String,
    /// Position within the matched range, 0..100.
    pub percent: f64,
    pub replacement: Option<Replacement>,
}

/// An instrument's immutable range configuration.
///
/// Built once from the merged gauge documents and swapped as a whole on reload.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    gauge_type: String,
    unit: String,
    order: RangeOrder,
    minimum: f64,
    maximum: f64,
    increment: f64,
    tables: HashMap<String, RangeTable>,
}

impl Classifier {
    pub fn new(gauge_type: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            gauge_type: gauge_type.into(),
            unit: unit.into(),
            order: RangeOrder::Ascending,
            minimum: f64::NEG_INFINITY,
            maximum: f64::INFINITY,
            increment: 0.0,
            tables: HashMap::new(),
        }
    }

    pub fn with_order(mut self, order: RangeOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_capacity(mut self, minimum: f64, maximum: f64, increment: f64) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self.increment = increment;
        self
    }

    /// Adds a range to the table for `context` (`""` for the default table).
    pub fn with_range(mut self, context: &str, range: RangeEntry) -> Self {
        self.add_range(context, range);
        self
    }

    pub fn add_range(&mut self, context: &str, range: RangeEntry) {
        self.tables.entry(context.to_string()).or_default().insert(range);
    }

    pub fn gauge_type(&self) -> &str {
        &self.gauge_type
    }

    /// Internal unit ranges and capacities are compared in.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn order(&self) -> RangeOrder {
        self.order
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Table for `context`, else for its gear-only part (before the first
    /// `-`), else the default table.
    pub fn table_for(&self, context: &str) -> Option<&RangeTable> {
        self.tables
            .get(context)
            .or_else(|| {
                let gear = context.split_once('-').map_or(context, |(gear, _)| gear);
                self.tables.get(gear)
            })
            .or_else(|| self.tables.get(DEFAULT_CONTEXT))
    }

    /// Classifies the default entry of `value`.
    ///
    /// Returns `None` when the value already carries a deliberate state, is not
    /// numeric, or falls in no range.
    pub fn classify(&self, value: &Values, context: &str) -> Option<Classification> {
        if !state::is_unset(value.state()) {
            return None;
        }
        let raw = value.try_double()?;
        let v = self.to_internal(raw, value.unit(), value.conversions())?;
        let table = self.table_for(context)?;

        let mut matched: Option<(&RangeEntry, f64, f64)> = None;
        for range in table.scan(self.order) {
            let range_unit = if range.unit.is_empty() { self.unit.as_str() } else { &range.unit };
            let (Some(start), Some(end)) = (
                self.to_internal(range.start, range_unit, value.conversions()),
                self.to_internal(range.end, range_unit, value.conversions()),
            ) else {
                continue;
            };
            if start <= v && v < end {
                matched = Some((range, start, end));
            }
        }

        let (range, start, end) = matched?;
        let span = end - start;
        let percent = if span.is_finite() && span > 0.0 { (v - start) / span * 100.0 } else { 0.0 };
        trace!(gauge = %self.gauge_type, value = v, state = %range.state, percent, "Classified");
        Some(Classification {
            state: range.state.clone(),
            percent,
            replacement: range.replacement.clone(),
        })
    }

    /// A classified copy of `value`: state and percent set, and the value and
    /// unit replaced when the matched range carries a replacement.
    pub fn apply(&self, value: &Values, context: &str) -> Values {
        let mut result = value.clone();
        if let Some(classification) = self.classify(value, context) {
            result.set_state(classification.state);
            result.set_state_percent(classification.percent);
            if let Some(replacement) = classification.replacement {
                result.set_value(replacement.value);
                result.set_unit(replacement.unit);
            }
        }
        result
    }

    fn to_internal(&self, value: f64, unit: &str, local: &ConversionTable) -> Option<f64> {
        if value.is_infinite() {
            return Some(value);
        }
        convert_scalar(value, unit, &self.unit, local)
    }

    pub fn round_to_increment(&self, value: f64) -> f64 {
        round_to_increment(value, self.increment, self.minimum, self.maximum)
    }

    pub fn round_up_to_increment(&self, value: f64) -> f64 {
        round_up_to_increment(value, self.increment, self.minimum, self.maximum)
    }
}

/// Tolerance when deciding whether a value sits exactly on an increment.
const ON_INCREMENT_EPSILON: f64 = 1e-9;

/// Nearest multiple of `increment`, rounding up from the half-way point.
pub fn round_to_increment(value: f64, increment: f64, minimum: f64, maximum: f64) -> f64 {
    if !(increment > 0.0) || !value.is_finite() {
        return value;
    }
    let floor = (value / increment).floor() * increment;
    let rounded = if value - floor >= increment / 2.0 { floor + increment } else { floor };
    clamp_outward(value, rounded, minimum, maximum)
}

/// Next multiple of `increment` at or above `value`.
pub fn round_up_to_increment(value: f64, increment: f64, minimum: f64, maximum: f64) -> f64 {
    if !(increment > 0.0) || !value.is_finite() {
        return value;
    }
    let floor = (value / increment).floor() * increment;
    let rounded =
        if value - floor > increment * ON_INCREMENT_EPSILON { floor + increment } else { floor };
    clamp_outward(value, rounded, minimum, maximum)
}

/// Pulls a rounded result back to a bound it crossed. A value already beyond
/// a bound stays beyond it and is never rounded back inside.
fn clamp_outward(original: f64, rounded: f64, minimum: f64, maximum: f64) -> f64 {
    let mut result = rounded;
    if original <= maximum && result > maximum {
        result = maximum;
    }
    if original > maximum && result < maximum {
        result = maximum;
    }
    if original >= minimum && result < minimum {
        result = minimum;
    }
    if original < minimum && result > minimum {
        result = minimum;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tachometer() -> Classifier {
        Classifier::new("Tachometer", "rev/min")
            .with_range("", RangeEntry::new("NORMAL", 0.0, 9000.0))
            .with_range("", RangeEntry::new("SHIFT", 7000.0, 8000.0))
            .with_range("", RangeEntry::new("OVERLIMIT", 8000.0, f64::INFINITY))
    }

    #[test]
    fn overlapping_ranges_highest_start_wins() {
        let c = Classifier::new("Test", "")
            .with_range("", RangeEntry::new("A", 0.0, 100.0))
            .with_range("", RangeEntry::new("B", 50.0, 150.0));

        let at_75 = c.classify(&Values::new("x", 75.0, ""), "").unwrap();
        assert_eq!(at_75.state, "B");
        assert!((at_75.percent - 25.0).abs() < 1e-9);

        let at_25 = c.classify(&Values::new("x", 25.0, ""), "").unwrap();
        assert_eq!(at_25.state, "A");
    }

    #[test]
    fn descending_order_lets_lowest_start_win() {
        let c = Classifier::new("Test", "")
            .with_order(RangeOrder::Descending)
            .with_range("", RangeEntry::new("A", 0.0, 100.0))
            .with_range("", RangeEntry::new("B", 50.0, 150.0));
        assert_eq!(c.classify(&Values::new("x", 75.0, ""), "").unwrap().state, "A");
    }

    #[test]
    fn shift_scenario() {
        let result = tachometer().apply(&Values::new("ValueCurrent", 7500.0, "rev/min"), "");
        assert_eq!(result.state(), "SHIFT");
        assert!((result.state_percent() - 50.0).abs() < 1e-9);
        assert_eq!(result.double(), 7500.0);
    }

    #[test]
    fn end_is_exclusive() {
        let result = tachometer().apply(&Values::new("rpm", 8000.0, "rev/min"), "");
        assert_eq!(result.state(), "OVERLIMIT");
        assert_eq!(result.state_percent(), 0.0);
    }

    #[test]
    fn deliberate_state_is_not_overridden() {
        let value = Values::with_state("rpm", 7500.0, "rev/min", state::WARNING);
        assert!(tachometer().classify(&value, "").is_none());
        assert_eq!(tachometer().apply(&value, "").state(), state::WARNING);
    }

    #[test]
    fn context_fallback_order() {
        let c = Classifier::new("Tachometer", "rev/min")
            .with_range("", RangeEntry::new("SHIFT", 7000.0, 8000.0))
            .with_range("4", RangeEntry::new("SHIFT", 7200.0, 8000.0))
            .with_range("4-100", RangeEntry::new("SHIFT", 7400.0, 8000.0));
        let v = Values::new("rpm", 7300.0, "rev/min");

        assert_eq!(c.classify(&v, "4-100"), None);
        assert_eq!(c.classify(&v, "4-50").map(|r| r.state), Some("SHIFT".to_string()));
        assert_eq!(c.table_for("4-50").map(RangeTable::len), Some(1));
        assert!(c.table_for("5").is_some_and(|t| t.ranges()[0].start == 7000.0));
    }

    #[test]
    fn ranges_and_value_are_normalized_to_internal_unit() {
        let c = Classifier::new("Speedometer", "km/h")
            .with_range("", RangeEntry::new("PITLIMIT", 0.0, 50.0).with_unit("mph"));
        // 60 km/h is ~37 mph, inside [0, 50) mph.
        let result = c.apply(&Values::new("Speed", 60.0, "km/h"), "");
        assert_eq!(result.state(), "PITLIMIT");
        // 100 mph is outside.
        let fast = c.apply(&Values::new("Speed", 100.0, "mph"), "");
        assert_eq!(fast.state(), state::NORMAL);
    }

    #[test]
    fn replacement_keeps_state_from_raw_value() {
        let c = Classifier::new("Gear", "").with_range(
            "",
            RangeEntry::new("REVERSE", -1.0, 0.0).with_replacement("R", ""),
        );
        let result = c.apply(&Values::new("Gear", -1i64, ""), "");
        assert_eq!(result.state(), "REVERSE");
        assert_eq!(result.string(), "R");
    }

    #[test]
    fn rounding_examples() {
        assert_eq!(round_to_increment(12.4, 5.0, 0.0, 100.0), 10.0);
        assert_eq!(round_to_increment(12.5, 5.0, 0.0, 100.0), 15.0);
        assert_eq!(round_up_to_increment(10.1, 5.0, 0.0, 100.0), 15.0);
        assert_eq!(round_up_to_increment(10.0, 5.0, 0.0, 100.0), 10.0);
        // Rounded past max while inside: clamp back.
        assert_eq!(round_to_increment(99.0, 60.0, 0.0, 100.0), 100.0);
        // Already over capacity: never rounded back below max.
        assert_eq!(round_to_increment(101.0, 30.0, 0.0, 100.0), 100.0);
        assert_eq!(round_to_increment(200.0, 30.0, 0.0, 100.0), 210.0);
        // Symmetric at the minimum.
        assert_eq!(round_to_increment(4.0, 10.0, 3.0, 100.0), 3.0);
        assert_eq!(round_to_increment(2.0, 10.0, 3.0, 100.0), 0.0);
        assert_eq!(round_to_increment(-7.0, 5.0, 0.0, 100.0), -5.0);
        // No increment configured.
        assert_eq!(round_to_increment(12.34, 0.0, 0.0, 100.0), 12.34);
    }

    proptest! {
        #[test]
        fn rounding_never_crosses_a_bound_inward(
            value in -500.0f64..500.0,
            increment in 0.5f64..50.0,
        ) {
            let (min, max) = (-100.0, 100.0);
            for rounded in [
                round_to_increment(value, increment, min, max),
                round_up_to_increment(value, increment, min, max),
            ] {
                if (min..=max).contains(&value) {
                    prop_assert!((min..=max).contains(&rounded));
                }
                if value > max {
                    prop_assert!(rounded >= max);
                }
                if value < min {
                    prop_assert!(rounded <= min);
                }
            }
        }

        #[test]
        fn single_range_percent_is_linear(start in -1000.0f64..1000.0, width in 1.0f64..500.0, t in 0.0f64..0.999) {
            let c = Classifier::new("x", "").with_range("", RangeEntry::new("IN", start, start + width));
            let v = start + t * width;
            let result = c.classify(&Values::new("v", v, ""), "");
            prop_assert!(result.is_some());
            let result = result.unwrap();
            prop_assert_eq!(result.state.as_str(), "IN");
            prop_assert!((result.percent - t * 100.0).abs() < 1e-6);
        }
    }
}
