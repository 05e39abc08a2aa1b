//! Conversion resolution between unit symbols.

use tracing::trace;

use super::{ConversionTable, UnitTable, global, is_approximate, strip_approximate};
use crate::locale::{Locale, MeasurementSystem};
use crate::value::Values;

/// How to turn a value in one unit into another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    Identity,
    Factor(f64),
    CelsiusToFahrenheit,
    FahrenheitToCelsius,
}

impl Conversion {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Conversion::Identity => value,
            Conversion::Factor(factor) => value * factor,
            Conversion::CelsiusToFahrenheit => value * 9.0 / 5.0 + 32.0,
            Conversion::FahrenheitToCelsius => (value - 32.0) * 5.0 / 9.0,
        }
    }

    fn factor(self) -> Option<f64> {
        match self {
            Conversion::Identity => Some(1.0),
            Conversion::Factor(factor) => Some(factor),
            _ => None,
        }
    }
}

fn is_celsius(symbol: &str) -> bool {
    ["C", "°C", "degC", "celsius"].iter().any(|s| s.eq_ignore_ascii_case(symbol))
}

fn is_fahrenheit(symbol: &str) -> bool {
    ["F", "°F", "degF", "fahrenheit"].iter().any(|s| s.eq_ignore_ascii_case(symbol))
}

/// Resolves `from -> to` (both without the `~` marker).
///
/// Order: temperature formulas, local forward, global forward, local reverse,
/// global reverse, then compound `a/b` symbols side by side.
pub fn resolve(
    from: &str,
    to: &str,
    local: &ConversionTable,
    table: &UnitTable,
) -> Option<Conversion> {
    if from.eq_ignore_ascii_case(to) {
        return Some(Conversion::Identity);
    }
    if is_celsius(from) && is_fahrenheit(to) {
        return Some(Conversion::CelsiusToFahrenheit);
    }
    if is_fahrenheit(from) && is_celsius(to) {
        return Some(Conversion::FahrenheitToCelsius);
    }
    if let Some(factor) = local.factor(from, to).or_else(|| table.factor(from, to)) {
        return Some(Conversion::Factor(factor));
    }
    let reverse = local.factor(to, from).or_else(|| table.factor(to, from));
    if let Some(factor) = reverse.filter(|f| *f != 0.0) {
        return Some(Conversion::Factor(1.0 / factor));
    }

    let (from_num, from_den) = from.split_once('/')?;
    let (to_num, to_den) = to.split_once('/')?;
    let numerator = resolve(from_num, to_num, local, table)?.factor()?;
    let denominator = resolve(from_den, to_den, local, table)?.factor()?;
    if denominator == 0.0 {
        return None;
    }
    Some(Conversion::Factor(numerator / denominator))
}

fn mark(symbol: &str, approximate: bool) -> String {
    if approximate { format!("~{symbol}") } else { symbol.to_string() }
}

/// Returns a copy of `values` with the entry `name` expressed in `target`.
///
/// `target` may be a unit symbol, `IMPERIAL`, `METRIC` or `NATIVE` (resolved
/// from the entry's language). A conversion that cannot be resolved returns
/// the unconverted copy. The `~` marker survives if either side carries it.
pub fn convert(values: &Values, name: &str, target: &str) -> Values {
    let mut result = values.clone();
    let Some(entry) = values.entry(name) else {
        return result;
    };

    let source_unit = entry.unit();
    let approximate = is_approximate(source_unit) || is_approximate(target);
    let from = strip_approximate(source_unit);
    let requested = strip_approximate(target.trim());
    if requested.is_empty() {
        return result;
    }

    let table = global();
    let system = if requested.eq_ignore_ascii_case("NATIVE") {
        Some(Locale::parse(entry.lang()).measurement_system())
    } else if requested.eq_ignore_ascii_case("IMPERIAL") {
        Some(MeasurementSystem::Imperial)
    } else if requested.eq_ignore_ascii_case("METRIC") {
        Some(MeasurementSystem::Metric)
    } else {
        None
    };
    let to = match system {
        Some(system) => match table.counterpart(from, system) {
            Some(symbol) => symbol.to_string(),
            None => {
                trace!(unit = from, system = system.symbol(), "No counterpart unit");
                return result;
            }
        },
        None => requested.to_string(),
    };

    if from.eq_ignore_ascii_case(&to) {
        result.set_unit_of(name, mark(from, approximate));
        return result;
    }

    let Some(conversion) = resolve(from, &to, values.conversions(), table) else {
        trace!(from, to = %to, "No conversion path, value left unconverted");
        return result;
    };
    let Some(converted) = entry.value().map_numeric(&|v| conversion.apply(v)) else {
        trace!(from, to = %to, "Value is not numeric, left unconverted");
        return result;
    };

    result.replace_value_of(name, converted);
    result.set_unit_of(name, mark(&to, approximate));
    result
}

/// Converts a bare number; `None` when no conversion path exists.
pub fn convert_scalar(value: f64, from: &str, to: &str, local: &ConversionTable) -> Option<f64> {
    let from = strip_approximate(from);
    let to = strip_approximate(to);
    if from.is_empty() || to.is_empty() {
        return Some(value);
    }
    resolve(from, to, local, global()).map(|c| c.apply(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn speed_scenario() {
        let mph = convert(&Values::new("Speed", 100.0, "kph"), "Speed", "mph");
        assert!((mph.double() - 62.14).abs() < 0.1);
        assert_eq!(mph.unit(), "mph");
    }

    #[test]
    fn no_op_and_empty_target_keep_value() {
        let v = Values::new("Fuel", 42.5, "l");
        for target in ["", "l", "L"] {
            let same = convert(&v, "Fuel", target);
            assert_eq!(same.double(), 42.5);
        }
    }

    #[test]
    fn temperature_uses_formulas() {
        let f = convert(&Values::new("Water", 100.0, "C"), "Water", "F");
        assert!(close(f.double(), 212.0));
        let c = convert(&Values::new("Water", 32.0, "F"), "Water", "C");
        assert!(close(c.double(), 0.0));
    }

    #[test]
    fn reverse_lookup_divides() {
        let mut local = ConversionTable::default();
        local.insert("kg", "l", 1.25);
        let mut v = Values::new("Fuel", 10.0, "l");
        v.add_conversion("kg", "l", 1.25);
        let kg = convert(&v, "Fuel", "kg");
        assert!(close(kg.double(), 8.0));
        assert_eq!(resolve("l", "kg", &local, &UnitTable::default()), Some(Conversion::Factor(0.8)));
    }

    #[test]
    fn local_override_wins_over_global() {
        let mut v = Values::new("Speed", 10.0, "kph");
        v.add_conversion("kph", "mph", 0.5);
        assert!(close(convert(&v, "Speed", "mph").double(), 5.0));
        // Copies carry the override.
        let copy = v.convert("kph");
        assert_eq!(copy.conversions().factor("kph", "mph"), Some(0.5));
    }

    #[test]
    fn compound_units_split_and_recombine() {
        let v = Values::new("FuelPerLap", 2.0, "l/lap");
        let imperial = convert(&v, "FuelPerLap", "gal/lap");
        assert!(close(imperial.double(), 2.0 * 0.264172052));
        assert_eq!(imperial.unit(), "gal/lap");

        let per_minute = convert(&Values::new("Flow", 60.0, "l/h"), "Flow", "l/min");
        assert!(close(per_minute.double(), 1.0));
    }

    #[test]
    fn unknown_conversion_returns_unconverted_copy() {
        let v = Values::new("Widgets", 3.0, "widget");
        let same = convert(&v, "Widgets", "gadget");
        assert_eq!(same.double(), 3.0);
        assert_eq!(same.unit(), "widget");
    }

    #[test]
    fn system_targets() {
        let v = Values::new("Speed", 100.0, "kph");
        assert_eq!(convert(&v, "Speed", "IMPERIAL").unit(), "mph");
        assert_eq!(convert(&v, "Speed", "METRIC").unit(), "kph");

        let mut gb = v.clone();
        gb.set_lang("en-GB");
        assert_eq!(convert(&gb, "Speed", "NATIVE").unit(), "kph");
        let mut us = v.clone();
        us.set_lang("en-US");
        assert_eq!(convert(&us, "Speed", "NATIVE").unit(), "mph");
    }

    #[test]
    fn source_is_never_mutated() {
        let v = Values::new("Speed", 100.0, "kph");
        let _ = convert(&v, "Speed", "mph");
        assert_eq!(v.double(), 100.0);
        assert_eq!(v.unit(), "kph");
    }

    #[test]
    fn strings_and_lists_convert_numerically() {
        let text = convert(&Values::new("Len", "1000", "m"), "Len", "km");
        assert!(close(text.double(), 1.0));

        let list = convert(&Values::new("Splits", vec![1.0, 2.0], "km"), "Splits", "m");
        assert_eq!(list.value().to_string(), "1000,2000");
    }

    const PAIRS: &[(&str, &str)] = &[
        ("kph", "mph"),
        ("m/s", "km/h"),
        ("l", "gal"),
        ("kg", "lb"),
        ("kPa", "psi"),
        ("C", "F"),
        ("m", "ft"),
        ("s", "min"),
        ("l/lap", "gal/lap"),
    ];

    proptest! {
        #[test]
        fn round_trip_restores_value(
            value in -1.0e6f64..1.0e6,
            pair in prop::sample::select(PAIRS),
        ) {
            let (u1, u2) = pair;
            let start = Values::new("x", value, u1);
            let back = convert(&convert(&start, "x", u2), "x", u1);
            prop_assert!(close(back.double(), value), "{} -> {} -> {}", value, u2, back.double());
            prop_assert_eq!(back.unit(), u1);
        }

        #[test]
        fn approximation_marker_appears_exactly_once(
            value in 0.0f64..1000.0,
            source_marked in any::<bool>(),
            target_marked in any::<bool>(),
            pair in prop::sample::select(PAIRS),
        ) {
            let (u1, u2) = pair;
            let source = if source_marked { format!("~{u1}") } else { u1.to_string() };
            let target = if target_marked { format!("~{u2}") } else { u2.to_string() };
            let converted = convert(&Values::new("x", value, source), "x", &target);

            let unit = converted.unit();
            let markers = unit.matches('~').count();
            if source_marked || target_marked {
                prop_assert_eq!(markers, 1);
                prop_assert!(unit.starts_with('~'));
            } else {
                prop_assert_eq!(markers, 0);
            }
        }
    }
}
