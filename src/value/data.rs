//! Runtime value variants carried by a container entry.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A value whose concrete variant is inferred from what was assigned.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Data {
    Bool(bool),
    String(String),
    Long(i64),
    Double(f64),
    Float(f32),
    List(Vec<Data>),
}

/// Outcome of reading a value as another type.
///
/// `value()` always yields something usable (the sentinel `NaN`, `0` or `false`
/// when the source could not be interpreted); `is_valid()` tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parsed<T> {
    value: T,
    valid: bool,
}

impl<T: Copy> Parsed<T> {
    pub fn valid(value: T) -> Self {
        Self { value, valid: true }
    }

    pub fn invalid(sentinel: T) -> Self {
        Self { value: sentinel, valid: false }
    }

    /// The parsed value, or the sentinel when parsing failed.
    pub fn value(&self) -> T {
        self.value
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn ok(&self) -> Option<T> {
        self.valid.then_some(self.value)
    }
}

impl Default for Data {
    fn default() -> Self {
        Data::String(String::new())
    }
}

impl Data {
    /// Type label used in the JSON record (`Type`).
    pub fn type_name(&self) -> &'static str {
        match self {
            Data::Bool(_) => "BOOLEAN",
            Data::String(_) => "STRING",
            Data::Long(_) => "LONG",
            Data::Double(_) => "DOUBLE",
            Data::Float(_) => "FLOAT",
            Data::List(_) => "LIST",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Data::Long(_) | Data::Double(_) | Data::Float(_))
    }

    pub fn as_f64(&self) -> Parsed<f64> {
        match self {
            Data::Bool(b) => Parsed::valid(if *b { 1.0 } else { 0.0 }),
            Data::String(s) => match s.trim().parse::<f64>() {
                Ok(v) => Parsed::valid(v),
                Err(_) => Parsed::invalid(f64::NAN),
            },
            Data::Long(v) => Parsed::valid(*v as f64),
            Data::Double(v) => Parsed::valid(*v),
            Data::Float(v) => Parsed::valid(f64::from(*v)),
            Data::List(items) => match items.first() {
                Some(first) => first.as_f64(),
                None => Parsed::invalid(f64::NAN),
            },
        }
    }

    pub fn as_f32(&self) -> Parsed<f32> {
        match self {
            Data::Float(v) => Parsed::valid(*v),
            other => {
                let parsed = other.as_f64();
                if parsed.is_valid() {
                    Parsed::valid(parsed.value() as f32)
                } else {
                    Parsed::invalid(f32::NAN)
                }
            }
        }
    }

    pub fn as_i64(&self) -> Parsed<i64> {
        match self {
            Data::Long(v) => Parsed::valid(*v),
            Data::String(s) => {
                let trimmed = s.trim();
                if let Ok(v) = trimmed.parse::<i64>() {
                    return Parsed::valid(v);
                }
                match trimmed.parse::<f64>() {
                    Ok(v) if v.is_finite() => Parsed::valid(v as i64),
                    _ => Parsed::invalid(0),
                }
            }
            other => {
                let parsed = other.as_f64();
                if parsed.is_valid() && parsed.value().is_finite() {
                    Parsed::valid(parsed.value() as i64)
                } else {
                    Parsed::invalid(0)
                }
            }
        }
    }

    pub fn as_bool(&self) -> Parsed<bool> {
        match self {
            Data::Bool(b) => Parsed::valid(*b),
            Data::String(s) => {
                let s = s.trim();
                if ["true", "yes", "y", "on", "1"].iter().any(|t| s.eq_ignore_ascii_case(t)) {
                    Parsed::valid(true)
                } else if ["false", "no", "n", "off", "0", ""]
                    .iter()
                    .any(|t| s.eq_ignore_ascii_case(t))
                {
                    Parsed::valid(false)
                } else {
                    Parsed::invalid(false)
                }
            }
            Data::List(items) => match items.first() {
                Some(first) => first.as_bool(),
                None => Parsed::invalid(false),
            },
            other => {
                let parsed = other.as_f64();
                Parsed::valid(parsed.is_valid() && parsed.value() != 0.0)
            }
        }
    }

    /// Applies `f` to every numeric component, producing `Double` (or keeping
    /// `Float`). Returns `None` when nothing numeric could be found.
    pub fn map_numeric(&self, f: &dyn Fn(f64) -> f64) -> Option<Data> {
        match self {
            Data::Long(v) => Some(Data::Double(f(*v as f64))),
            Data::Double(v) => Some(Data::Double(f(*v))),
            Data::Float(v) => Some(Data::Float(f(f64::from(*v)) as f32)),
            Data::String(s) => s.trim().parse::<f64>().ok().map(|v| Data::Double(f(v))),
            Data::List(items) => {
                let mapped: Option<Vec<Data>> = items.iter().map(|i| i.map_numeric(f)).collect();
                mapped.map(Data::List)
            }
            Data::Bool(_) => None,
        }
    }

    /// Total comparison used for container equality and ordering.
    ///
    /// Numeric variants compare numerically regardless of subtype; strings
    /// lexicographically; anything else by its string form.
    pub fn compare(&self, other: &Data) -> Ordering {
        match (self, other) {
            (Data::Bool(a), Data::Bool(b)) => a.cmp(b),
            (Data::String(a), Data::String(b)) => a.cmp(b),
            (Data::Long(a), Data::Long(b)) => a.cmp(b),
            (Data::List(a), Data::List(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| x.compare(y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (x, y) = (a.as_f64().value(), b.as_f64().value());
                x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
            }
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other).is_eq()
    }
}

impl PartialOrd for Data {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Bool(b) => write!(f, "{b}"),
            Data::String(s) => f.write_str(s),
            Data::Long(v) => write!(f, "{v}"),
            Data::Double(v) => write!(f, "{v}"),
            Data::Float(v) => write!(f, "{v}"),
            Data::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Data {
    fn from(v: bool) -> Self {
        Data::Bool(v)
    }
}

impl From<&str> for Data {
    fn from(v: &str) -> Self {
        Data::String(v.to_string())
    }
}

impl From<String> for Data {
    fn from(v: String) -> Self {
        Data::String(v)
    }
}

impl From<i64> for Data {
    fn from(v: i64) -> Self {
        Data::Long(v)
    }
}

impl From<i32> for Data {
    fn from(v: i32) -> Self {
        Data::Long(i64::from(v))
    }
}

impl From<u32> for Data {
    fn from(v: u32) -> Self {
        Data::Long(i64::from(v))
    }
}

impl From<f64> for Data {
    fn from(v: f64) -> Self {
        Data::Double(v)
    }
}

impl From<f32> for Data {
    fn from(v: f32) -> Self {
        Data::Float(v)
    }
}

impl<T: Into<Data>> From<Vec<T>> for Data {
    fn from(v: Vec<T>) -> Self {
        Data::List(v.into_iter().map(Into::into).collect())
    }
}
