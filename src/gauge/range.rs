//! Named numeric ranges.

use serde::{Deserialize, Serialize};

use crate::value::Data;

/// Direction ranges are scanned in. The last match in scan order wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOrder {
    #[default]
    Ascending,
    Descending,
}

/// Value substituted into the result when a range matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    pub value: Data,
    pub unit: String,
}

/// `[start, end)` in `unit`, mapped to `state`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeEntry {
    pub state: String,
    pub start: f64,
    pub end: f64,
    /// Unit of `start`/`end`; empty means the classifier's own unit.
    pub unit: String,
    pub replacement: Option<Replacement>,
}

impl RangeEntry {
    pub fn new(state: impl Into<String>, start: f64, end: f64) -> Self {
        Self { state: state.into(), start, end, unit: String::new(), replacement: None }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_replacement(mut self, value: impl Into<Data>, unit: impl Into<String>) -> Self {
        self.replacement = Some(Replacement { value: value.into(), unit: unit.into() });
        self
    }
}

/// Ranges for one context, kept sorted by `start`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeTable {
    ranges: Vec<RangeEntry>,
}

impl RangeTable {
    pub fn new(ranges: impl IntoIterator<Item = RangeEntry>) -> Self {
        let mut table = Self::default();
        for range in ranges {
            table.insert(range);
        }
        table
    }

    /// Inserts keeping `start` order; equal starts keep insertion order.
    pub fn insert(&mut self, range: RangeEntry) {
        let index = self.ranges.partition_point(|r| r.start <= range.start);
        self.ranges.insert(index, range);
    }

    pub fn ranges(&self) -> &[RangeEntry] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Ranges in scan order.
    pub fn scan(&self, order: RangeOrder) -> Box<dyn Iterator<Item = &RangeEntry> + '_> {
        match order {
            RangeOrder::Ascending => Box::new(self.ranges.iter()),
            RangeOrder::Descending => Box::new(self.ranges.iter().rev()),
        }
    }
}
