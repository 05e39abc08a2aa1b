//! Per-container conversion overrides.

use std::collections::HashMap;

/// `from -> to -> factor` overrides carried by one container (and every copy
/// derived from it), consulted before the global table.
///
/// Typical use is a domain-specific conversion that must not apply system-wide,
/// such as fuel weight to volume for one car.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionTable {
    factors: HashMap<String, HashMap<String, f64>>,
}

impl ConversionTable {
    pub fn insert(&mut self, from: &str, to: &str, factor: f64) {
        self.factors.entry(from.to_string()).or_default().insert(to.to_string(), factor);
    }

    /// Forward factor, matching symbols case-insensitively.
    pub fn factor(&self, from: &str, to: &str) -> Option<f64> {
        self.factors
            .iter()
            .filter(|(symbol, _)| symbol.eq_ignore_ascii_case(from))
            .flat_map(|(_, targets)| targets.iter())
            .find(|(symbol, _)| symbol.eq_ignore_ascii_case(to))
            .map(|(_, factor)| *factor)
    }

    /// Adds every override from `other`; entries in `self` win on conflict.
    pub fn merge(&mut self, other: &ConversionTable) {
        for (from, targets) in &other.factors {
            let mine = self.factors.entry(from.clone()).or_default();
            for (to, factor) in targets {
                mine.entry(to.clone()).or_insert(*factor);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
