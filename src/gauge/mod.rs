//! Range classification and the addressable instrument.
//!
//! A [`Classifier`] holds named `[start, end)` ranges per context (the default
//! `""` table plus optional gear or gear-power tables such as `"4"` and
//! `"4-100"`) and maps a reading to a state and a percent-within-range.
//! Overlapping ranges are allowed: scanning in start order, the last match
//! wins, so a narrow `SHIFT` range overrides a `NORMAL` range spanning everything.
//!
//! ```rust
//! use gaugepath::gauge::{Classifier, RangeEntry};
//! use gaugepath::Values;
//!
//! let tach = Classifier::new("Tachometer", "rev/min")
//!     .with_range("", RangeEntry::new("NORMAL", 0.0, 9000.0))
//!     .with_range("", RangeEntry::new("SHIFT", 7000.0, 8000.0));
//!
//! let rpm = tach.apply(&Values::new("rpm", 7500.0, "rev/min"), "");
//! assert_eq!(rpm.state(), "SHIFT");
//! assert_eq!(rpm.state_percent(), 50.0);
//! ```

mod classifier;
mod definitions;
mod instrument;
mod range;

pub use classifier::{
    Classification, Classifier, DEFAULT_CONTEXT, round_to_increment, round_up_to_increment,
};
pub use definitions::{GaugeDefinition, GaugeDefinitions, RangeDefinition};
pub use instrument::Gauge;
pub use range::{RangeEntry, RangeOrder, RangeTable, Replacement};
