//! The typed value container.
//!
//! Every read in this crate produces a [`Values`]: one or more named [`Entry`]s,
//! each carrying a [`Data`] value plus its unit of measure, state, formatting
//! hints, language and staleness bookkeeping.
//!
//! ## Example
//!
//! ```rust
//! use gaugepath::{Values, state};
//!
//! let speed = Values::new("Speed", 100.0, "kph");
//! let mph = speed.convert("mph");
//!
//! assert!((mph.double() - 62.14).abs() < 0.1);
//! assert_eq!(mph.unit(), "mph");
//! assert_eq!(speed.unit(), "kph"); // the source is never mutated
//! assert_eq!(mph.state(), state::NORMAL);
//! ```
//!
//! ## Sentinels
//!
//! Reading a value as a number never fails: `double()` yields `NaN`, `long()`
//! yields `0` and `boolean()` yields `false` when the value cannot be
//! interpreted. Callers that need to tell a real zero from a failed parse use
//! the `try_` accessors or [`Data::as_f64`] which return a [`Parsed`].

mod data;
mod entry;
pub mod format;
pub mod json;
pub mod state;
mod values;

pub use data::{Data, Parsed};
pub use entry::Entry;
pub use json::EntryRecord;
pub use values::Values;
