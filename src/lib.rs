//! Path-addressed, unit-aware data access over live racing simulation telemetry.
//!
//! gaugepath sits between a simulator reader (which feeds an in-memory object
//! graph) and whatever wants to display or serve that data. Every value is
//! addressed by a `/`-delimited path and comes back as a [`Values`] container
//! carrying the value, its unit, a classification state and formatting hints.
//!
//! # Features
//!
//! - **Typed container**: `Values` infers its data type and never fails a read
//! - **Unit conversion**: global and per-container tables, compound and
//!   approximate units, `NATIVE`/`IMPERIAL`/`METRIC` targets
//! - **Range classification**: overlapping named ranges per gear/power context
//! - **Path dispatch**: per-type operation registries built once per process
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use gaugepath::gauge::GaugeDefinitions;
//! use gaugepath::{Car, CarInfo, Session, SessionInfo, Simulator, Track, state};
//!
//! let gauges = GaugeDefinitions::from_yaml(
//!     "Tachometer:\n  uom: rev/min\n  states:\n    \"\":\n      NORMAL: { start: 0, end: 9000 }\n      SHIFT: { start: 7000, end: 8000 }\n",
//! )?;
//!
//! let session = Session::new(SessionInfo::default(), Arc::new(Track::default()));
//! let car = session.add_car(Car::new("11", CarInfo { position: 1, ..Default::default() }));
//! for gauge in gauges.instruments() {
//!     car.add_gauge(gauge);
//! }
//! session.set_player("11");
//! car.find_gauge("Tachometer").unwrap().update_value(7500.0);
//!
//! let sim = Simulator::new("Sim", "1.0", session);
//! let rpm = sim.resolve("Car/ME/Gauge/Tachometer/ValueCurrent")?;
//! assert_eq!(rpm.state(), "SHIFT");
//! assert_eq!(rpm.state_percent(), 50.0);
//!
//! let unknown = sim.resolve("Car/UNKNOWNID/Lap/Current")?;
//! assert_eq!(unknown.state(), state::ERROR);
//! # Ok::<(), gaugepath::PathError>(())
//! ```

// Core types and error handling
mod error;
pub mod locale;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod value;

// Conversion and classification
pub mod gauge;
pub mod units;

// Addressing
pub mod config;
pub mod dispatch;
pub mod model;

// Core exports
pub use error::*;
pub use value::{Data, Entry, EntryRecord, Parsed, Values, state};

pub use config::CoreConfig;
pub use dispatch::{Component, Node, NodeKind, resolve};
pub use gauge::{Classifier, Gauge};
pub use model::{Car, CarInfo, Session, SessionInfo, Simulator, Track, TrackInfo};
