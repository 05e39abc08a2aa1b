//! Car collaborator and its instruments.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

use crate::dispatch::{Component, Node, NodeKind, OperationSet};
use crate::gauge::Gauge;
use crate::{PathError, Result, Values};

/// Per-car telemetry as fed by a reader.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct CarInfo {
    /// Driver or team name
    pub name: String,
    /// Race number as displayed, may have leading zeros
    pub number: String,
    /// Overall position, 1-based; 0 when not classified
    pub position: i64,
    pub lap_current: i64,
    pub lap_completed: i64,
    /// Speed in kph
    pub speed: f64,
    /// -1 reverse, 0 neutral
    pub gear: i64,
}

/// One car in the session. Owns its instruments, keyed by gauge type.
#[derive(Debug)]
pub struct Car {
    id: String,
    info: RwLock<CarInfo>,
    gauges: RwLock<IndexMap<String, Arc<Gauge>>>,
}

impl Car {
    pub fn new(id: impl Into<String>, info: CarInfo) -> Self {
        Self { id: id.into(), info: RwLock::new(info), gauges: RwLock::new(IndexMap::new()) }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn info(&self) -> CarInfo {
        self.info.read().clone()
    }

    pub fn position(&self) -> i64 {
        self.info.read().position
    }

    pub fn number(&self) -> String {
        self.info.read().number.clone()
    }

    /// Applies a reader update. A gear change switches every instrument to
    /// that gear's range table.
    pub fn update(&self, f: impl FnOnce(&mut CarInfo)) {
        let (before, after) = {
            let mut info = self.info.write();
            let before = info.gear;
            f(&mut *info);
            (before, info.gear)
        };
        if before != after {
            trace!(car = %self.id, gear = after, "Gear change");
            self.set_gauge_context(after.to_string());
        }
    }

    /// Selects the range table context on every instrument.
    pub fn set_gauge_context(&self, context: impl Into<String>) {
        let context = context.into();
        for gauge in self.gauges.read().values() {
            gauge.set_context(context.clone());
        }
    }

    /// Adds (or replaces) an instrument, returning the shared handle readers feed.
    pub fn add_gauge(&self, gauge: Gauge) -> Arc<Gauge> {
        let gauge = Arc::new(gauge);
        self.gauges.write().insert(gauge.gauge_type().to_string(), Arc::clone(&gauge));
        gauge
    }

    /// Instrument by type, case-insensitive.
    pub fn find_gauge(&self, gauge_type: &str) -> Option<Arc<Gauge>> {
        let gauges = self.gauges.read();
        gauges
            .get(gauge_type)
            .or_else(|| {
                gauges.iter().find(|(t, _)| t.eq_ignore_ascii_case(gauge_type)).map(|(_, g)| g)
            })
            .cloned()
    }

    pub fn gauge_types(&self) -> Vec<String> {
        self.gauges.read().keys().cloned().collect()
    }

    fn lap(&self, which: &str) -> Result<Values> {
        let info = self.info.read();
        let lap = if which.eq_ignore_ascii_case("current") {
            info.lap_current
        } else if which.eq_ignore_ascii_case("completed") {
            info.lap_completed
        } else {
            return Err(PathError::argument(which, "Current or Completed"));
        };
        Ok(Values::new("Lap", lap, "lap"))
    }
}

impl Component for Car {
    const TYPE_NAME: &'static str = "Car";

    fn register(ops: &mut OperationSet<Self>) {
        ops.op0("Id", |c| Ok(Values::new("Id", c.id.as_str(), "")))
            .op0("Name", |c| Ok(Values::new("Name", c.info.read().name.as_str(), "")))
            .op0("Number", |c| Ok(Values::new("Number", c.info.read().number.as_str(), "")))
            .op0("Position", |c| Ok(Values::new("Position", c.info.read().position, "")))
            .op1("Lap", Car::lap)
            .unit_op("Speed", |c| Ok(Values::new("Speed", c.info.read().speed, "kph")))
            .op0("Gear", |c| Ok(Values::new("Gear", c.info.read().gear, "")));
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Car
    }

    fn gauge(&self, gauge_type: &str) -> Option<Arc<dyn Node>> {
        self.find_gauge(gauge_type).map(|g| g as Arc<dyn Node>)
    }

    fn gauges(&self) -> Vec<(String, Arc<dyn Node>)> {
        self.gauges
            .read()
            .iter()
            .map(|(t, g)| (t.clone(), Arc::clone(g) as Arc<dyn Node>))
            .collect()
    }
}
