//! Track collaborator.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::dispatch::{Component, NodeKind, OperationSet};
use crate::Values;

/// Track details as fed by a telemetry reader.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct TrackInfo {
    /// Display name
    pub name: String,
    /// Layout or configuration description
    pub description: String,
    /// Lap length in meters
    pub length: f64,
    /// Road, oval, dirt, ...
    pub category: String,
}

/// The session's track.
#[derive(Debug, Default)]
pub struct Track {
    info: RwLock<TrackInfo>,
}

impl Track {
    pub fn new(info: TrackInfo) -> Self {
        Self { info: RwLock::new(info) }
    }

    pub fn info(&self) -> TrackInfo {
        self.info.read().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut TrackInfo)) {
        f(&mut *self.info.write());
    }
}

impl Component for Track {
    const TYPE_NAME: &'static str = "Track";

    fn register(ops: &mut OperationSet<Self>) {
        ops.op0("Name", |t| Ok(Values::new("Name", t.info.read().name.as_str(), "")))
            .op0("Description", |t| {
                Ok(Values::new("Description", t.info.read().description.as_str(), ""))
            })
            .unit_op("Length", |t| Ok(Values::new("Length", t.info.read().length, "m")))
            .op0("Category", |t| Ok(Values::new("Category", t.info.read().category.as_str(), "")));
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Track
    }
}
