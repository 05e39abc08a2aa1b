//! Session collaborator: the track and the cars on it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{Car, Track};
use crate::dispatch::{Component, Node, NodeKind, OperationSet, REFERENCE_CAR};
use crate::Values;

/// Identifier of the player's own car.
pub const PLAYER_CAR: &str = "ME";

/// Identifier of the car in first position.
pub const LEADER_CAR: &str = "LEADER";

/// Session-wide state as fed by a reader.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionInfo {
    /// Practice, qualify, race, ...
    pub session_type: String,
    /// Green, checkered, ...
    pub status: String,
    /// Scheduled laps; 0 for timed sessions
    pub laps: i64,
    /// Time remaining in seconds
    pub time_remaining: f64,
}

/// One session. Cars are resolved by identifier:
///
/// | Identifier  | Car                                         |
/// |-------------|---------------------------------------------|
/// | `REFERENCE` | the reference car, `ME` unless reassigned   |
/// | `ME`        | the player's car                            |
/// | `LEADER`    | position 1                                  |
/// | `P<n>`      | position `n`                                |
/// | `I<n>`      | `n`th car in session order, 0-based         |
/// | `N<number>` | race number as displayed (`N007`)           |
/// | other       | literal car id                              |
#[derive(Debug)]
pub struct Session {
    info: RwLock<SessionInfo>,
    track: Arc<Track>,
    cars: RwLock<Vec<Arc<Car>>>,
    player: RwLock<Option<String>>,
    reference: RwLock<Option<String>>,
}

impl Session {
    pub fn new(info: SessionInfo, track: Arc<Track>) -> Self {
        Self {
            info: RwLock::new(info),
            track,
            cars: RwLock::new(Vec::new()),
            player: RwLock::new(None),
            reference: RwLock::new(None),
        }
    }

    pub fn info(&self) -> SessionInfo {
        self.info.read().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut SessionInfo)) {
        f(&mut *self.info.write());
    }

    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }

    /// Adds a car, replacing one with the same id.
    pub fn add_car(&self, car: Car) -> Arc<Car> {
        let car = Arc::new(car);
        let mut cars = self.cars.write();
        cars.retain(|c| c.id() != car.id());
        cars.push(Arc::clone(&car));
        debug!(car = %car.id(), cars = cars.len(), "Car joined session");
        car
    }

    pub fn cars(&self) -> Vec<Arc<Car>> {
        self.cars.read().clone()
    }

    /// Marks the car with `id` as the player's.
    pub fn set_player(&self, id: impl Into<String>) {
        *self.player.write() = Some(id.into());
    }

    /// Points `REFERENCE` at another identifier, e.g. `LEADER` or `P2`.
    pub fn set_reference(&self, id: impl Into<String>) {
        *self.reference.write() = Some(id.into());
    }

    /// Car for an identifier; see the type docs for the accepted forms.
    pub fn find_car(&self, id: &str) -> Option<Arc<Car>> {
        if id.eq_ignore_ascii_case(REFERENCE_CAR) {
            let reference = self.reference.read().clone().unwrap_or_else(|| PLAYER_CAR.to_string());
            if reference.eq_ignore_ascii_case(REFERENCE_CAR) {
                return None;
            }
            return self.find_car(&reference);
        }

        let cars = self.cars.read();
        let found = if id.eq_ignore_ascii_case(PLAYER_CAR) {
            let player = self.player.read().clone();
            player.and_then(|player| cars.iter().find(|c| c.id() == player))
        } else if id.eq_ignore_ascii_case(LEADER_CAR) {
            cars.iter().find(|c| c.position() == 1)
        } else if let Some(position) = numeric_suffix(id, 'P') {
            cars.iter().find(|c| c.position() == position)
        } else if let Some(index) = numeric_suffix(id, 'I') {
            usize::try_from(index).ok().and_then(|i| cars.get(i))
        } else if let Some(number) = car_number(id) {
            cars.iter().find(|c| c.number() == number)
        } else {
            None
        };
        found.or_else(|| cars.iter().find(|c| c.id() == id)).cloned()
    }
}

fn numeric_suffix(id: &str, prefix: char) -> Option<i64> {
    let rest = id.strip_prefix(prefix).or_else(|| id.strip_prefix(prefix.to_ascii_lowercase()))?;
    rest.parse().ok()
}

fn car_number(id: &str) -> Option<&str> {
    let rest = id.strip_prefix('N').or_else(|| id.strip_prefix('n'))?;
    (!rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())).then_some(rest)
}

impl Component for Session {
    const TYPE_NAME: &'static str = "Session";

    fn register(ops: &mut OperationSet<Self>) {
        ops.op0("Type", |s| Ok(Values::new("Type", s.info.read().session_type.as_str(), "")))
            .op0("Status", |s| Ok(Values::new("Status", s.info.read().status.as_str(), "")))
            .op0("Laps", |s| Ok(Values::new("Laps", s.info.read().laps, "lap")))
            .unit_op("Time", |s| Ok(Values::new("Time", s.info.read().time_remaining, "s")))
            .op0("CarCount", |s| Ok(Values::new("CarCount", s.cars.read().len() as i64, "")));
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Session
    }

    fn track(&self) -> Option<Arc<dyn Node>> {
        Some(Arc::clone(&self.track) as Arc<dyn Node>)
    }

    fn car(&self, id: &str) -> Option<Arc<dyn Node>> {
        self.find_car(id).map(|car| car as Arc<dyn Node>)
    }
}
