//! Sample object graph shared by unit tests and benchmarks
//!
//! Builds a small race: a two-car session on Monza, each car carrying the
//! instruments defined in [`SAMPLE_GAUGES`].

#![cfg(any(test, feature = "benchmark"))]

use std::sync::Arc;

use crate::gauge::GaugeDefinitions;
use crate::model::{Car, CarInfo, Session, SessionInfo, Simulator, Track, TrackInfo};

/// Gauge definitions used by the sample cars.
pub const SAMPLE_GAUGES: &str = r#"
Tachometer:
  uom: rev/min
  minimum: 0
  maximum: 9000
  increment: 100
  states:
    "":
      NORMAL: { start: 0, end: 9000 }
      SHIFT: { start: 7000, end: 8000 }
      OVERLIMIT: { start: 8000 }
FuelLevel:
  uom: l
  minimum: 0
  maximum: 100
  increment: 0.5
  changeable: true
  format: "%.1f"
  states:
    "":
      CRITICAL: { start: 0, end: 5 }
      WARNING: { start: 5, end: 10 }
WaterTemp:
  uom: C
  states:
    "":
      NORMAL: { start: 0, end: 105 }
      WARNING: { start: 105, end: 115 }
      CRITICAL: { start: 115 }
"#;

/// Id of the player's car in the sample session.
pub const SAMPLE_PLAYER: &str = "11";

/// Id of the leading car in the sample session.
pub const SAMPLE_LEADER: &str = "22";

/// Parsed [`SAMPLE_GAUGES`].
pub fn sample_definitions() -> GaugeDefinitions {
    GaugeDefinitions::from_yaml(SAMPLE_GAUGES).expect("sample gauge definitions are valid YAML")
}

/// A car with every sample instrument fed with `rpm`, `fuel` litres and
/// `water` degrees Celsius.
pub fn sample_car(id: &str, info: CarInfo, rpm: f64, fuel: f64, water: f64) -> Car {
    let car = Car::new(id, info);
    for gauge in sample_definitions().instruments() {
        car.add_gauge(gauge);
    }
    let feed = [("Tachometer", rpm), ("FuelLevel", fuel), ("WaterTemp", water)];
    for (gauge_type, value) in feed {
        if let Some(gauge) = car.find_gauge(gauge_type) {
            gauge.update_value(value);
        }
    }
    car
}

/// The sample race: the player (`11`, P2, tachometer in `SHIFT`) chasing the
/// leader (`22`, P1, tachometer `OVERLIMIT`).
pub fn sample_simulator() -> Simulator {
    let track = Track::new(TrackInfo {
        name: "Monza".to_string(),
        description: "Grand Prix".to_string(),
        length: 5793.0,
        category: "road".to_string(),
    });
    let session = Session::new(
        SessionInfo {
            session_type: "Race".to_string(),
            status: "Green".to_string(),
            laps: 20,
            time_remaining: 1800.0,
        },
        Arc::new(track),
    );

    session.add_car(sample_car(
        SAMPLE_PLAYER,
        CarInfo {
            name: "Player One".to_string(),
            number: "11".to_string(),
            position: 2,
            lap_current: 5,
            lap_completed: 4,
            speed: 100.0,
            gear: 4,
        },
        7500.0,
        42.5,
        90.0,
    ));
    session.add_car(sample_car(
        SAMPLE_LEADER,
        CarInfo {
            name: "Fast Leader".to_string(),
            number: "22".to_string(),
            position: 1,
            lap_current: 6,
            lap_completed: 5,
            speed: 180.0,
            gear: 5,
        },
        8200.0,
        30.0,
        108.0,
    ));
    session.set_player(SAMPLE_PLAYER);

    let simulator = Simulator::new("SampleSim", "1.0", session);
    simulator.set_connected(true);
    simulator
}
