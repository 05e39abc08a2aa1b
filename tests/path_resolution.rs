//! End-to-end path resolution over a small race built through the public API.

use std::collections::HashSet;
use std::sync::Arc;

use gaugepath::gauge::GaugeDefinitions;
use gaugepath::{
    Car, CarInfo, PathError, Session, SessionInfo, Simulator, Track, TrackInfo, resolve, state,
};

const GAUGES: &str = r#"
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
"#;

fn car(definitions: &GaugeDefinitions, id: &str, position: i64, rpm: f64) -> Car {
    let car = Car::new(
        id,
        CarInfo {
            name: format!("Driver {id}"),
            number: id.to_string(),
            position,
            lap_current: 8,
            lap_completed: 7,
            speed: 160.0,
            gear: 5,
        },
    );
    for gauge in definitions.instruments() {
        car.add_gauge(gauge);
    }
    if let Some(tach) = car.find_gauge("Tachometer") {
        tach.update_value(rpm);
    }
    if let Some(fuel) = car.find_gauge("FuelLevel") {
        fuel.update_value(40.0);
    }
    car
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn simulator() -> Simulator {
    init_tracing();
    let definitions = GaugeDefinitions::from_yaml(GAUGES).unwrap();
    let track = Track::new(TrackInfo {
        name: "Spa".to_string(),
        length: 7004.0,
        ..Default::default()
    });
    let session = Session::new(
        SessionInfo { session_type: "Race".to_string(), laps: 12, ..Default::default() },
        Arc::new(track),
    );
    session.add_car(car(&definitions, "7", 2, 7500.0));
    session.add_car(car(&definitions, "3", 1, 8400.0));
    session.set_player("7");
    Simulator::new("Integration", "0.1", session)
}

#[test]
fn unknown_path_is_an_error_value() {
    let result = resolve(&simulator(), "Bogus/Path").unwrap();
    assert_eq!(result.state(), state::ERROR);
    assert!(result.string().contains("Bogus/Path"));
}

#[test]
fn unknown_car_message_names_the_path() {
    let sim = simulator();
    let result = resolve(&sim, "Car/UNKNOWNID/Lap/Current").unwrap();
    assert_eq!(result.state(), state::ERROR);
    assert!(result.string().contains("Car/UNKNOWNID/Lap/Current"));

    let scoped = resolve(sim.session().as_ref(), "Car/UNKNOWNID/Lap/Current").unwrap();
    assert_eq!(scoped.state(), state::ERROR);
}

#[test]
fn tachometer_in_shift_range() {
    let result = resolve(&simulator(), "Car/ME/Gauge/Tachometer/ValueCurrent/rev/min").unwrap();
    assert_eq!(result.state(), "SHIFT");
    assert_eq!(result.state_percent(), 50.0);
    assert_eq!(result.unit(), "rev/min");

    let leader = resolve(&simulator(), "car/leader/gauge/tachometer/valuecurrent").unwrap();
    assert_eq!(leader.state(), "OVERLIMIT");
}

#[test]
fn session_prefix_is_transparent_for_cars_and_track() {
    let sim = simulator();
    for path in ["Car/ME/Speed/mph", "Car/P1/Lap/Completed", "Track/Length/km"] {
        let direct = resolve(&sim, path).unwrap();
        let via_session = resolve(&sim, &format!("Session/{path}")).unwrap();
        assert_eq!(direct, via_session, "{path}");
        assert_eq!(direct.unit(), via_session.unit(), "{path}");
    }
    assert_eq!(resolve(&sim, "Session/Laps").unwrap().long(), 12);
}

#[test]
fn compound_units_split_across_segments() {
    let sim = simulator();
    let kmh = resolve(&sim, "Car/ME/Speed/km/h").unwrap();
    assert_eq!(kmh.unit(), "km/h");
    assert!((kmh.double() - 160.0).abs() < 1e-9);
    assert_eq!(kmh.default_name(), "Car/ME/Speed/km/h");

    let minutes = resolve(&sim, "Session/Time/min").unwrap();
    assert_eq!(minutes.unit(), "min");
}

#[test]
fn native_speed_follows_the_simulator_language() {
    for (lang, unit) in [("de-DE", "kph"), ("en-GB", "kph"), ("en-US", "mph")] {
        let sim = simulator().with_lang(lang);
        let speed = sim.resolve("Car/ME/Speed/NATIVE").unwrap();
        assert_eq!(speed.unit(), unit, "{lang}");
        assert_eq!(resolve(&sim, "Car/ME/Speed/NATIVE").unwrap().unit(), unit, "{lang}");
    }
}

#[test]
fn reference_car_is_the_default() {
    let sim = simulator();
    assert_eq!(resolve(&sim, "Car").unwrap().string_of("Id"), "7");
    assert_eq!(resolve(&sim, "Car/REFERENCE/Id").unwrap().string(), "7");
    sim.session().set_reference("LEADER");
    assert_eq!(resolve(&sim, "Car/REFERENCE/Id").unwrap().string(), "3");
}

#[test]
fn mutations_are_tagged() {
    let sim = simulator();
    let set = resolve(&sim, "Car/ME/Gauge/FuelLevel/SetValueNext/25.2").unwrap();
    assert!(set.is_set());
    assert_eq!(set.double(), 25.0);

    let read = resolve(&sim, "Car/ME/Gauge/FuelLevel/ValueNext").unwrap();
    assert!(!read.is_set());
    assert_eq!(read.double(), 25.0);

    assert!(resolve(&sim, "Car/ME/Gauge/FuelLevel/IncrementValueNext").unwrap().is_set());
}

#[test]
fn argument_failures_propagate() {
    let sim = simulator();
    let err = resolve(&sim, "Car/ME/Gauge/FuelLevel/SetValueNext/plenty").unwrap_err();
    assert!(matches!(err.root_cause(), PathError::Argument { .. }));
    assert!(err.to_string().contains("Car/ME/Gauge/FuelLevel/SetValueNext/plenty"));

    let err = resolve(&sim, "Car/ME/Lap/Fastest").unwrap_err();
    assert!(matches!(err, PathError::Dispatch { type_name: "Car", .. }));
}

#[test]
fn result_is_named_after_the_requested_path() {
    let sim = simulator();
    for path in ["/Car/ME/Speed/mph", "Track/Name", "Bogus", "Car/ME/Gauge"] {
        assert_eq!(resolve(&sim, path).unwrap().default_name(), path);
    }
}

#[test]
fn repeated_resolution_is_stable() {
    let sim = simulator();
    for path in ["Car/LEADER/Gauge/Tachometer/ValueCurrent", "Session/Time/min", "Car/I1/Name"] {
        let first = resolve(&sim, path).unwrap();
        let second = resolve(&sim, path).unwrap();
        assert_eq!(first, second, "{path}");
        assert_eq!(first.unit(), second.unit());
        assert_eq!(first.state(), second.state());
    }
}

#[test]
fn root_aggregate_lists_zero_argument_reads() {
    let all = resolve(&simulator(), "").unwrap();
    let names: Vec<&str> = all.names().collect();
    let unique: HashSet<&str> = names.iter().copied().collect();
    assert_eq!(names.len(), unique.len());
    assert_eq!(names, ["Name", "Version", "IsConnected"]);
}

#[test]
fn car_aggregate_excludes_argument_operations() {
    let all = resolve(&simulator(), "Car/ME").unwrap();
    assert!(all.entry("Lap").is_none(), "Lap needs an argument");
    assert_eq!(all.string_of("Name"), "Driver 7");
    assert_eq!(all.long_of("Gear"), 5);
}

#[test]
fn all_gauges_keyed_by_type() {
    let gauges = resolve(&simulator(), "Car/ME/Gauge").unwrap();
    assert_eq!(gauges.len(), 2);
    assert_eq!(gauges.state_of("Tachometer"), "SHIFT");
    assert_eq!(gauges.double_of("FuelLevel"), 40.0);
}

#[test]
fn json_record_shape() {
    let sim = simulator();
    let json = resolve(&sim, "Car/ME/Gauge/Tachometer/ValueCurrent").unwrap().to_json();
    let record = &json["Car/ME/Gauge/Tachometer/ValueCurrent"];
    assert_eq!(json["$defaultName"], "Car/ME/Gauge/Tachometer/ValueCurrent");
    assert_eq!(record["State"], "SHIFT");
    assert_eq!(record["UOM"], "rev/min");
    assert_eq!(record["StatePercent"], 50.0);
    for key in ["Name", "Type", "Value", "Format", "UOMAbbr", "UOMDesc", "Lang", "ValueFormatted"] {
        assert!(record.get(key).is_some(), "missing {key}");
    }
}
