//! The root of the object graph.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use super::Session;
use crate::dispatch::{self, Component, Node, NodeKind, OperationSet};
use crate::locale::DEFAULT_LANG;
use crate::{Result, Values};

/// A connected simulator: its current session plus any loaded extensions
/// addressable under `Plugin/<dotted/name>/...`.
pub struct Simulator {
    name: String,
    version: String,
    lang: String,
    connected: AtomicBool,
    session: RwLock<Arc<Session>>,
    extensions: RwLock<Vec<(String, Arc<dyn Node>)>>,
}

impl Simulator {
    pub fn new(name: impl Into<String>, version: impl Into<String>, session: Session) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            lang: DEFAULT_LANG.to_string(),
            connected: AtomicBool::new(false),
            session: RwLock::new(Arc::new(session)),
            extensions: RwLock::new(Vec::new()),
        }
    }

    /// Language tag stamped on values returned by [`Simulator::resolve`].
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Resolves `path` from this root in the configured language.
    pub fn resolve(&self, path: &str) -> Result<Values> {
        dispatch::resolve(self, path)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    pub fn session(&self) -> Arc<Session> {
        Arc::clone(&self.session.read())
    }

    /// Replaces the session, e.g. when practice turns into qualifying.
    pub fn replace_session(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        *self.session.write() = Arc::clone(&session);
        session
    }

    /// Makes `extension` addressable as `Plugin/<name with dots as slashes>`.
    /// Registering a name again replaces the earlier extension.
    pub fn register_extension(&self, name: impl Into<String>, extension: Arc<dyn Node>) {
        let name = name.into();
        info!(extension = %name, type_name = extension.type_name(), "Registered extension");
        let mut extensions = self.extensions.write();
        extensions.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        extensions.push((name, extension));
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("lang", &self.lang)
            .field("connected", &self.is_connected())
            .field(
                "extensions",
                &self.extensions.read().iter().map(|(n, _)| n.clone()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Component for Simulator {
    const TYPE_NAME: &'static str = "Simulator";

    fn register(ops: &mut OperationSet<Self>) {
        ops.op0("Name", |s| Ok(Values::new("Name", s.name.as_str(), "")))
            .op0("Version", |s| Ok(Values::new("Version", s.version.as_str(), "")))
            .op0("IsConnected", |s| Ok(Values::new("IsConnected", s.is_connected(), "")));
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Root
    }

    fn lang(&self) -> Option<&str> {
        Some(&self.lang)
    }

    fn session(&self) -> Option<Arc<dyn Node>> {
        Some(Simulator::session(self) as Arc<dyn Node>)
    }

    fn track(&self) -> Option<Arc<dyn Node>> {
        Some(Arc::clone(Simulator::session(self).track()) as Arc<dyn Node>)
    }

    fn car(&self, id: &str) -> Option<Arc<dyn Node>> {
        Simulator::session(self).find_car(id).map(|car| car as Arc<dyn Node>)
    }

    fn extensions(&self) -> Vec<(String, Arc<dyn Node>)> {
        self.extensions.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::resolve;
    use crate::model::{Car, CarInfo, SessionInfo, Track};

    struct Weather;

    impl Component for Weather {
        const TYPE_NAME: &'static str = "Weather";

        fn register(ops: &mut OperationSet<Self>) {
            ops.op0("AirTemp", |_| Ok(Values::new("AirTemp", 21.5, "C")))
                .op1("AirTemp", |_, unit| Ok(Values::new("AirTemp", 21.5, "C").convert(unit)));
        }
    }

    fn simulator() -> Simulator {
        let track = Arc::new(Track::default());
        Simulator::new("TestSim", "1.2.3", Session::new(SessionInfo::default(), track))
    }

    #[test]
    fn root_operations() {
        let sim = simulator();
        assert!(!resolve(&sim, "IsConnected").unwrap().boolean());
        sim.set_connected(true);
        assert!(resolve(&sim, "IsConnected").unwrap().boolean());
        assert_eq!(resolve(&sim, "Version").unwrap().string(), "1.2.3");
    }

    #[test]
    fn extension_registration_replaces_by_name() {
        let sim = simulator();
        sim.register_extension("Acme.Weather", Arc::new(Weather));
        sim.register_extension("acme.weather", Arc::new(Weather));
        assert_eq!(Component::extensions(&sim).len(), 1);

        let fahrenheit = resolve(&sim, "Plugin/Acme/Weather/AirTemp/F").unwrap();
        assert!((fahrenheit.double() - 70.7).abs() < 1e-9);
    }

    #[test]
    fn language_is_applied_to_results() {
        let sim = simulator().with_lang("en-US");
        let time = sim.resolve("Session/Time/min").unwrap();
        assert_eq!(time.lang(), "en-US");
        let sim = simulator().with_lang("de-DE");
        assert_eq!(sim.resolve("Version").unwrap().lang(), "de-DE");
        assert_eq!(sim.resolve("Version").unwrap().default_name(), "Version");
    }

    #[test]
    fn native_units_follow_the_root_language() {
        for (lang, unit) in [("de-DE", "kph"), ("en-GB", "kph"), ("en-US", "mph")] {
            let session = Session::new(SessionInfo::default(), Arc::new(Track::default()));
            session.add_car(Car::new("5", CarInfo { speed: 120.0, ..Default::default() }));
            session.set_player("5");
            let sim = Simulator::new("TestSim", "1.2.3", session).with_lang(lang);

            let speed = sim.resolve("Car/ME/Speed/NATIVE").unwrap();
            assert_eq!(speed.unit(), unit, "{lang}");
            assert_eq!(speed.lang(), lang);
            let direct = resolve(&sim, "Session/Car/ME/Speed/NATIVE").unwrap();
            assert_eq!(direct.unit(), unit, "{lang}");
        }
    }

    #[test]
    fn replacing_the_session_redirects_paths() {
        let sim = simulator();
        let info = SessionInfo { session_type: "Qualify".to_string(), ..Default::default() };
        sim.replace_session(Session::new(info, Arc::new(Track::default())));
        assert_eq!(resolve(&sim, "Session/Type").unwrap().string(), "Qualify");
    }
}
