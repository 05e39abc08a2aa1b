//! Startup configuration: which unit and gauge documents to load.
//!
//! ```yaml
//! units: units.yaml          # merged over the built-in table
//! gauges:                    # later documents override earlier ones key by key
//!   - gauges/generic.yaml
//!   - gauges/sim.yaml
//!   - gauges/cars/gt3.yaml
//! lang: de-DE
//! ```
//!
//! Relative paths are resolved against the configuration file's directory.
//! `lang` reaches values through [`CoreConfig::simulator`], and with it the
//! measurement system `NATIVE` conversions pick.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::gauge::GaugeDefinitions;
use crate::locale::DEFAULT_LANG;
use crate::model::{Session, Simulator};
use crate::units::{self, UnitTable};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoreConfig {
    /// Unit document merged over the built-in definitions.
    pub units: Option<PathBuf>,
    /// Gauge documents, in override order.
    pub gauges: Vec<PathBuf>,
    /// Language tag applied to produced values.
    pub lang: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self { units: None, gauges: Vec::new(), lang: DEFAULT_LANG.to_string() }
    }
}

impl CoreConfig {
    pub fn from_yaml(document: &str) -> Result<Self> {
        serde_yaml_ng::from_str(document).context("Failed to parse core configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("Reading configuration from {}", path.display()))?;
        let mut config = Self::from_yaml(&document)
            .with_context(|| format!("Parsing configuration {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        info!(path = %path.display(), gauges = config.gauges.len(), "Loaded core configuration");
        Ok(config)
    }

    fn resolve_relative(&mut self, base: &Path) {
        if let Some(units) = self.units.as_mut().filter(|p| p.is_relative()) {
            *units = base.join(&*units);
        }
        for gauge in self.gauges.iter_mut().filter(|p| p.is_relative()) {
            *gauge = base.join(&*gauge);
        }
    }

    /// Built-in unit definitions with the configured document merged over them.
    pub fn unit_table(&self) -> Result<UnitTable> {
        let mut table = UnitTable::builtin();
        if let Some(path) = &self.units {
            let overrides = UnitTable::load(path)
                .with_context(|| format!("Loading unit definitions from {}", path.display()))?;
            table.merge(&overrides);
        }
        Ok(table)
    }

    /// All gauge documents merged in order.
    pub fn gauge_definitions(&self) -> Result<GaugeDefinitions> {
        let mut definitions = GaugeDefinitions::default();
        for path in &self.gauges {
            let document = GaugeDefinitions::load(path)
                .with_context(|| format!("Loading gauge definitions from {}", path.display()))?;
            definitions.merge(&document);
        }
        Ok(definitions)
    }

    /// Installs the unit table process-wide and returns the merged gauge
    /// definitions. Must run before the first conversion.
    pub fn bootstrap(&self) -> Result<GaugeDefinitions> {
        let table = self.unit_table()?;
        units::install(table).context("Installing the global unit table")?;
        self.gauge_definitions()
    }

    /// A simulator root resolving in the configured language.
    pub fn simulator(
        &self,
        name: impl Into<String>,
        version: impl Into<String>,
        session: Session,
    ) -> Simulator {
        Simulator::new(name, version, session).with_lang(self.lang.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gaugepath-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults() {
        let config = CoreConfig::from_yaml("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.lang, "en-US");
    }

    #[test]
    fn relative_paths_follow_the_config_file() -> Result<()> {
        let dir = scratch_dir("relative");
        fs::write(dir.join("base.yaml"), "Tachometer:\n  uom: rev/min\n  maximum: 9000\n")?;
        fs::write(dir.join("car.yaml"), "Tachometer:\n  maximum: 8200\n")?;
        fs::write(dir.join("units.yaml"), "furlong:\n  conversions:\n    m: 201.168\n")?;
        fs::write(
            dir.join("core.yaml"),
            "units: units.yaml\ngauges: [base.yaml, car.yaml]\nlang: de-DE\n",
        )?;

        let config = CoreConfig::load(dir.join("core.yaml"))?;
        assert_eq!(config.lang, "de-DE");
        assert_eq!(config.gauges[0], dir.join("base.yaml"));

        let tach = config.gauge_definitions()?.classifier("Tachometer").unwrap();
        assert_eq!(tach.maximum(), 8200.0);
        assert_eq!(tach.unit(), "rev/min");

        let table = config.unit_table()?;
        assert_eq!(table.factor("furlong", "m"), Some(201.168));
        assert!(table.get("kph").is_some(), "built-in units survive the merge");

        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn simulator_resolves_in_the_configured_language() {
        use crate::model::{Car, CarInfo, SessionInfo, Track};
        use std::sync::Arc;

        let config = CoreConfig::from_yaml("lang: de-DE\n").unwrap();
        let session = Session::new(SessionInfo::default(), Arc::new(Track::default()));
        session.add_car(Car::new("9", CarInfo { speed: 80.0, ..Default::default() }));
        session.set_player("9");

        let sim = config.simulator("Sim", "1.0", session);
        assert_eq!(sim.lang(), "de-DE");
        let speed = sim.resolve("Car/ME/Speed/NATIVE").unwrap();
        assert_eq!(speed.unit(), "kph");
        assert_eq!(speed.double(), 80.0);
        assert_eq!(speed.lang(), "de-DE");
    }

    #[test]
    fn missing_document_names_the_file() {
        let config = CoreConfig {
            gauges: vec![PathBuf::from("/nonexistent/gauges.yaml")],
            ..Default::default()
        };
        let err = config.gauge_definitions().unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/gauges.yaml"));
    }
}
