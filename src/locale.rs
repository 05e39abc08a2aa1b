//! Language tags and the presentation rules derived from them.
//!
//! A container's `lang` is a BCP-47-ish tag such as `en-US`, `de_DE` or `fr`.
//! Only two things are derived from it here: which measurement system `NATIVE`
//! means, and which characters separate decimals and thousands.

/// Measurement system a region uses for everyday quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementSystem {
    Imperial,
    Metric,
}

impl MeasurementSystem {
    /// The pseudo-unit symbol that selects this system (`IMPERIAL` / `METRIC`).
    pub fn symbol(self) -> &'static str {
        match self {
            MeasurementSystem::Imperial => "IMPERIAL",
            MeasurementSystem::Metric => "METRIC",
        }
    }
}

/// Regions that explicitly use imperial units.
const IMPERIAL_REGIONS: &[&str] = &["US", "LR", "MM"];

/// Languages that write decimals with a comma.
const DECIMAL_COMMA_LANGUAGES: &[&str] = &[
    "de", "fr", "es", "it", "pt", "nl", "ru", "pl", "cs", "sv", "da", "fi", "nb", "tr", "hu",
];

/// A parsed language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    language: String,
    region: Option<String>,
}

impl Default for Locale {
    fn default() -> Self {
        Self::parse(DEFAULT_LANG)
    }
}

/// Language assumed when a container does not name one.
pub const DEFAULT_LANG: &str = "en-US";

impl Locale {
    /// Parse a tag like `en-US`, `en_GB` or `fr`. Never fails; unknown shapes
    /// produce a language-only locale.
    pub fn parse(tag: &str) -> Self {
        let mut parts = tag.split(['-', '_']).filter(|p| !p.is_empty());
        let language = parts.next().unwrap_or("en").to_ascii_lowercase();
        let region = parts
            .find(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_alphabetic()))
            .map(str::to_ascii_uppercase);
        Self { language, region }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Imperial only for a region that explicitly uses it; metric otherwise.
    pub fn measurement_system(&self) -> MeasurementSystem {
        match self.region.as_deref() {
            Some(region) if IMPERIAL_REGIONS.contains(&region) => MeasurementSystem::Imperial,
            _ => MeasurementSystem::Metric,
        }
    }

    pub fn decimal_separator(&self) -> char {
        if DECIMAL_COMMA_LANGUAGES.contains(&self.language.as_str()) { ',' } else { '.' }
    }

    pub fn grouping_separator(&self) -> char {
        if self.decimal_separator() == ',' { '.' } else { ',' }
    }
}
