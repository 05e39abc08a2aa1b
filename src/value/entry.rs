//! A single named value with its unit, state and presentation metadata.

use std::time::{Duration, SystemTime};

use super::{Data, state};
use crate::locale::DEFAULT_LANG;

/// One named value inside a [`Values`](super::Values) container.
#[derive(Debug, Clone)]
pub struct Entry {
    name: String,
    value: Data,
    unit: String,
    requested_unit: String,
    state: String,
    state_percent: f64,
    format: String,
    lang: String,
    interval: Duration,
    timestamp: SystemTime,
    dirty: bool,
}

impl Entry {
    pub fn new(name: impl Into<String>, value: impl Into<Data>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            unit: unit.into(),
            requested_unit: String::new(),
            state: state::NORMAL.to_string(),
            state_percent: 0.0,
            format: String::new(),
            lang: DEFAULT_LANG.to_string(),
            interval: Duration::ZERO,
            timestamp: SystemTime::now(),
            dirty: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Data {
        &self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn requested_unit(&self) -> &str {
        &self.requested_unit
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn state_percent(&self) -> f64 {
        self.state_percent
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Assigns a new value and refreshes the timestamp. The entry becomes
    /// dirty only if the value actually changed; returns whether it did.
    pub fn set_value(&mut self, value: impl Into<Data>) -> bool {
        let value = value.into();
        let changed = value != self.value || value.type_name() != self.value.type_name();
        if changed {
            self.dirty = true;
        }
        self.value = value;
        self.timestamp = SystemTime::now();
        changed
    }

    /// Swaps the value without touching `dirty` or the timestamp (conversions).
    pub(crate) fn replace_value(&mut self, value: Data) {
        self.value = value;
    }

    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = unit.into();
    }

    pub fn set_requested_unit(&mut self, unit: impl Into<String>) {
        self.requested_unit = unit.into();
    }

    pub fn set_state(&mut self, state: impl Into<String>) {
        self.state = state.into();
    }

    pub fn set_state_percent(&mut self, percent: f64) {
        self.state_percent = percent;
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
    }

    pub fn set_lang(&mut self, lang: impl Into<String>) {
        self.lang = lang.into();
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn set_timestamp(&mut self, timestamp: SystemTime) {
        self.timestamp = timestamp;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Stale once `now >= timestamp + interval`.
    pub fn is_stale_at(&self, now: SystemTime) -> bool {
        match self.timestamp.checked_add(self.interval) {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(SystemTime::now())
    }
}
