//! The addressable instrument.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

use super::classifier::{Classifier, DEFAULT_CONTEXT};
use super::definitions::GaugeDefinition;
use crate::dispatch::{Component, NodeKind, OperationSet};
use crate::units::{ConversionTable, convert_scalar};
use crate::value::{Data, state};
use crate::{PathError, Result, Values};

/// One instrument of a car: a raw reading classified against its range
/// tables, plus an optional pending "next" value for changeable instruments.
///
/// Readers feed [`Gauge::update`]; dispatch reads through the registered
/// operations. The classifier is an immutable snapshot replaced as a whole by
/// [`Gauge::reload`].
#[derive(Debug)]
pub struct Gauge {
    gauge_type: String,
    name: String,
    format: String,
    changeable: bool,
    classifier: RwLock<Arc<Classifier>>,
    context: RwLock<String>,
    current: RwLock<Option<Values>>,
    next: RwLock<Option<Values>>,
}

impl Gauge {
    pub fn new(gauge_type: impl Into<String>, classifier: Classifier) -> Self {
        let gauge_type = gauge_type.into();
        Self {
            name: gauge_type.clone(),
            gauge_type,
            format: String::new(),
            changeable: false,
            classifier: RwLock::new(Arc::new(classifier)),
            context: RwLock::new(DEFAULT_CONTEXT.to_string()),
            current: RwLock::new(None),
            next: RwLock::new(None),
        }
    }

    pub fn from_definition(gauge_type: impl Into<String>, definition: &GaugeDefinition) -> Self {
        let gauge_type = gauge_type.into();
        let classifier = definition.classifier(&gauge_type);
        let mut gauge = Self::new(gauge_type, classifier);
        if let Some(name) = &definition.name {
            gauge.name.clone_from(name);
        }
        gauge.format = definition.format.clone().unwrap_or_default();
        gauge.changeable = definition.changeable.unwrap_or(false);
        gauge
    }

    /// An instrument with no ranges, reporting `NOTAVAILABLE` until fed.
    pub fn generic(gauge_type: impl Into<String>) -> Self {
        let gauge_type = gauge_type.into();
        let classifier = Classifier::new(gauge_type.clone(), "");
        Self::new(gauge_type, classifier)
    }

    pub fn with_changeable(mut self, changeable: bool) -> Self {
        self.changeable = changeable;
        self
    }

    pub fn gauge_type(&self) -> &str {
        &self.gauge_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_changeable(&self) -> bool {
        self.changeable
    }

    /// Current classifier snapshot.
    pub fn classifier(&self) -> Arc<Classifier> {
        Arc::clone(&self.classifier.read())
    }

    /// Publishes a new classifier; in-flight reads finish on the old one.
    pub fn reload(&self, classifier: Classifier) {
        debug!(gauge = %self.gauge_type, "Reloading gauge ranges");
        *self.classifier.write() = Arc::new(classifier);
    }

    /// Selects the gear/power range table, e.g. `"4"` or `"4-100"`.
    pub fn set_context(&self, context: impl Into<String>) {
        *self.context.write() = context.into();
    }

    pub fn context(&self) -> String {
        self.context.read().clone()
    }

    /// Stores the latest raw reading.
    pub fn update(&self, raw: Values) {
        trace!(gauge = %self.gauge_type, value = %raw.value(), "Gauge update");
        *self.current.write() = Some(raw);
    }

    /// Stores a raw reading expressed in the gauge's own unit.
    pub fn update_value(&self, value: impl Into<Data>) {
        let unit = self.classifier().unit().to_string();
        self.update(Values::new("ValueCurrent", value, unit));
    }

    fn classified(&self, raw: &Values, name: &str, unit: &str) -> Values {
        let classifier = self.classifier();
        let mut result = classifier.apply(raw, &self.context());
        result.set_name(name);
        if !self.format.is_empty() {
            result.set_format(self.format.clone());
        }
        if unit.is_empty() { result } else { result.convert(unit) }
    }

    fn not_available(&self, name: &str) -> Values {
        Values::with_state(name, f64::NAN, self.classifier().unit(), state::NOTAVAILABLE)
    }

    /// The classified current reading, optionally converted to `unit`.
    pub fn value_current(&self, unit: &str) -> Values {
        match self.current.read().as_ref() {
            Some(raw) => self.classified(raw, "ValueCurrent", unit),
            None => self.not_available("ValueCurrent"),
        }
    }

    /// The pending value, or the current reading when nothing is pending.
    pub fn value_next(&self, unit: &str) -> Values {
        if let Some(next) = self.next.read().as_ref() {
            return self.classified(next, "ValueNext", unit);
        }
        let mut current = self.value_current(unit);
        current.set_name("ValueNext");
        current
    }

    fn require_changeable(&self) -> Result<()> {
        if self.changeable {
            Ok(())
        } else {
            Err(PathError::operation_failed(format!("{} is not changeable", self.gauge_type)))
        }
    }

    fn store_next(&self, value: f64) -> Values {
        let classifier = self.classifier();
        let rounded = classifier.round_to_increment(value);
        *self.next.write() = Some(Values::new("ValueNext", rounded, classifier.unit()));
        self.value_next("")
    }

    /// Parses `value` (in `unit`, or the gauge's unit when empty), rounds it
    /// to the configured increment and stores it as the next value.
    pub fn set_value_next(&self, value: &str, unit: &str) -> Result<Values> {
        self.require_changeable()?;
        let parsed: f64 = value.trim().parse().map_err(|_| PathError::argument(value, "number"))?;
        let classifier = self.classifier();
        let internal = convert_scalar(parsed, unit, classifier.unit(), &ConversionTable::default())
            .ok_or_else(|| PathError::argument(unit, "unit convertible to the gauge unit"))?;
        Ok(self.store_next(internal))
    }

    /// Moves the next value one increment, staying within capacity. Without
    /// any reading the step starts from the minimum.
    fn step_next(&self, direction: f64) -> Result<Values> {
        self.require_changeable()?;
        let classifier = self.classifier();
        let (minimum, maximum) = (classifier.minimum(), classifier.maximum());
        let base = self
            .value_next("")
            .try_double()
            .filter(|v| v.is_finite())
            .unwrap_or(if minimum.is_finite() { minimum } else { 0.0 });
        let stepped = (base + direction * classifier.increment()).max(minimum).min(maximum);
        Ok(self.store_next(stepped))
    }

    pub fn increment_value_next(&self) -> Result<Values> {
        self.step_next(1.0)
    }

    pub fn decrement_value_next(&self) -> Result<Values> {
        self.step_next(-1.0)
    }

    fn capacity(&self, name: &str, read: fn(&Classifier) -> f64) -> Values {
        let classifier = self.classifier();
        Values::new(name, read(&classifier), classifier.unit())
    }

    pub fn state(&self) -> String {
        self.value_current("").state().to_string()
    }
}

fn join_unit(a: &str, b: &str) -> String {
    format!("{a}/{b}")
}

impl Component for Gauge {
    const TYPE_NAME: &'static str = "Gauge";

    fn register(ops: &mut OperationSet<Self>) {
        ops.op0("Type", |g| Ok(Values::new("Type", g.gauge_type.as_str(), "")))
            .op0("Name", |g| Ok(Values::new("Name", g.name.as_str(), "")))
            .op0("UOM", |g| Ok(Values::new("UOM", g.classifier().unit(), "")))
            .unit_op("ValueCurrent", |g| Ok(g.value_current("")))
            .unit_op("ValueNext", |g| Ok(g.value_next("")))
            .op1("SetValueNext", |g, value| g.set_value_next(value, ""))
            .op2("SetValueNext", |g, value, unit| g.set_value_next(value, unit))
            .op3("SetValueNext", |g, value, a, b| g.set_value_next(value, &join_unit(a, b)))
            .op0("IncrementValueNext", Gauge::increment_value_next)
            .op0("DecrementValueNext", Gauge::decrement_value_next);

        for (name, read) in [
            ("CapacityMinimum", Classifier::minimum as fn(&Classifier) -> f64),
            ("CapacityMaximum", Classifier::maximum),
            ("CapacityIncrement", Classifier::increment),
        ] {
            ops.unit_op(name, move |g| Ok(g.capacity(name, read)));
        }

        ops.op0("IsChangeable", |g| Ok(Values::new("IsChangeable", g.changeable, "")))
            .op0("State", |g| Ok(Values::new("State", g.state(), "")));
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Gauge
    }
}
