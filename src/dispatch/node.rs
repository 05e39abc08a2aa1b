//! The contract a collaborator implements to become addressable by path.

use std::sync::Arc;

use super::registry::{Call, OperationSet, operations};
use crate::{Result, Values};

/// Where a component sits in the session -> car/track -> gauge hierarchy.
/// Selects which composite addressing tokens apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Session,
    Track,
    Car,
    Gauge,
    Extension,
}

/// A collaborator type with a statically registered set of string-argument
/// operations returning [`Values`].
///
/// Navigation methods expose child objects to composite addressing; their
/// defaults say "this type has none".
pub trait Component: Send + Sync + 'static {
    /// Type name used in logs and dispatch errors.
    const TYPE_NAME: &'static str;

    /// Registers every operation reachable by path. Runs once per type.
    fn register(ops: &mut OperationSet<Self>)
    where
        Self: Sized;

    fn kind(&self) -> NodeKind {
        NodeKind::Extension
    }

    /// Language results are produced in when this component is the root of
    /// a resolution; `None` leaves the default.
    fn lang(&self) -> Option<&str> {
        None
    }

    fn session(&self) -> Option<Arc<dyn Node>> {
        None
    }

    fn track(&self) -> Option<Arc<dyn Node>> {
        None
    }

    /// Car by identifier (`REFERENCE`, `ME`, `LEADER`, `P3`, ...).
    fn car(&self, _id: &str) -> Option<Arc<dyn Node>> {
        None
    }

    fn gauge(&self, _gauge_type: &str) -> Option<Arc<dyn Node>> {
        None
    }

    /// All instruments as `(type, instrument)`.
    fn gauges(&self) -> Vec<(String, Arc<dyn Node>)> {
        Vec::new()
    }

    /// Loaded extensions as `(dotted name, extension)`.
    fn extensions(&self) -> Vec<(String, Arc<dyn Node>)> {
        Vec::new()
    }
}

/// Object-safe view of a [`Component`] used by the dispatch engine.
/// Implemented for every component; not meant to be implemented directly.
pub trait Node: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn kind(&self) -> NodeKind;

    fn lang(&self) -> Option<&str>;

    /// Invokes operation `key`; `None` when no overload matches the argument count.
    fn invoke(&self, key: &str, call: Call<'_>) -> Option<Result<Values>>;

    fn has_operation(&self, key: &str) -> bool;

    /// Every zero-argument read operation's result under the operation's name.
    fn aggregate(&self, lang: &str) -> Result<Values>;

    fn session(&self) -> Option<Arc<dyn Node>>;

    fn track(&self) -> Option<Arc<dyn Node>>;

    fn car(&self, id: &str) -> Option<Arc<dyn Node>>;

    fn gauge(&self, gauge_type: &str) -> Option<Arc<dyn Node>>;

    fn gauges(&self) -> Vec<(String, Arc<dyn Node>)>;

    fn extensions(&self) -> Vec<(String, Arc<dyn Node>)>;
}

impl<T: Component> Node for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn kind(&self) -> NodeKind {
        Component::kind(self)
    }

    fn lang(&self) -> Option<&str> {
        Component::lang(self)
    }

    fn invoke(&self, key: &str, call: Call<'_>) -> Option<Result<Values>> {
        operations::<T>().get(key, call.args.len()).map(|handler| handler(self, call))
    }

    fn has_operation(&self, key: &str) -> bool {
        operations::<T>().contains(key)
    }

    fn aggregate(&self, lang: &str) -> Result<Values> {
        let mut all = Values::aggregate(T::TYPE_NAME);
        for (name, handler) in operations::<T>().readable() {
            let values = handler(self, Call::new(&[], lang))?;
            all.insert_from(name, &values);
        }
        Ok(all)
    }

    fn session(&self) -> Option<Arc<dyn Node>> {
        Component::session(self)
    }

    fn track(&self) -> Option<Arc<dyn Node>> {
        Component::track(self)
    }

    fn car(&self, id: &str) -> Option<Arc<dyn Node>> {
        Component::car(self, id)
    }

    fn gauge(&self, gauge_type: &str) -> Option<Arc<dyn Node>> {
        Component::gauge(self, gauge_type)
    }

    fn gauges(&self) -> Vec<(String, Arc<dyn Node>)> {
        Component::gauges(self)
    }

    fn extensions(&self) -> Vec<(String, Arc<dyn Node>)> {
        Component::extensions(self)
    }
}
