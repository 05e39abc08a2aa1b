//! Per-type operation tables, built once and cached for the process lifetime.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use super::Component;
use crate::{PathError, Result, Values};

/// One invocation: the positional string arguments, already matched against
/// the registered arity, and the language the result is produced in.
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub args: &'a [String],
    pub lang: &'a str,
}

impl<'a> Call<'a> {
    pub fn new(args: &'a [String], lang: &'a str) -> Self {
        Self { args, lang }
    }
}

/// A registered operation.
pub type Handler<T> = Box<dyn Fn(&T, Call<'_>) -> Result<Values> + Send + Sync>;

/// Mutation verbs; results of operations starting with these carry `is_set`.
const MUTATION_VERBS: [&str; 3] = ["SET", "INCREMENT", "DECREMENT"];

/// Normalizes an operation name or path token to its registry key:
/// uppercased, with a leading `GET` stripped so `GetName` and `Name` collide.
pub fn operation_key(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    match upper.strip_prefix("GET") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => upper,
    }
}

/// Whether `key` names a state-changing operation.
pub fn is_mutation(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    MUTATION_VERBS.iter().any(|verb| upper.starts_with(verb))
}

/// The addressable surface of one component type: name -> arity -> handler.
pub struct OperationSet<T> {
    type_name: &'static str,
    handlers: HashMap<String, BTreeMap<usize, Handler<T>>>,
    /// Display names in registration order, one per key.
    order: Vec<(String, String)>,
}

impl<T> OperationSet<T> {
    pub fn new(type_name: &'static str) -> Self {
        Self { type_name, handlers: HashMap::new(), order: Vec::new() }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Registers `handler` under `name` for exactly `arity` arguments.
    /// A later registration for the same name and arity replaces the earlier.
    pub fn register<F>(&mut self, name: &str, arity: usize, handler: F) -> &mut Self
    where
        F: Fn(&T, Call<'_>) -> Result<Values> + Send + Sync + 'static,
    {
        let key = operation_key(name);
        if !self.handlers.contains_key(&key) {
            let display = match name.get(..3) {
                Some(prefix) if prefix.eq_ignore_ascii_case("get") && name.len() > 3 => &name[3..],
                _ => name,
            };
            self.order.push((key.clone(), display.to_string()));
        }
        self.handlers.entry(key).or_default().insert(arity, Box::new(handler));
        self
    }

    pub fn op0<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&T) -> Result<Values> + Send + Sync + 'static,
    {
        self.register(name, 0, move |target, _| f(target))
    }

    pub fn op1<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&T, &str) -> Result<Values> + Send + Sync + 'static,
    {
        self.register(name, 1, move |target, call| match call.args {
            [a] => f(target, a),
            args => Err(arity_mismatch(1, args)),
        })
    }

    pub fn op2<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&T, &str, &str) -> Result<Values> + Send + Sync + 'static,
    {
        self.register(name, 2, move |target, call| match call.args {
            [a, b] => f(target, a, b),
            args => Err(arity_mismatch(2, args)),
        })
    }

    pub fn op3<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&T, &str, &str, &str) -> Result<Values> + Send + Sync + 'static,
    {
        self.register(name, 3, move |target, call| match call.args {
            [a, b, c] => f(target, a, b, c),
            args => Err(arity_mismatch(3, args)),
        })
    }

    /// Registers a read whose result can be converted to a unit given as the
    /// argument. A compound unit such as `km/h` arrives split across two path
    /// segments, so the operation is registered with 0, 1 and 2 arguments.
    /// The language is applied before converting so `NATIVE` follows it.
    pub fn unit_op<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&T) -> Result<Values> + Send + Sync + 'static,
    {
        let read = Arc::new(f);
        let plain = Arc::clone(&read);
        let single = Arc::clone(&read);
        self.register(name, 0, move |target, _| plain(target))
            .register(name, 1, move |target, call| match call.args {
                [unit] => Ok(in_unit(single(target)?, unit, call.lang)),
                args => Err(arity_mismatch(1, args)),
            })
            .register(name, 2, move |target, call| match call.args {
                [a, b] => Ok(in_unit(read(target)?, &format!("{a}/{b}"), call.lang)),
                args => Err(arity_mismatch(2, args)),
            })
    }

    /// Handler for a registry key and argument count.
    pub fn get(&self, key: &str, arity: usize) -> Option<&Handler<T>> {
        self.handlers.get(key)?.get(&arity)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Arities registered for `key`, ascending.
    pub fn arities(&self, key: &str) -> Vec<usize> {
        self.handlers.get(key).map(|by_arity| by_arity.keys().copied().collect()).unwrap_or_default()
    }

    /// Number of distinct operation names.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Zero-argument, non-mutating operations in registration order, as
    /// `(display name, handler)`.
    pub fn readable(&self) -> impl Iterator<Item = (&str, &Handler<T>)> {
        self.order.iter().filter(|(key, _)| !is_mutation(key)).filter_map(|(key, display)| {
            self.get(key, 0).map(|handler| (display.as_str(), handler))
        })
    }
}

impl<T> std::fmt::Debug for OperationSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationSet")
            .field("type_name", &self.type_name)
            .field("operations", &self.order.iter().map(|(_, d)| d).collect::<Vec<_>>())
            .finish()
    }
}

fn in_unit(mut values: Values, unit: &str, lang: &str) -> Values {
    values.set_lang(lang);
    values.convert(unit)
}

fn arity_mismatch(expected: usize, args: &[String]) -> PathError {
    PathError::operation_failed(format!("expected {expected} arguments, got {}", args.len()))
}

type Registry = HashMap<TypeId, &'static (dyn Any + Send + Sync)>;

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// The cached operation set for `T`, building it on first use.
///
/// Construction runs at most once per type even under concurrent first use.
/// `Component::register` runs with the registry lock held and must not look up
/// another type's operations.
pub fn operations<T: Component>() -> &'static OperationSet<T> {
    let id = TypeId::of::<T>();
    let cached = REGISTRY.read().get(&id).copied();
    if let Some(set) = cached.and_then(|any| any.downcast_ref::<OperationSet<T>>()) {
        return set;
    }

    let mut registry = REGISTRY.write();
    if let Some(set) = registry.get(&id).copied().and_then(|any| any.downcast_ref::<OperationSet<T>>())
    {
        return set;
    }
    let mut set = OperationSet::new(T::TYPE_NAME);
    T::register(&mut set);
    debug!(type_name = T::TYPE_NAME, operations = set.len(), "Built operation registry");
    let set: &'static OperationSet<T> = Box::leak(Box::new(set));
    registry.insert(id, set);
    set
}
