//! Path resolution against an object graph.

use std::sync::Arc;
use tracing::{debug, error, trace};

use super::node::{Node, NodeKind};
use super::registry::{Call, is_mutation, operation_key};
use crate::gauge::Gauge;
use crate::locale::DEFAULT_LANG;
use crate::{PathError, Result, Values};

/// Car addressed when a `Car` token carries no identifier.
pub const REFERENCE_CAR: &str = "REFERENCE";

/// Addressing tokens handled before the generic registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Composite {
    Session,
    Car,
    Track,
    Gauge,
    Plugin,
}

/// Composite tokens by node kind. Anything not listed here goes to the
/// node's own registry.
fn composite(kind: NodeKind, key: &str) -> Option<Composite> {
    match (kind, key) {
        (NodeKind::Root, "SESSION") => Some(Composite::Session),
        (NodeKind::Root | NodeKind::Session, "CAR") => Some(Composite::Car),
        (NodeKind::Root | NodeKind::Session, "TRACK") => Some(Composite::Track),
        (NodeKind::Root, "PLUGIN") => Some(Composite::Plugin),
        (NodeKind::Car, "GAUGE") => Some(Composite::Gauge),
        _ => None,
    }
}

/// What stays fixed while a path is walked.
struct Request<'a> {
    root: &'a dyn Node,
    path: &'a str,
    lang: &'a str,
}

/// Resolves `path` against `root`.
///
/// Unknown paths and identifiers come back as `ERROR`-state containers.
/// `Err` is reserved for argument coercion and invocation failures, wrapped
/// with the path, type and operation they happened in. Either way the
/// returned container is named after `path` exactly and carries the root's
/// language, which unit arguments such as `NATIVE` are resolved against.
pub fn resolve(root: &dyn Node, path: &str) -> Result<Values> {
    let request = Request { root, path, lang: root.lang().unwrap_or(DEFAULT_LANG) };
    let tokens: Vec<String> =
        path.split('/').filter(|segment| !segment.is_empty()).map(str::to_string).collect();
    let mut result = dispatch(&request, root, &tokens)?;
    if result.state() == crate::state::ERROR {
        debug!(path, message = %result.string(), "Path resolved to an error value");
    }
    result.set_name(path);
    result.set_lang(request.lang);
    Ok(result)
}

fn dispatch(request: &Request<'_>, node: &dyn Node, tokens: &[String]) -> Result<Values> {
    let path = request.path;
    let Some((token, args)) = tokens.split_first() else {
        trace!(type_name = node.type_name(), path, "Aggregate query");
        return node.aggregate(request.lang).map_err(|err| {
            error!(type_name = node.type_name(), path, error = %err, "Aggregate query failed");
            PathError::dispatch(path, node.type_name(), "*", err)
        });
    };
    let key = operation_key(token);
    trace!(type_name = node.type_name(), token = %token, args = args.len(), "Dispatch step");

    match composite(node.kind(), &key) {
        Some(Composite::Session) => session(request, node, args),
        Some(Composite::Car) => car(request, node, args),
        Some(Composite::Track) => match node.track() {
            Some(track) => dispatch(request, track.as_ref(), args),
            None => Ok(Values::error(path, format!("No track available for path '{path}'"))),
        },
        Some(Composite::Gauge) => gauge(request, node, args),
        Some(Composite::Plugin) => plugin(request, node, args),
        None => invoke(request, node, &key, token, args),
    }
}

fn session(request: &Request<'_>, node: &dyn Node, args: &[String]) -> Result<Values> {
    if let Some(next) = args.first() {
        let next = operation_key(next);
        if next == "CAR" || next == "TRACK" {
            return dispatch(request, request.root, args);
        }
    }
    match node.session() {
        Some(session) => dispatch(request, session.as_ref(), args),
        None => {
            let path = request.path;
            Ok(Values::error(path, format!("No session available for path '{path}'")))
        }
    }
}

fn car(request: &Request<'_>, node: &dyn Node, args: &[String]) -> Result<Values> {
    let (id, rest) = match args.split_first() {
        Some((id, rest)) => (id.as_str(), rest),
        None => (REFERENCE_CAR, args),
    };
    match node.car(id) {
        Some(car) => dispatch(request, car.as_ref(), rest),
        None => {
            let path = request.path;
            Ok(Values::error(path, format!("Unknown car '{id}' in path '{path}'")))
        }
    }
}

fn gauge(request: &Request<'_>, node: &dyn Node, args: &[String]) -> Result<Values> {
    let Some((gauge_type, rest)) = args.split_first() else {
        let mut all = Values::aggregate(request.path);
        let current = [String::from("ValueCurrent")];
        for (gauge_type, gauge) in node.gauges() {
            let value = dispatch(request, gauge.as_ref(), &current)?;
            all.insert_from(gauge_type, &value);
        }
        return Ok(all);
    };
    let gauge: Arc<dyn Node> = match node.gauge(gauge_type) {
        Some(gauge) => gauge,
        None => {
            trace!(gauge_type = %gauge_type, "Unknown gauge, using a generic instrument");
            Arc::new(Gauge::generic(gauge_type.as_str()))
        }
    };
    dispatch(request, gauge.as_ref(), rest)
}

/// Longest dotted prefix of `args` naming a loaded extension.
fn plugin(request: &Request<'_>, node: &dyn Node, args: &[String]) -> Result<Values> {
    let extensions = node.extensions();
    let matched = (1..=args.len()).rev().find_map(|len| {
        let name = args[..len].join(".");
        extensions
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(&name))
            .map(|(_, extension)| (len, Arc::clone(extension)))
    });
    match matched {
        Some((len, extension)) => dispatch(request, extension.as_ref(), &args[len..]),
        None => {
            let path = request.path;
            Ok(Values::error(path, format!("No plugin matches path '{path}'")))
        }
    }
}

fn invoke(
    request: &Request<'_>,
    node: &dyn Node,
    key: &str,
    token: &str,
    args: &[String],
) -> Result<Values> {
    let path = request.path;
    match node.invoke(key, Call::new(args, request.lang)) {
        Some(Ok(mut values)) => {
            values.set_is_set(is_mutation(key));
            Ok(values)
        }
        Some(Err(err)) => {
            error!(
                type_name = node.type_name(),
                path,
                operation = %token,
                error = %err,
                "Operation failed"
            );
            Err(PathError::dispatch(path, node.type_name(), token, err))
        }
        None if node.has_operation(key) => Ok(Values::error(
            path,
            format!(
                "{}.{token} does not take {} arguments in path '{path}'",
                node.type_name(),
                args.len()
            ),
        )),
        None => Ok(Values::error(
            path,
            format!("Unknown operation '{token}' on {} in path '{path}'", node.type_name()),
        )),
    }
}
