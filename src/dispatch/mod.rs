//! Path dispatch engine.
//!
//! A path such as `Car/LEADER/Gauge/Tachometer/ValueCurrent/mph` is split on
//! `/`. The first token is matched case-insensitively, first against the
//! composite addressing table for the current node's kind, then against the
//! node type's registered operations; the remaining segments are the string
//! arguments.
//!
//! | Node kind        | Token     | Effect                                             |
//! |------------------|-----------|----------------------------------------------------|
//! | root             | `Session` | continue on the session (root if next is Car/Track)|
//! | root, session    | `Car`     | next segment is a car id, default `REFERENCE`      |
//! | root, session    | `Track`   | continue on the track                              |
//! | root             | `Plugin`  | longest dotted-prefix match on extension names     |
//! | car              | `Gauge`   | next segment is a gauge type; none = all gauges    |
//!
//! Each component type registers its operations once ([`Component::register`]);
//! the resulting [`OperationSet`] is cached for the rest of the process.

mod node;
mod registry;
mod resolve;

pub use node::{Component, Node, NodeKind};
pub use registry::{Call, Handler, OperationSet, is_mutation, operation_key, operations};
pub use resolve::{REFERENCE_CAR, resolve};
