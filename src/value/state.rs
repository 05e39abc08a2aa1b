//! Built-in state vocabulary.
//!
//! Range classifiers may produce any other name (`SHIFT`, `OVERLIMIT`, ...).

pub const NOTAVAILABLE: &str = "NOTAVAILABLE";
pub const OFF: &str = "OFF";
pub const NORMAL: &str = "NORMAL";
pub const WARNING: &str = "WARNING";
pub const CRITICAL: &str = "CRITICAL";
pub const ERROR: &str = "ERROR";

/// States a classifier is allowed to replace. Anything else was set on purpose
/// by the producer and is left alone.
pub fn is_unset(state: &str) -> bool {
    [NORMAL, ERROR, NOTAVAILABLE, OFF].contains(&state)
}
