//! Error types for path resolution and configuration loading.
//!
//! Only genuine failures live here. An unknown path or an unknown car identifier
//! is not an error: the dispatch engine answers those with an `ERROR`-state
//! [`Values`](crate::Values) container. The variants below describe a valid query
//! the system could not complete.
//!
//! ## Error Categories
//!
//! - **Argument Errors**: a string argument could not be coerced (e.g. `"abc"` as a number)
//! - **Operation Errors**: the collaborator's operation itself failed
//! - **Dispatch Errors**: context added by the engine (path, type, operation) around the above
//! - **Configuration Errors**: unit or gauge documents that failed to load or parse
//!
//! ```rust
//! use gaugepath::PathError;
//!
//! let error = PathError::dispatch(
//!     "Car/ME/Gauge/Tachometer/SetValueNext/abc",
//!     "Gauge",
//!     "SetValueNext",
//!     PathError::argument("abc", "number"),
//! );
//! assert!(matches!(error.root_cause(), PathError::Argument { .. }));
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for path and configuration operations.
pub type Result<T, E = PathError> = std::result::Result<T, E>;

/// Main error type for the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PathError {
    #[error("Cannot interpret argument '{value}' as {expected}")]
    Argument { value: String, expected: &'static str },

    #[error("Operation failed: {reason}")]
    Operation {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{type_name}.{operation} failed for path '{path}'")]
    Dispatch {
        path: String,
        type_name: &'static str,
        operation: String,
        #[source]
        source: Box<PathError>,
    },

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Configuration file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The global unit table has already been installed")]
    UnitTableInstalled,
}

impl PathError {
    /// Returns whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PathError::Operation { .. } => true,
            PathError::Dispatch { source, .. } => source.is_retryable(),
            PathError::File { .. } => true,
            PathError::Argument { .. } => false,
            PathError::Config { .. } => false,
            PathError::UnitTableInstalled => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PathError::Argument { .. } => vec![
                "Check the numeric arguments in the requested path",
                "Use '.' as the decimal separator in paths",
            ],
            PathError::Operation { .. } => vec![
                "Verify the simulator is running and feeding telemetry",
                "Retry the request on the next poll",
            ],
            PathError::Dispatch { source, .. } => source.recovery_suggestions(),
            PathError::Config { .. } => vec![
                "Validate the YAML document syntax",
                "Check field names against the documented layout",
            ],
            PathError::File { .. } => vec![
                "Check the configuration file exists and is readable",
                "Verify the configured path is correct",
            ],
            PathError::UnitTableInstalled => {
                vec!["Install the unit table once, before the first conversion"]
            }
        }
    }

    /// Unwraps engine context down to the failure the operation itself reported.
    pub fn root_cause(&self) -> &PathError {
        match self {
            PathError::Dispatch { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Helper constructor for argument coercion failures.
    pub fn argument(value: impl Into<String>, expected: &'static str) -> Self {
        PathError::Argument { value: value.into(), expected }
    }

    /// Helper constructor for operation failures.
    pub fn operation_failed(reason: impl Into<String>) -> Self {
        PathError::Operation { reason: reason.into(), source: None }
    }

    /// Helper constructor for operation failures with an underlying cause.
    pub fn operation_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        PathError::Operation { reason: reason.into(), source: Some(source) }
    }

    /// Wraps a failure with the path, type and operation it happened in.
    pub fn dispatch(
        path: impl Into<String>,
        type_name: &'static str,
        operation: impl Into<String>,
        source: PathError,
    ) -> Self {
        PathError::Dispatch {
            path: path.into(),
            type_name,
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper constructor for configuration errors.
    pub fn config(context: impl Into<String>, details: impl Into<String>) -> Self {
        PathError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        PathError::File { path, source }
    }
}

impl From<serde_yaml_ng::Error> for PathError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        PathError::Config { context: "YAML document".to_string(), details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn messages_carry_their_context(
            value in "\\w+",
            path in "[A-Za-z/]+",
            operation in "[A-Z][a-z]+",
        ) {
            let argument = PathError::argument(value.clone(), "number");
            prop_assert!(argument.to_string().contains(&value));

            let wrapped = PathError::dispatch(path.clone(), "Car", operation.clone(), argument);
            let message = wrapped.to_string();
            prop_assert!(message.contains(&path));
            prop_assert!(message.contains(&operation));
            prop_assert!(message.contains("Car"));
        }
    }

    #[test]
    fn root_cause_unwraps_nested_dispatch() {
        let inner = PathError::dispatch(
            "Gauge/Fuel/SetValueNext/x",
            "Gauge",
            "SetValueNext",
            PathError::argument("x", "number"),
        );
        let outer = PathError::dispatch("Car/ME/Gauge/Fuel/SetValueNext/x", "Car", "Gauge", inner);

        match outer.root_cause() {
            PathError::Argument { value, .. } => assert_eq!(value, "x"),
            other => panic!("unexpected root cause: {other:?}"),
        }
    }

    #[test]
    fn source_chain_reaches_operation_cause() {
        let io = std::io::Error::other("sensor offline");
        let err = PathError::dispatch(
            "Car/ME/Speed",
            "Car",
            "Speed",
            PathError::operation_failed_with_source("read failed", Box::new(io)),
        );

        let mut depth = 0;
        let mut current = std::error::Error::source(&err);
        let mut found = false;
        while let Some(source) = current {
            depth += 1;
            found |= source.to_string().contains("sensor offline");
            current = source.source();
        }
        assert_eq!(depth, 2);
        assert!(found);
    }

    #[test]
    fn retry_classification() {
        assert!(!PathError::argument("x", "number").is_retryable());
        assert!(PathError::operation_failed("busy").is_retryable());
        assert!(
            !PathError::dispatch("p", "Car", "Op", PathError::argument("x", "number"))
                .is_retryable()
        );
        assert!(!PathError::UnitTableInstalled.recovery_suggestions().is_empty());
    }

    #[test]
    fn error_is_send_sync_static() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<PathError>();
    }
}
