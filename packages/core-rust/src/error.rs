//! Error taxonomy.
//!
//! Registration errors are fatal at startup. Binding and operation errors
//! are per request and never affect other in-flight requests.

use crate::types::Verb;

/// Errors raised while scanning declarations and compiling routes.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("type '{type_name}' is not a capability interface")]
    InvalidCapabilityType { type_name: String },
    #[error("route {verb} {path} is already registered")]
    DuplicateRoute { verb: Verb, path: String },
    #[error("base route '{base_route}' must be empty or start with '/'")]
    InvalidBaseRoute { base_route: String },
    #[error("no capability interfaces found in the catalog")]
    NoCapabilities,
}

/// Errors raised while binding request data to operation parameters.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("JSON body too large (max {limit} bytes)")]
    PayloadTooLarge { limit: usize },
    #[error("invalid JSON payload: {reason}")]
    InvalidBody { reason: String },
    #[error("cannot convert '{raw}' to type '{target}' for parameter '{parameter}'")]
    ParameterConversion {
        parameter: String,
        target: String,
        raw: String,
    },
    #[error("type '{target}' is not allowed for simple conversion (parameter '{parameter}')")]
    UnsupportedParameterType { parameter: String, target: String },
}

impl BindError {
    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PayloadTooLarge { .. } => "PayloadTooLarge",
            Self::InvalidBody { .. } => "InvalidBody",
            Self::ParameterConversion { .. } => "ParameterConversionError",
            Self::UnsupportedParameterType { .. } => "UnsupportedParameterType",
        }
    }
}

/// Errors returned by a target operation or by the dispatcher around it.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("unknown operation: {name}")]
    UnknownOperation { name: String },
    #[error("argument {index} expected {expected}, got {actual}")]
    ArgumentMismatch {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
