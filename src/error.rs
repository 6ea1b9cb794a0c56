//! Error types for the registration and dispatch phases.
//!
//! Registration failures are configuration errors: they are returned
//! synchronously from the registration API and the caller decides whether
//! startup continues. Request-time failures never surface as errors past
//! the dispatch boundary; they become responses.

use thiserror::Error;

/// Errors raised while building the routing table.
///
/// Never produced at request time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("route pattern must start with '/': {method} {pattern}")]
    InvalidPattern { method: String, pattern: String },

    #[error("conflicting dynamic segment '{new}': node already has '{existing}'")]
    ConflictingDynamic { existing: String, new: String },

    #[error("catch-all segment '*{name}' must terminate the pattern")]
    MisplacedCatchAll { name: String },

    #[error("dynamic segment with empty name in pattern '{pattern}'")]
    EmptyParamName { pattern: String },

    #[error("handler chain of {len} reaches the limit of {limit}")]
    ChainTooLong { len: usize, limit: usize },

    #[error("URL parameters can not be used when serving static files: {path}")]
    ReservedPathCharacters { path: String },
}

/// A panic raised inside a handler, carried as a value to the dispatch
/// boundary where it becomes a 500 response.
#[derive(Error, Debug)]
#[error("runtime error: {description}")]
pub struct HandlerFault {
    pub description: String,
}

impl HandlerFault {
    pub(crate) fn from_panic(panic: Box<dyn std::any::Any + Send>) -> Self {
        let description = if let Some(s) = panic.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        HandlerFault { description }
    }
}
