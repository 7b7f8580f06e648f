//! Configuration error taxonomy
//!
//! These are load-time failures of a form declaration. They are fatal for the
//! form in question and are never surfaced as per-field runtime errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("form declares no fields")]
    EmptyForm,

    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("invalid field name '{0}': must start with a letter and contain only letters, digits, and underscores")]
    InvalidFieldName(String),

    #[error("field '{field}' of type {ty} declares no options")]
    MissingOptions { field: String, ty: &'static str },

    #[error("field '{field}' has an invalid pattern: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("field '{field}' has a conditional rule targeting unknown field '{target}'")]
    UnknownTargetField { field: String, target: String },

    #[error("conditional rules form a cycle: {}", .0.join(" -> "))]
    ConditionalCycle(Vec<String>),

    #[error("field '{field}' names unknown predicate '{name}'")]
    UnknownPredicate { field: String, name: String },

    #[error("invalid rate limit declaration '{0}': expected '<count>/<second|minute|hour>'")]
    InvalidRateLimit(String),
}
