//! Error types for viewer setup.
//!
//! Only configuration problems are errors. Missing sprites, failed pixel
//! probes and degenerate sizes are absorbed by the engine and reflected in
//! state instead.

use thiserror::Error;

/// Errors raised while configuring or creating a viewer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// No mapper is registered under the requested name
    #[error("Unknown interaction mapper: {0}")]
    UnknownMapper(String),

    /// A mapper with the same name is already registered
    #[error("Interaction mapper already registered: {0}")]
    DuplicateMapper(String),

    /// A configuration value is out of its valid domain
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending option
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Result type for viewer setup operations.
pub type Result<T> = std::result::Result<T, Error>;
