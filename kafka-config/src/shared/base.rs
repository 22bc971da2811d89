use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// General configuration validation error.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A resource entry of the connectors file is not usable.
    #[error("Invalid resource '{resource}': {reason}")]
    InvalidResource { resource: String, reason: String },
}
