//! Error types for the NFS-e relay.

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Field extraction errors. Never propagates past the extractor's caller —
/// the batch processor converts it into a per-file error tag.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Required field {field} not found in any candidate location")]
    MissingField { field: &'static str },
}

/// Municipality lookup errors. Recovered locally by the resolver as a
/// soft-fail `Resolution::Failed`.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Lookup request failed: {0}")]
    Transport(String),

    #[error("Lookup service returned status {0}")]
    Status(u16),

    #[error("Unexpected lookup response shape: {0}")]
    Shape(String),
}

/// Webhook delivery errors. Surfaced only as an incremented error counter.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Webhook request failed: {0}")]
    Transport(String),

    #[error("Webhook endpoint returned status {0}")]
    Status(u16),
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;
