//! Error types for the relay.

/// Top-level error type for the relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Notification envelope errors.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Malformed storage event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Object retrieval errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Transient retrieval failure for {bucket}/{key}: {reason}")]
    Transient {
        bucket: String,
        key: String,
        reason: String,
    },
}

/// Inbound MIME parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed MIME message")]
    MalformedMessage,

    #[error("Message part {id} is missing from the parsed tree")]
    MissingPart { id: u32 },
}

/// Body extraction errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Unreadable {content_type} part: content could not be decoded")]
    UnreadablePart { content_type: String },
}

/// Malformed destination or from addresses.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid destination address {address:?}: {reason}")]
    Destination { address: String, reason: String },

    #[error("Invalid from address {address:?}: {reason}")]
    From { address: String, reason: String },
}

/// Outbound delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to assemble outbound message: {0}")]
    Assembly(String),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("API delivery failed: {0}")]
    Api(String),
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;
