//! Error types for wire protocol parsing

use thiserror::Error;

/// Errors while parsing a request line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty message")]
    Empty,

    #[error("unknown verb '{verb}': expected SET, CANCEL or RESET")]
    UnknownVerb { verb: String },

    #[error("missing timer id")]
    MissingId,

    #[error("invalid timer id '{field}'")]
    InvalidId { field: String },

    #[error("missing timeout")]
    MissingTimeout,

    #[error("invalid timeout '{field}': expected whole seconds")]
    InvalidTimeout { field: String },
}
