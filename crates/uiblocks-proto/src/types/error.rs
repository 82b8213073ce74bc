//! Codec error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type ProtoResult<T> = Result<T, ProtoError>;

/// Errors produced while encoding or decoding protocol envelopes.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// The payload handed to an encoder is not a JSON object.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A content announcement carried the wrong schema tag.
    #[error("schema mismatch: expected \"{expected}\", found {found}")]
    SchemaMismatch {
        /// The schema tag this codec accepts.
        expected: &'static str,
        /// What the payload actually carried.
        found: String,
    },

    /// Inbound text that is not valid JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}
