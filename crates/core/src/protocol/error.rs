//! Wire codec errors.

use thiserror::Error;

/// Errors raised while encoding or decoding qbXML documents.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The writer failed to serialize a document.
    #[error("Failed to write qbXML document: {0}")]
    Write(String),

    /// The document is not well-formed XML.
    #[error("Malformed qbXML document: {0}")]
    Parse(String),

    /// The response did not carry the expected message set or response element.
    #[error("Response for {operation} is missing element {element}")]
    MissingElement {
        /// Operation the response was decoded for.
        operation: String,
        /// Element that was expected.
        element: String,
    },

    /// A status code attribute was absent or not numeric.
    #[error("Response for {operation} has invalid status code {value:?}")]
    InvalidStatus {
        /// Operation the response was decoded for.
        operation: String,
        /// Raw attribute value.
        value: Option<String>,
    },
}

impl ProtocolError {
    pub(crate) fn write(e: impl std::fmt::Display) -> Self {
        Self::Write(e.to_string())
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self::Parse(e.to_string())
    }

    pub(crate) fn missing(operation: &str, element: &str) -> Self {
        Self::MissingElement {
            operation: operation.to_string(),
            element: element.to_string(),
        }
    }
}
