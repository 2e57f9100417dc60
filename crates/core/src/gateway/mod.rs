//! Session gateway port.
//!
//! The accounting engine is reached through an opaque request processor:
//! open a session against a company file, exchange text documents, close.
//! [`Session`] scopes one ticket to one batch and speaks [`Request`] /
//! [`Response`] on top of the raw exchange.

mod session;

pub use session::Session;

use async_trait::async_trait;
use thiserror::Error;

use crate::protocol::ProtocolError;

/// Opaque handle of an open session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionTicket(String);

impl SessionTicket {
    /// Wraps a ticket returned by the request processor.
    #[must_use]
    pub fn new(ticket: impl Into<String>) -> Self {
        Self(ticket.into())
    }

    /// Returns the raw ticket.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised at the request-processor boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The session could not be opened, used or closed.
    #[error("Request processor failure: {0}")]
    Transport(String),

    /// A document could not be encoded or a response could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Request processor of the accounting engine.
#[async_trait]
pub trait RequestProcessor: Send + Sync {
    /// Opens a session against a company file.
    async fn open(&self, company_path: &str, multi_user: bool) -> Result<SessionTicket, GatewayError>;

    /// Sends one request document and returns the response document.
    async fn exchange(&self, ticket: &SessionTicket, request: &str) -> Result<String, GatewayError>;

    /// Ends the session.
    async fn close(&self, ticket: &SessionTicket) -> Result<(), GatewayError>;
}
