//! Batch-scoped session.

use tracing::{debug, warn};

use super::{GatewayError, RequestProcessor, SessionTicket};
use crate::protocol::{Request, Response, decode_response, encode_request};

/// An open session against one tenant's company file.
///
/// Requests are encoded, exchanged and decoded here so callers only see
/// typed messages. Consume the session with [`Session::close`] on every exit
/// path.
pub struct Session<'a, P: RequestProcessor + ?Sized> {
    processor: &'a P,
    ticket: SessionTicket,
    tenant: String,
}

impl<'a, P: RequestProcessor + ?Sized> Session<'a, P> {
    /// Opens a session.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Transport` if the processor refuses the session.
    pub async fn open(
        processor: &'a P,
        tenant: &str,
        company_path: &str,
        multi_user: bool,
    ) -> Result<Self, GatewayError> {
        let ticket = processor.open(company_path, multi_user).await?;
        debug!(tenant, ticket = %ticket, "session opened");
        Ok(Self {
            processor,
            ticket,
            tenant: tenant.to_string(),
        })
    }

    /// Tenant the session belongs to.
    #[must_use]
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Sends one request and decodes its response.
    ///
    /// A non-success status is not an error here; callers decide what each
    /// status means for their operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails or the response is malformed.
    pub async fn send(&self, request: &Request) -> Result<Response, GatewayError> {
        let document = encode_request(request)?;
        let reply = self.processor.exchange(&self.ticket, &document).await?;
        let response = decode_response(request.operation(), &reply)?;
        debug!(
            tenant = %self.tenant,
            operation = request.operation(),
            status = response.status_code,
            "exchange complete"
        );
        Ok(response)
    }

    /// Ends the session. Failures are logged and swallowed.
    pub async fn close(self) {
        match self.processor.close(&self.ticket).await {
            Ok(()) => debug!(tenant = %self.tenant, "session closed"),
            Err(e) => warn!(tenant = %self.tenant, error = %e, "failed to close session"),
        }
    }
}
